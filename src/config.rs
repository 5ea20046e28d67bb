use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::store::FirestoreSettings;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5133;
const DEFAULT_COLLECTION: &str = "orders";
const DEFAULT_STORE_BACKEND: &str = "memory";
const DEFAULT_FIRESTORE_DATABASE: &str = "(default)";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
const CONFIG_DIR: &str = "config";

/// Firestore connection settings
#[derive(Clone, Debug, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project holding the database
    #[serde(default)]
    pub project_id: Option<String>,

    #[serde(default = "default_firestore_database")]
    pub database: String,

    /// Web API key appended to every request, if the rules require one
    #[serde(default)]
    pub api_key: Option<String>,

    /// REST endpoint; point at the emulator for local runs
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds; unset means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            database: default_firestore_database(),
            api_key: None,
            base_url: default_firestore_base_url(),
            timeout_secs: None,
        }
    }
}

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Document store backend: "memory" or "firestore"
    #[serde(default = "default_store_backend")]
    #[validate(custom = "validate_store_backend")]
    pub store_backend: String,

    /// Collection holding the order documents
    #[serde(default = "default_collection")]
    #[validate(length(min = 1))]
    pub collection: String,

    /// JSON file used to seed the in-memory store
    #[serde(default)]
    pub seed_file: Option<String>,

    #[serde(default)]
    pub firestore: FirestoreConfig,
}

impl AppConfig {
    /// Creates a configuration with defaults for everything but the listener
    pub fn new(host: String, port: u16, environment: String) -> Self {
        Self {
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            store_backend: default_store_backend(),
            collection: default_collection(),
            seed_file: None,
            firestore: FirestoreConfig::default(),
        }
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn uses_firestore(&self) -> bool {
        self.store_backend.eq_ignore_ascii_case("firestore")
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Firestore client settings; `None` unless a project is configured.
    pub fn firestore_settings(&self) -> Option<FirestoreSettings> {
        let project_id = self.firestore.project_id.clone()?;
        let mut settings = FirestoreSettings::new(project_id);
        settings.database = self.firestore.database.clone();
        settings.api_key = self.firestore.api_key.clone();
        settings.base_url = self.firestore.base_url.clone();
        settings.timeout = self.firestore.timeout_secs.map(Duration::from_secs);
        Some(settings)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let missing_project = self
            .firestore
            .project_id
            .as_deref()
            .map_or(true, |id| id.trim().is_empty());
        if self.uses_firestore() && missing_project {
            let mut err = ValidationError::new("firestore_project_required");
            err.message =
                Some("Set APP__FIRESTORE__PROJECT_ID when store_backend is firestore".into());
            errors.add("firestore", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_store_backend() -> String {
    DEFAULT_STORE_BACKEND.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_firestore_database() -> String {
    DEFAULT_FIRESTORE_DATABASE.to_string()
}

fn default_firestore_base_url() -> String {
    DEFAULT_FIRESTORE_BASE_URL.to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_store_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "memory" | "firestore" => Ok(()),
        _ => {
            let mut err = ValidationError::new("store_backend");
            err.message = Some("Must be one of: memory, firestore".into());
            Err(err)
        }
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("order_board={level},tower_http=debug");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration from `config/` under the working directory
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (`{dir}/default.toml`)
/// 3. Environment-specific config (`{dir}/{env}.toml`)
/// 4. Environment variables (`APP__*`, nested keys separated by `__`)
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("store_backend", DEFAULT_STORE_BACKEND)?
        .set_default("collection", DEFAULT_COLLECTION)?
        .add_source(File::from(config_dir.join("default")).required(false))
        .add_source(File::from(config_dir.join(&run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}
