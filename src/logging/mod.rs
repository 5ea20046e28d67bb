use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use slog::{o, Drain, Logger};
use slog_async::Async;
use slog_term::{FullFormat, TermDecorator};
use std::sync::Arc;
use std::time::Instant;

use crate::middleware_helpers::RequestId;

/// Configuration for setting up the request logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub async_buffer_size: usize,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            async_buffer_size: 1024,
            use_color: true,
        }
    }
}

/// Sets up a terminal logger with an async drain
pub fn setup_logger(config: LoggerConfig) -> Logger {
    let decorator = {
        let builder = TermDecorator::new();
        let builder = if config.use_color {
            builder.force_color()
        } else {
            builder
        };
        builder.build()
    };

    let drain = FullFormat::new(decorator).build().fuse();

    let drain = Async::new(drain)
        .chan_size(config.async_buffer_size)
        .build()
        .fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Logger that drops every record.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

/// State struct for logging middleware
#[derive(Clone)]
pub struct LoggingState {
    logger: Logger,
}

impl LoggingState {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

/// Logs one line per handled HTTP request
pub async fn logging_middleware(
    State(state): State<Arc<LoggingState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_default();

    let response = next.run(req).await;
    let duration_ms: u128 = start_time.elapsed().as_millis();
    let status = response.status().as_u16();

    slog::info!(
        &state.logger,
        "HTTP request handled";
        "method" => method,
        "path" => path,
        "status" => status,
        "duration_ms" => duration_ms,
        "request_id" => request_id,
    );

    response
}
