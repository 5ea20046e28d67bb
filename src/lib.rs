//! Order Board
//!
//! Admin page for the orders kept in a remote document store: one read at
//! mount, six rows per page, immediate status writes and a single edit slot
//! for shipping details.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod middleware_helpers;
pub mod models;
pub mod services;
pub mod store;
pub mod views;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use std::sync::Arc;

use crate::logging::{discard_logger, LoggingState};
use crate::services::OrderBoard;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<OrderBoard>,
    pub logging: Arc<LoggingState>,
}

impl AppState {
    /// State with request logging discarded; used by tests and embedders.
    pub fn new(board: Arc<OrderBoard>) -> Self {
        Self::with_logger(board, discard_logger())
    }

    pub fn with_logger(board: Arc<OrderBoard>, logger: slog::Logger) -> Self {
        Self {
            board,
            logging: Arc::new(LoggingState::new(logger)),
        }
    }
}

/// HTML page and its form posts
pub fn board_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::board_page::show_board))
        .route("/reload", post(handlers::board_page::reload))
        .route("/orders/:id/status", post(handlers::board_page::change_status))
        .route("/orders/:id/edit", post(handlers::board_page::begin_edit))
        .route("/orders/:id/save", post(handlers::board_page::save_shipping))
}

/// JSON API over the same board
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(handlers::orders::list_orders))
        .route("/orders/:id/edit", post(handlers::orders::begin_edit))
        .route("/orders/:id/shipping", patch(handlers::orders::update_shipping))
        .route("/orders/:id/save", post(handlers::orders::save_shipping))
        .route("/orders/:id/status", put(handlers::orders::change_status))
        .route("/reload", post(handlers::orders::reload))
}

/// Full application router with request ids, HTTP tracing and request logging.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(board_routes())
        .nest("/api", api_routes())
        .route("/health", get(handlers::health::health_check))
        .layer(axum::middleware::from_fn_with_state(
            state.logging.clone(),
            logging::logging_middleware,
        ))
        .layer(middleware_helpers::configure_http_tracing())
        // Outermost, so every inner layer sees the request id
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
