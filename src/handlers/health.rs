use axum::{extract::State, response::Json};
use serde::Serialize;

use super::AppState;

/// Liveness report; the store is not contacted.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub orders_loaded: usize,
    pub load_error: Option<String>,
}

/// GET `/health`
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let view = state.board.view(0).await;
    Json(HealthResponse {
        status: "OK",
        version: env!("CARGO_PKG_VERSION"),
        orders_loaded: view.total,
        load_error: view.error,
    })
}
