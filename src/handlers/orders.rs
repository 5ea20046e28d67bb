use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::warn;

use super::{selectable_status, shipping_provider, AppState, PageQuery};
use crate::errors::ServiceError;
use crate::models::Order;
use crate::services::BoardView;

/// Body of `PATCH /api/orders/:id/shipping`. Absent fields are left as they are.
#[derive(Debug, Default, Deserialize)]
pub struct ShippingPatch {
    pub shipping_provider: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

/// GET `/api/orders`
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<BoardView> {
    Json(state.board.view(query.page).await)
}

/// POST `/api/orders/:id/edit`
pub async fn begin_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.board.begin_edit(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH `/api/orders/:id/shipping`
///
/// Local only; nothing reaches the store until the row is saved.
pub async fn update_shipping(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ShippingPatch>,
) -> Result<Json<Order>, ServiceError> {
    let provider = patch
        .shipping_provider
        .as_deref()
        .map(shipping_provider)
        .transpose()?;

    let mut order = None;
    if let Some(provider) = provider {
        order = Some(state.board.set_shipping_provider(&id, provider).await?);
    }
    if let Some(tracking_number) = patch.tracking_number {
        order = Some(state.board.set_tracking_number(&id, tracking_number).await?);
    }
    order.map(Json).ok_or_else(|| {
        ServiceError::BadRequest("Provide shipping_provider or tracking_number".into())
    })
}

/// POST `/api/orders/:id/save`
pub async fn save_shipping(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ServiceError> {
    Ok(Json(state.board.save(&id).await?))
}

/// PUT `/api/orders/:id/status`
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusChange>,
) -> Result<Json<Order>, ServiceError> {
    let status = selectable_status(&body.status)?;
    Ok(Json(state.board.change_status(&id, status).await?))
}

/// POST `/api/reload`
///
/// Answers with the first page; a failed read shows up as the view's `error`.
pub async fn reload(State(state): State<AppState>) -> Json<BoardView> {
    if let Err(failure) = state.board.reload().await {
        warn!(error = %failure, "reload left the board in error state");
    }
    Json(state.board.view(0).await)
}
