//! HTML admin page. Every form posts back and is answered with a 303 to `/`,
//! carrying the page index and, after a rejected write, an alert code.

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use tracing::warn;

use super::{selectable_status, shipping_provider, AppState};
use crate::errors::{BoardError, ServiceError, UpdateFailure};
use crate::views::render_board_page;

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub page: usize,
    pub alert: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub page: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaveForm {
    #[serde(default)]
    pub shipping_provider: String,
    #[serde(default)]
    pub tracking_number: String,
    #[serde(default)]
    pub page: usize,
}

fn back_to(page: usize, alert: Option<UpdateFailure>) -> Redirect {
    match alert {
        Some(failure) => Redirect::to(&format!("/?page={page}&alert={}", failure.code())),
        None => Redirect::to(&format!("/?page={page}")),
    }
}

/// Store rejections become an alert on the page; anything else is an HTTP error.
fn redirect_after(page: usize, result: Result<(), BoardError>) -> Result<Redirect, ServiceError> {
    match result {
        Ok(()) => Ok(back_to(page, None)),
        Err(BoardError::UpdateFailed { kind, .. }) => Ok(back_to(page, Some(kind))),
        Err(other) => Err(other.into()),
    }
}

/// GET `/`
pub async fn show_board(
    State(state): State<AppState>,
    Query(query): Query<BoardQuery>,
) -> Html<String> {
    let alert = query.alert.as_deref().and_then(UpdateFailure::from_code);
    let view = state.board.view(query.page).await;
    Html(render_board_page(&view, alert))
}

/// POST `/orders/:id/status`
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, ServiceError> {
    let status = selectable_status(&form.status)?;
    let result = state.board.change_status(&id, status).await.map(|_| ());
    redirect_after(form.page, result)
}

/// POST `/orders/:id/edit`
pub async fn begin_edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<EditForm>,
) -> Result<Redirect, ServiceError> {
    state.board.begin_edit(&id).await?;
    Ok(back_to(form.page, None))
}

/// POST `/orders/:id/save`
///
/// The browser holds the in-progress values, so they are applied to the row
/// just before the write.
pub async fn save_shipping(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SaveForm>,
) -> Result<Redirect, ServiceError> {
    let provider = shipping_provider(&form.shipping_provider)?;
    state.board.set_shipping_provider(&id, provider).await?;
    state
        .board
        .set_tracking_number(&id, form.tracking_number)
        .await?;

    let result = state.board.save(&id).await.map(|_| ());
    redirect_after(form.page, result)
}

/// POST `/reload`
pub async fn reload(State(state): State<AppState>) -> Redirect {
    if let Err(failure) = state.board.reload().await {
        warn!(error = %failure, "reload left the board in error state");
    }
    back_to(0, None)
}
