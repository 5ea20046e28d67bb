use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::middleware_helpers::current_request_id;
use crate::store::StoreError;

/// JSON body returned for every failed API request
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Gateway")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error occurred
    pub timestamp: String,
}

/// Why the initial read of the order collection produced no table.
///
/// Shown inline in place of the table rows until the board is reloaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadFailure {
    #[error("Failed to fetch orders: No orders found")]
    NoOrders,
    #[error("Failed to fetch orders: {0}")]
    Fetch(String),
}

/// Which write-back was rejected by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateFailure {
    Status,
    ShippingSave,
}

impl UpdateFailure {
    /// Text of the alert shown to the operator.
    pub fn alert_message(&self) -> &'static str {
        match self {
            UpdateFailure::Status => "Failed to update order status",
            UpdateFailure::ShippingSave => "Failed to save shipping details",
        }
    }

    /// Short code carried in redirects back to the board page.
    pub fn code(&self) -> &'static str {
        match self {
            UpdateFailure::Status => "status",
            UpdateFailure::ShippingSave => "save",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "status" => Some(UpdateFailure::Status),
            "save" => Some(UpdateFailure::ShippingSave),
            _ => None,
        }
    }
}

/// Errors raised by board operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Order {0} is not on the board")]
    OrderNotFound(String),

    #[error("Order {0} is not being edited")]
    NotEditing(String),

    #[error("{}", .kind.alert_message())]
    UpdateFailed {
        kind: UpdateFailure,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Board(BoardError::OrderNotFound(_)) => StatusCode::NOT_FOUND,
            Self::Board(BoardError::NotEditing(_)) => StatusCode::CONFLICT,
            Self::Board(BoardError::UpdateFailed { .. }) => StatusCode::BAD_GATEWAY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    pub fn response_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ServiceError::Board(BoardError::UpdateFailed { kind, source }) => {
                error!(kind = ?kind, error = %source, "order update rejected by store");
            }
            other => warn!(error = %other, "request failed"),
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            request_id: current_request_id().map(|id| id.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}
