pub mod board_page;
pub mod health;
pub mod orders;

use serde::Deserialize;

use crate::errors::ServiceError;
use crate::models::{OrderStatus, ShippingProvider};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// `?page=N` on board reads; absent means the first page.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: usize,
}

/// Resolves a submitted status value to one the operator is allowed to pick.
pub(crate) fn selectable_status(raw: &str) -> Result<OrderStatus, ServiceError> {
    let status: OrderStatus = raw
        .trim()
        .parse()
        .map_err(|_| ServiceError::BadRequest(format!("Unknown order status: {raw}")))?;
    if OrderStatus::selectable().any(|allowed| allowed == status) {
        Ok(status)
    } else {
        Err(ServiceError::BadRequest(format!(
            "Order status {status} cannot be selected"
        )))
    }
}

pub(crate) fn shipping_provider(raw: &str) -> Result<Option<ShippingProvider>, ServiceError> {
    ShippingProvider::parse_optional(raw)
        .map_err(|_| ServiceError::BadRequest(format!("Unknown shipping provider: {raw}")))
}
