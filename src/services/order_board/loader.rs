use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{BoardState, OrderBoard};
use crate::errors::LoadFailure;
use crate::models::{Customer, LineItem, Order, OrderStatus, ShippingProvider};
use crate::store::{Document, DocumentStore};

/// Cart entry as stored by the storefront.
#[derive(Debug, Deserialize)]
struct StoredLineItem {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    name: String,
    price: Decimal,
    quantity: u32,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Non-empty text of a scalar field, if there is one. Numbers and booleans
/// are shown as stored.
fn text(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!raw.trim().is_empty()).then_some(raw)
}

fn customer_from(doc: &Document) -> Customer {
    let defaults = Customer::default();
    let stored = doc.get("customer").and_then(Value::as_object);
    let field = |name: &str| text(stored.and_then(|customer| customer.get(name)));

    Customer {
        name: field("name").unwrap_or(defaults.name),
        address: field("address").unwrap_or(defaults.address),
        phone: field("phone").unwrap_or(defaults.phone),
    }
}

fn items_from(doc: &Document) -> Result<Vec<LineItem>, LoadFailure> {
    let raw = match doc.get("items") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(raw) => raw.clone(),
    };
    let stored: Vec<StoredLineItem> = serde_json::from_value(raw).map_err(|e| {
        LoadFailure::Fetch(format!("order {} has malformed items: {e}", doc.key))
    })?;

    Ok(stored
        .into_iter()
        .map(|item| LineItem {
            id: item.id,
            name: item.name,
            price: item.price,
            quantity: item.quantity,
        })
        .collect())
}

fn total_from(doc: &Document) -> Decimal {
    match doc.get("total") {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(raw) => serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
            warn!(order_id = %doc.key, error = %e, "unreadable total, using 0");
            Decimal::ZERO
        }),
    }
}

fn status_from(doc: &Document) -> OrderStatus {
    let Some(raw) = text(doc.get("status")) else {
        return OrderStatus::default();
    };
    OrderStatus::from_str(&raw).unwrap_or_else(|_| {
        warn!(order_id = %doc.key, status = %raw, "unrecognised status, showing as pending");
        OrderStatus::default()
    })
}

fn provider_from(doc: &Document) -> Option<ShippingProvider> {
    let raw = text(doc.get("shippingProvider"))?;
    ShippingProvider::parse_optional(&raw).unwrap_or_else(|_| {
        warn!(order_id = %doc.key, provider = %raw, "unrecognised shipping provider");
        None
    })
}

fn placed_at_from(doc: &Document) -> Option<DateTime<Utc>> {
    let raw = text(doc.get("timestamp"))?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .ok()
}

/// Builds a board order from a stored document, filling every missing or
/// empty customer field, status, provider and tracking number with its default.
pub fn normalize_order(doc: &Document) -> Result<Order, LoadFailure> {
    Ok(Order {
        id: doc.key.clone(),
        customer: customer_from(doc),
        items: items_from(doc)?,
        total_price: total_from(doc),
        status: status_from(doc),
        shipping_provider: provider_from(doc),
        tracking_number: text(doc.get("trackingNumber")).unwrap_or_default(),
        placed_at: placed_at_from(doc),
    })
}

async fn fetch_orders(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Vec<Order>, LoadFailure> {
    let documents = store
        .list_all(collection)
        .await
        .map_err(|e| LoadFailure::Fetch(e.to_string()))?;

    if documents.is_empty() {
        return Err(LoadFailure::NoOrders);
    }

    documents.iter().map(normalize_order).collect()
}

impl OrderBoard {
    /// Creates the board and performs its one read of the order collection.
    ///
    /// A failed read does not fail the mount; the board comes up showing the
    /// load error instead of rows.
    pub async fn mount(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        let board = Self::new(store, collection);
        // The error is kept in board state for the presenter.
        let _ = board.reload().await;
        board
    }

    /// Reads the whole collection again and replaces the local list.
    ///
    /// On success the list is swapped in one step and any load error and edit
    /// slot are cleared. On failure the previous list is kept and the error is
    /// recorded for display.
    #[instrument(skip(self), fields(collection = %self.collection))]
    pub async fn reload(&self) -> Result<usize, LoadFailure> {
        let result = fetch_orders(self.store.as_ref(), &self.collection).await;

        let mut state = self.state.write().await;
        match result {
            Ok(orders) => {
                let count = orders.len();
                *state = BoardState {
                    orders,
                    load_error: None,
                    editing: Default::default(),
                };
                info!(count, "orders loaded");
                Ok(count)
            }
            Err(failure) => {
                error!(error = %failure, "Error fetching orders");
                state.editing.clear();
                state.load_error = Some(failure.clone());
                Err(failure)
            }
        }
    }
}
