use serde::Serialize;
use std::ops::Range;

use super::OrderBoard;
use crate::models::{Order, OrderStatus, ShippingProvider};

/// Rows per page. The pager offers no other size.
pub const PAGE_SIZE: usize = 6;

/// Number of pages needed for `total` orders.
pub fn page_count(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE)
}

/// Index range of `page` within a list of `total` orders.
///
/// A page past the end yields an empty range.
pub fn page_bounds(page: usize, total: usize) -> Range<usize> {
    let start = page.saturating_mul(PAGE_SIZE).min(total);
    let end = start.saturating_add(PAGE_SIZE).min(total);
    start..end
}

/// One table row, with every cell already in display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRow {
    pub id: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub items: Vec<String>,
    pub total: String,
    pub placed_at: String,
    pub status: OrderStatus,
    pub shipping_provider: Option<ShippingProvider>,
    pub tracking_number: String,
    /// Provider and tracking controls are only mutable on the editing row.
    pub editing: bool,
}

impl OrderRow {
    pub fn from_order(order: &Order, editing: bool) -> Self {
        Self {
            id: order.id.clone(),
            customer_name: order.customer.name.clone(),
            address: order.customer.address.clone(),
            phone: order.customer.phone.clone(),
            items: order.items.iter().map(|item| item.summary()).collect(),
            total: order.total_display(),
            placed_at: order.placed_at_display(),
            status: order.status,
            shipping_provider: order.shipping_provider,
            tracking_number: order.tracking_number.clone(),
            editing,
        }
    }
}

/// What the page shows for one page index.
#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub page: usize,
    pub page_size: usize,
    pub page_count: usize,
    /// Orders held locally; still reported when `error` is set.
    pub total: usize,
    /// Empty whenever `error` is set.
    pub rows: Vec<OrderRow>,
    pub error: Option<String>,
    pub editing: Option<String>,
}

impl OrderBoard {
    /// Renders page `page` of the local order list, in list order.
    pub async fn view(&self, page: usize) -> BoardView {
        let state = self.state.read().await;
        let total = state.orders.len();

        let rows = if state.load_error.is_some() {
            Vec::new()
        } else {
            state.orders[page_bounds(page, total)]
                .iter()
                .map(|order| OrderRow::from_order(order, state.editing.is_editing(&order.id)))
                .collect()
        };

        BoardView {
            page,
            page_size: PAGE_SIZE,
            page_count: page_count(total),
            total,
            rows,
            error: state.load_error.as_ref().map(ToString::to_string),
            editing: state.editing.current().map(str::to_string),
        }
    }
}
