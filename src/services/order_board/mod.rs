/*!
 * # Order Board
 *
 * The single control unit behind the admin page. It owns the local copy of
 * the order list for one mount and is composed of three parts:
 *
 * - `loader` - one read of the whole collection, default substitution
 * - `presenter` - fixed-size page slices of the local list
 * - `editor` - the single edit slot, local shipping edits, write-back
 *
 * Local state lives behind an async `RwLock` that is never held while a
 * store call is in flight; handlers for different rows proceed concurrently.
 */

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::LoadFailure;
use crate::models::Order;
use crate::store::DocumentStore;

mod editor;
mod loader;
mod presenter;

pub use editor::EditSlot;
pub use loader::normalize_order;
pub use presenter::{page_bounds, page_count, BoardView, OrderRow, PAGE_SIZE};

/// Collection read and written by the board unless configured otherwise.
pub const DEFAULT_COLLECTION: &str = "orders";

#[derive(Debug, Default)]
struct BoardState {
    orders: Vec<Order>,
    load_error: Option<LoadFailure>,
    editing: EditSlot,
}

impl BoardState {
    fn order_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id == id)
    }

    fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == id)
    }
}

/// Order list plus edit state for one mount of the admin page.
pub struct OrderBoard {
    store: Arc<dyn DocumentStore>,
    collection: String,
    state: RwLock<BoardState>,
}

impl OrderBoard {
    /// Builds an empty, not yet loaded board. Most callers want [`OrderBoard::mount`].
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            state: RwLock::new(BoardState::default()),
        }
    }

    /// Snapshot of the local order list.
    pub async fn orders(&self) -> Vec<Order> {
        self.state.read().await.orders.clone()
    }

    pub async fn order(&self, id: &str) -> Option<Order> {
        self.state.read().await.order(id).cloned()
    }

    /// The load error currently shown instead of the table, if any.
    pub async fn load_error(&self) -> Option<LoadFailure> {
        self.state.read().await.load_error.clone()
    }
}
