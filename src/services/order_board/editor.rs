use serde_json::Value;
use tracing::{info, instrument, warn};

use super::OrderBoard;
use crate::errors::{BoardError, UpdateFailure};
use crate::models::{Order, OrderStatus, ShippingProvider};
use crate::store::Fields;

/// The one row currently in edit mode, if any.
///
/// Entering edit mode on another row replaces the previous occupant, so at
/// most one row is ever editable.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditSlot(Option<String>);

impl EditSlot {
    pub fn begin(&mut self, id: &str) {
        self.0 = Some(id.to_string());
    }

    pub fn is_editing(&self, id: &str) -> bool {
        self.0.as_deref() == Some(id)
    }

    pub fn current(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Leaves edit mode only if `id` still holds the slot.
    pub fn clear_if(&mut self, id: &str) {
        if self.is_editing(id) {
            self.0 = None;
        }
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

impl OrderBoard {
    /// Puts `id` into edit mode, taking the slot from any other row.
    #[instrument(skip(self))]
    pub async fn begin_edit(&self, id: &str) -> Result<(), BoardError> {
        let mut state = self.state.write().await;
        if state.order(id).is_none() {
            return Err(BoardError::OrderNotFound(id.to_string()));
        }
        state.editing.begin(id);
        Ok(())
    }

    pub async fn editing(&self) -> Option<String> {
        self.state.read().await.editing.current().map(str::to_string)
    }

    /// Changes the local shipping provider of the row being edited.
    ///
    /// Nothing is written to the store until [`OrderBoard::save`].
    pub async fn set_shipping_provider(
        &self,
        id: &str,
        provider: Option<ShippingProvider>,
    ) -> Result<Order, BoardError> {
        self.edit_local(id, |order| order.shipping_provider = provider)
            .await
    }

    /// Changes the local tracking number of the row being edited.
    pub async fn set_tracking_number(
        &self,
        id: &str,
        tracking_number: impl Into<String>,
    ) -> Result<Order, BoardError> {
        let tracking_number = tracking_number.into();
        self.edit_local(id, move |order| order.tracking_number = tracking_number)
            .await
    }

    async fn edit_local<F>(&self, id: &str, apply: F) -> Result<Order, BoardError>
    where
        F: FnOnce(&mut Order),
    {
        let mut state = self.state.write().await;
        if !state.editing.is_editing(id) {
            let err = if state.order(id).is_some() {
                BoardError::NotEditing(id.to_string())
            } else {
                BoardError::OrderNotFound(id.to_string())
            };
            return Err(err);
        }
        let order = state
            .order_mut(id)
            .ok_or_else(|| BoardError::OrderNotFound(id.to_string()))?;
        apply(order);
        Ok(order.clone())
    }

    /// Writes the row's current local provider and tracking number to the store.
    ///
    /// On success the written values are mirrored locally and the row leaves
    /// edit mode. On failure local edits are kept as they are and the row
    /// stays in edit mode.
    #[instrument(skip(self))]
    pub async fn save(&self, id: &str) -> Result<Order, BoardError> {
        let (provider, tracking_number) = {
            let state = self.state.read().await;
            let order = state
                .order(id)
                .ok_or_else(|| BoardError::OrderNotFound(id.to_string()))?;
            (order.shipping_provider, order.tracking_number.clone())
        };

        let mut fields = Fields::new();
        fields.insert(
            "shippingProvider".into(),
            Value::String(ShippingProvider::wire_value(provider)),
        );
        fields.insert(
            "trackingNumber".into(),
            Value::String(tracking_number.clone()),
        );

        if let Err(source) = self
            .store
            .update_fields(&self.collection, id, fields)
            .await
        {
            warn!(order_id = id, error = %source, "Error updating shipping info");
            return Err(BoardError::UpdateFailed {
                kind: UpdateFailure::ShippingSave,
                source,
            });
        }

        let mut state = self.state.write().await;
        state.editing.clear_if(id);
        let order = state
            .order_mut(id)
            .ok_or_else(|| BoardError::OrderNotFound(id.to_string()))?;
        order.shipping_provider = provider;
        order.tracking_number = tracking_number;
        info!(order_id = id, provider = ?provider, "shipping details saved");
        Ok(order.clone())
    }

    /// Writes a new status to the store at once, independent of edit mode.
    ///
    /// Local status changes only after the store accepts the write.
    #[instrument(skip(self))]
    pub async fn change_status(&self, id: &str, status: OrderStatus) -> Result<Order, BoardError> {
        if self.state.read().await.order(id).is_none() {
            return Err(BoardError::OrderNotFound(id.to_string()));
        }

        let mut fields = Fields::new();
        fields.insert("status".into(), Value::String(status.as_wire().to_string()));

        if let Err(source) = self
            .store
            .update_fields(&self.collection, id, fields)
            .await
        {
            warn!(order_id = id, error = %source, "Error updating status");
            return Err(BoardError::UpdateFailed {
                kind: UpdateFailure::Status,
                source,
            });
        }

        let mut state = self.state.write().await;
        let order = state
            .order_mut(id)
            .ok_or_else(|| BoardError::OrderNotFound(id.to_string()))?;
        order.status = status;
        info!(order_id = id, status = %status, "status updated");
        Ok(order.clone())
    }
}
