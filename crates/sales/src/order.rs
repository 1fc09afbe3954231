use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderflow_core::{
    CustomerId, DomainError, DomainResult, Entity, OrderId, ProductId, WarehouseId,
};

/// Order lifecycle. `Completed` confirms fulfillment of stock that was
/// already reserved at creation; `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// What the ledger must do after a successful transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// No ledger effect (stock was already deducted at creation).
    None,
    /// Restore every line's quantity to its stock entry.
    ReleaseLines,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The requested state change is not in the lifecycle. Indicates a caller
    /// error or a lost race that the per-order atomicity correctly prevented.
    #[error("invalid order transition: {from:?} -> {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}

/// Order line: product, warehouse, quantity, and the post-promotion unit
/// price frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

impl OrderLine {
    pub fn line_total(&self) -> u64 {
        self.unit_price * u64::from(self.quantity)
    }
}

/// Immutable record of a completed checkout.
///
/// Line items and prices never change after creation; only the status moves,
/// through [`Order::transition`]. Orders are created exclusively by the
/// checkout coordinator and retained forever (cancellation is a state, not a
/// deletion).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer_id: CustomerId,
    created_at: DateTime<Utc>,
    status: OrderStatus,
    status_changed_at: DateTime<Utc>,
    lines: Vec<OrderLine>,
    /// Computed once at creation from the lines; never silently recomputed
    /// from current prices.
    total: u64,
}

impl Order {
    /// Build a pending order from priced lines. Intended for the checkout
    /// coordinator; lines must be non-empty with positive quantities.
    pub fn new(
        id: OrderId,
        customer_id: CustomerId,
        lines: Vec<OrderLine>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("order must have at least one line"));
        }
        if lines.iter().any(|l| l.quantity == 0) {
            return Err(DomainError::validation("order line quantity must be positive"));
        }

        let total = lines.iter().map(OrderLine::line_total).sum();
        Ok(Self {
            id,
            customer_id,
            created_at,
            status: OrderStatus::Pending,
            status_changed_at: created_at,
            lines,
            total,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn status_changed_at(&self) -> DateTime<Utc> {
        self.status_changed_at
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Apply one explicit state change, recorded with its timestamp.
    ///
    /// Returns the stock effect the caller must apply: cancelling a pending
    /// or completed order restores every line's quantity to the ledger;
    /// completing touches nothing. `Cancelled` is terminal.
    pub fn transition(
        &mut self,
        target: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<StockEffect, TransitionError> {
        let effect = match (self.status, target) {
            (OrderStatus::Pending, OrderStatus::Completed) => StockEffect::None,
            (OrderStatus::Pending, OrderStatus::Cancelled) => StockEffect::ReleaseLines,
            // A completed sale can still be reversed (return/void).
            (OrderStatus::Completed, OrderStatus::Cancelled) => StockEffect::ReleaseLines,
            (from, to) => return Err(TransitionError::InvalidTransition { from, to }),
        };

        self.status = target;
        self.status_changed_at = at;
        Ok(effect)
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
