use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{MovementId, OrderId, ProductId, WarehouseId};

/// Composite key of one stock entry: a product in a warehouse.
///
/// `Ord` matters: batch reservations walk their keys in sorted order so two
/// concurrent multi-line checkouts always touch entries in the same order.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct StockKey {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
}

impl StockKey {
    pub fn new(product_id: ProductId, warehouse_id: WarehouseId) -> Self {
        Self {
            product_id,
            warehouse_id,
        }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.product_id, self.warehouse_id)
    }
}

/// Why a stock entry moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementCause {
    /// Goods received / initial stocking of a product in a warehouse.
    Stocked,
    /// Checkout reserved the quantity for an order.
    Reservation { order_id: OrderId },
    /// A cancellation (or a failed checkout's compensation) restored the
    /// quantity.
    Release { order_id: OrderId },
    /// Manual correction reconciling a physical count.
    Adjustment { reason: String },
}

/// One immutable ledger record, appended for every successful mutation.
///
/// The movement history of a key is sufficient to reconstruct its
/// `quantity_on_hand` independently of the live entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub key: StockKey,
    /// Signed quantity change (negative for reservations).
    pub delta: i64,
    /// Balance of the entry immediately after this movement.
    pub resulting_on_hand: u64,
    pub cause: MovementCause,
    pub occurred_at: DateTime<Utc>,
}
