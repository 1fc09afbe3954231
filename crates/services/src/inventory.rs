use std::sync::Arc;

use chrono::{DateTime, Utc};

use orderflow_core::{OrderId, ProductId, WarehouseId};
use orderflow_inventory::{LedgerError, StockKey, StockLedger, StockMovement};

/// Thin facade over the stock ledger for callers outside the engine
/// (receiving, manual corrections, availability queries, audit).
pub struct InventoryService {
    ledger: Arc<StockLedger>,
}

impl InventoryService {
    pub fn new(ledger: Arc<StockLedger>) -> Self {
        Self { ledger }
    }

    pub fn stock(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        self.ledger
            .stock(StockKey::new(product_id, warehouse_id), quantity, now)
    }

    pub fn reserve(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        self.ledger
            .reserve(StockKey::new(product_id, warehouse_id), quantity, order_id, now)
    }

    pub fn release(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> u64 {
        self.ledger
            .release(StockKey::new(product_id, warehouse_id), quantity, order_id, now)
    }

    pub fn adjust(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        delta: i64,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        self.ledger
            .adjust(StockKey::new(product_id, warehouse_id), delta, reason, now)
    }

    pub fn available(&self, product_id: ProductId, warehouse_id: WarehouseId) -> u64 {
        self.ledger.available(StockKey::new(product_id, warehouse_id))
    }

    /// Full audit trail of one stock entry, oldest first.
    pub fn movements(&self, product_id: ProductId, warehouse_id: WarehouseId) -> Vec<StockMovement> {
        self.ledger.movements(StockKey::new(product_id, warehouse_id))
    }

    /// Manual corrections only.
    pub fn adjustments(
        &self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
    ) -> Vec<StockMovement> {
        self.ledger.adjustments(StockKey::new(product_id, warehouse_id))
    }
}
