use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use orderflow_core::OrderId;
use orderflow_inventory::{StockKey, StockLedger};
use orderflow_sales::{Order, OrderStatus, StockEffect, TransitionError};

use crate::stores::InMemoryOrderStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderServiceError {
    #[error("order not found")]
    NotFound,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Order lookups and state transitions.
///
/// A transition runs while holding the order's own lock, so concurrent
/// "complete" and "cancel" requests serialize: one wins, the other sees the
/// already-changed status and gets `InvalidTransition`. A cancellation's
/// stock release happens inside the same critical section.
pub struct OrderService {
    orders: Arc<InMemoryOrderStore>,
    ledger: Arc<StockLedger>,
}

impl OrderService {
    pub fn new(orders: Arc<InMemoryOrderStore>, ledger: Arc<StockLedger>) -> Self {
        Self { orders, ledger }
    }

    pub fn get(&self, order_id: OrderId) -> Option<Order> {
        self.orders.get(order_id)
    }

    pub fn transition(
        &self,
        order_id: OrderId,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderServiceError> {
        let outcome = self
            .orders
            .with_order(order_id, |order| {
                let effect = order.transition(target, now)?;
                if effect == StockEffect::ReleaseLines {
                    for line in order.lines() {
                        self.ledger.release(
                            StockKey::new(line.product_id, line.warehouse_id),
                            line.quantity,
                            order_id,
                            now,
                        );
                    }
                }
                Ok::<Order, TransitionError>(order.clone())
            })
            .ok_or(OrderServiceError::NotFound)?;

        let order = outcome?;
        info!(%order_id, status = ?order.status(), "order transitioned");
        Ok(order)
    }
}
