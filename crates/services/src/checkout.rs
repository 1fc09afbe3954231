use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_checkout::{CheckoutCoordinator, CheckoutError};
use orderflow_core::{CartId, CustomerId, OrderId};
use orderflow_sales::{Order, OrderLine, OrderStatus};

/// What a successful checkout hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub total: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id_typed(),
            customer_id: order.customer_id(),
            status: order.status(),
            lines: order.lines().to_vec(),
            total: order.total(),
            created_at: order.created_at(),
        }
    }
}

pub struct CheckoutService {
    coordinator: CheckoutCoordinator,
}

impl CheckoutService {
    pub fn new(coordinator: CheckoutCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn checkout(
        &self,
        cart_id: CartId,
        now: DateTime<Utc>,
    ) -> Result<OrderSummary, CheckoutError> {
        let order = self.coordinator.checkout(cart_id, now)?;
        Ok(OrderSummary::from(&order))
    }
}
