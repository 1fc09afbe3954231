//! In-memory cart and order stores backing the service layer.
//!
//! Intended for tests/dev and embedded use. Not optimized for performance.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use orderflow_checkout::{CartRepository, OrderRepository, RepositoryError};
use orderflow_core::{CartId, CustomerId, OrderId};
use orderflow_sales::{Cart, Order};

/// Carts keyed by id, with a customer index so a customer's first mutation
/// creates their cart.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    carts: RwLock<HashMap<CartId, Cart>>,
    by_customer: RwLock<HashMap<CustomerId, CartId>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the customer's cart id, creating an empty cart on first use.
    pub fn open(&self, customer_id: CustomerId, at: DateTime<Utc>) -> CartId {
        if let Some(cart_id) = self
            .by_customer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&customer_id)
        {
            return *cart_id;
        }

        let mut index = self
            .by_customer
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Re-check: another thread may have created the cart meanwhile.
        if let Some(cart_id) = index.get(&customer_id) {
            return *cart_id;
        }

        let cart = Cart::new(CartId::new(), customer_id, at);
        let cart_id = cart.id_typed();
        self.carts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cart_id, cart);
        index.insert(customer_id, cart_id);
        cart_id
    }

    /// Run a closure against one cart under the store lock.
    pub fn with_cart<R>(&self, cart_id: CartId, f: impl FnOnce(&mut Cart) -> R) -> Option<R> {
        let mut carts = self.carts.write().unwrap_or_else(PoisonError::into_inner);
        carts.get_mut(&cart_id).map(f)
    }
}

impl CartRepository for InMemoryCartStore {
    fn get(&self, cart_id: CartId) -> Option<Cart> {
        self.carts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&cart_id)
            .cloned()
    }

    fn clear(&self, cart_id: CartId, at: DateTime<Utc>) {
        self.with_cart(cart_id, |cart| cart.clear(at));
    }
}

/// Orders keyed by id. Each order sits behind its own `Mutex` so a state
/// transition is a compare-and-set: of two concurrent transition requests,
/// exactly one observes the prior status.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Arc<Mutex<Order>>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, order_id: OrderId) -> Option<Order> {
        let cell = self
            .orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&order_id)
            .cloned()?;
        let order = cell.lock().unwrap_or_else(PoisonError::into_inner);
        Some(order.clone())
    }

    /// Run a closure against one order while holding its lock.
    pub fn with_order<R>(&self, order_id: OrderId, f: impl FnOnce(&mut Order) -> R) -> Option<R> {
        let cell = self
            .orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&order_id)
            .cloned()?;
        let mut order = cell.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut order))
    }
}

impl OrderRepository for InMemoryOrderStore {
    fn insert(&self, order: Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        orders.insert(order.id_typed(), Arc::new(Mutex::new(order)));
        Ok(())
    }
}
