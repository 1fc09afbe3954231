//! The checkout coordinator: the one transactional boundary of the engine.
//!
//! Converts a cart into an order: re-resolves prices at checkout time,
//! reserves all stock as one all-or-nothing unit, persists the order and
//! clears the cart. The coordinator is the only component allowed to run
//! compensating actions, and it does so before any error crosses its
//! boundary — stock is never left decremented without a corresponding order.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use orderflow_core::{CartId, OrderId, ProductId, WarehouseId};
use orderflow_inventory::{LedgerError, StockKey, StockLedger};
use orderflow_pricing::PriceResolver;
use orderflow_sales::{Order, OrderLine};

use crate::repository::{CartRepository, OrderRepository};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart {0} not found")]
    CartNotFound(CartId),

    /// Rejected synchronously, before any side effect.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The catalog no longer knows a product the cart references.
    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),

    /// Business-expected contention outcome: some line could not be covered.
    /// The caller re-prompts the customer with the reported availability.
    #[error(
        "insufficient stock for product {product_id} in warehouse {warehouse_id}: available {available}"
    )]
    InsufficientStock {
        product_id: ProductId,
        warehouse_id: WarehouseId,
        available: u64,
    },

    /// Infrastructure fault after reservation; reserved stock has already
    /// been released again. Distinct from `InsufficientStock` so the UI can
    /// offer "try again" rather than "pick a different quantity".
    #[error("checkout failed: {0}")]
    Failed(String),
}

pub struct CheckoutCoordinator {
    resolver: Arc<PriceResolver>,
    ledger: Arc<StockLedger>,
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl CheckoutCoordinator {
    pub fn new(
        resolver: Arc<PriceResolver>,
        ledger: Arc<StockLedger>,
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            resolver,
            ledger,
            carts,
            orders,
        }
    }

    /// Convert the cart into a pending order.
    ///
    /// Prices are re-resolved at `now` — the order reflects price-at-purchase,
    /// not the cart's stale snapshots. Stock for every line is reserved as one
    /// unit; on any failure after reservation the reserved quantities are
    /// released before the error is returned.
    pub fn checkout(&self, cart_id: CartId, now: DateTime<Utc>) -> Result<Order, CheckoutError> {
        let cart = self
            .carts
            .get(cart_id)
            .ok_or(CheckoutError::CartNotFound(cart_id))?;

        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let mut lines = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let price = self
                .resolver
                .resolve(line.product_id, now)
                .map_err(|_| CheckoutError::UnknownProduct(line.product_id))?;
            lines.push(OrderLine {
                product_id: line.product_id,
                warehouse_id: line.warehouse_id,
                quantity: line.quantity,
                unit_price: price.unit_price,
            });
        }

        let order_id = OrderId::new();
        let reservations: Vec<(StockKey, u32)> = lines
            .iter()
            .map(|l| (StockKey::new(l.product_id, l.warehouse_id), l.quantity))
            .collect();

        self.ledger
            .reserve_batch(order_id, &reservations, now)
            .map_err(|err| match err {
                LedgerError::InsufficientStock { key, available, .. } => {
                    CheckoutError::InsufficientStock {
                        product_id: key.product_id,
                        warehouse_id: key.warehouse_id,
                        available,
                    }
                }
                other => CheckoutError::Failed(other.to_string()),
            })?;

        // From here on, every failure must compensate the reservation.
        let order = match Order::new(order_id, cart.customer_id(), lines, now) {
            Ok(order) => order,
            Err(err) => {
                self.compensate(order_id, &reservations, now);
                return Err(CheckoutError::Failed(err.to_string()));
            }
        };

        if let Err(err) = self.orders.insert(order.clone()) {
            self.compensate(order_id, &reservations, now);
            return Err(CheckoutError::Failed(err.to_string()));
        }

        self.carts.clear(cart_id, now);
        info!(%order_id, %cart_id, total = order.total(), "checkout completed");
        Ok(order)
    }

    fn compensate(&self, order_id: OrderId, reservations: &[(StockKey, u32)], now: DateTime<Utc>) {
        warn!(%order_id, "releasing reserved stock after failed checkout");
        for (key, quantity) in reservations {
            self.ledger.release(*key, *quantity, order_id, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use orderflow_catalog::{InMemoryCatalog, Product};
    use orderflow_core::{CategoryId, CustomerId, PromotionId};
    use orderflow_pricing::{Discount, Promotion, PromotionStore};
    use orderflow_sales::Cart;

    #[derive(Default)]
    struct MapCartRepository {
        carts: Mutex<HashMap<CartId, Cart>>,
    }

    impl MapCartRepository {
        fn put(&self, cart: Cart) {
            self.carts.lock().unwrap().insert(cart.id_typed(), cart);
        }

        fn lines_len(&self, cart_id: CartId) -> usize {
            self.carts
                .lock()
                .unwrap()
                .get(&cart_id)
                .map(|c| c.lines().len())
                .unwrap_or(0)
        }
    }

    impl CartRepository for MapCartRepository {
        fn get(&self, cart_id: CartId) -> Option<Cart> {
            self.carts.lock().unwrap().get(&cart_id).cloned()
        }

        fn clear(&self, cart_id: CartId, at: DateTime<Utc>) {
            if let Some(cart) = self.carts.lock().unwrap().get_mut(&cart_id) {
                cart.clear(at);
            }
        }
    }

    #[derive(Default)]
    struct MapOrderRepository {
        orders: Mutex<Vec<Order>>,
        fail_inserts: bool,
    }

    impl MapOrderRepository {
        fn failing() -> Self {
            Self {
                orders: Mutex::new(Vec::new()),
                fail_inserts: true,
            }
        }

        fn count(&self) -> usize {
            self.orders.lock().unwrap().len()
        }
    }

    impl OrderRepository for MapOrderRepository {
        fn insert(&self, order: Order) -> Result<(), RepositoryError> {
            if self.fail_inserts {
                return Err(RepositoryError::Unavailable("storage down".into()));
            }
            self.orders.lock().unwrap().push(order);
            Ok(())
        }
    }

    struct Fixture {
        catalog: Arc<InMemoryCatalog>,
        promotions: Arc<PromotionStore>,
        ledger: Arc<StockLedger>,
        carts: Arc<MapCartRepository>,
        orders: Arc<MapOrderRepository>,
        coordinator: CheckoutCoordinator,
    }

    fn fixture(orders: MapOrderRepository) -> Fixture {
        let catalog = Arc::new(InMemoryCatalog::new());
        let promotions = Arc::new(PromotionStore::new());
        let ledger = Arc::new(StockLedger::new());
        let carts = Arc::new(MapCartRepository::default());
        let orders = Arc::new(orders);
        let resolver = Arc::new(PriceResolver::new(catalog.clone(), promotions.clone()));
        let coordinator = CheckoutCoordinator::new(
            resolver,
            ledger.clone(),
            carts.clone(),
            orders.clone(),
        );
        Fixture {
            catalog,
            promotions,
            ledger,
            carts,
            orders,
            coordinator,
        }
    }

    fn add_product(fixture: &Fixture, base_price: u64) -> ProductId {
        let product_id = ProductId::new();
        fixture.catalog.upsert_product(
            Product::new(product_id, "SKU", "Product", CategoryId::new(), 10, base_price)
                .unwrap(),
        );
        product_id
    }

    #[test]
    fn checkout_reserves_stock_freezes_prices_and_clears_the_cart() {
        let f = fixture(MapOrderRepository::default());
        let now = Utc::now();
        let warehouse_id = WarehouseId::new();

        // P1: base 100.00, 20% off. P2: base 50.00, no promotion.
        let p1 = add_product(&f, 10_000);
        let p2 = add_product(&f, 5_000);
        f.promotions.insert(
            Promotion::new(
                PromotionId::new(),
                "20% off",
                vec![p1],
                now - chrono::Duration::days(1),
                now + chrono::Duration::days(1),
                Discount::percentage(20).unwrap(),
            )
            .unwrap(),
        );
        f.ledger.stock(StockKey::new(p1, warehouse_id), 5, now).unwrap();
        f.ledger.stock(StockKey::new(p2, warehouse_id), 5, now).unwrap();

        let mut cart = Cart::new(CartId::new(), CustomerId::new(), now);
        // Cart snapshots are the stale pre-promotion prices; checkout must
        // re-resolve.
        cart.add_line(p1, warehouse_id, 2, 10_000, now).unwrap();
        cart.add_line(p2, warehouse_id, 1, 5_000, now).unwrap();
        let cart_id = cart.id_typed();
        f.carts.put(cart);

        let order = f.coordinator.checkout(cart_id, now).unwrap();

        // (2 x 80.00) + (1 x 50.00) = 210.00
        assert_eq!(order.total(), 21_000);
        assert_eq!(f.ledger.available(StockKey::new(p1, warehouse_id)), 3);
        assert_eq!(f.ledger.available(StockKey::new(p2, warehouse_id)), 4);
        assert_eq!(f.orders.count(), 1);
        assert_eq!(f.carts.lines_len(cart_id), 0);
    }

    #[test]
    fn empty_cart_is_rejected_without_side_effects() {
        let f = fixture(MapOrderRepository::default());
        let now = Utc::now();
        let cart = Cart::new(CartId::new(), CustomerId::new(), now);
        let cart_id = cart.id_typed();
        f.carts.put(cart);

        assert_eq!(f.coordinator.checkout(cart_id, now), Err(CheckoutError::EmptyCart));
        assert_eq!(f.orders.count(), 0);
    }

    #[test]
    fn missing_cart_is_reported() {
        let f = fixture(MapOrderRepository::default());
        let cart_id = CartId::new();
        assert_eq!(
            f.coordinator.checkout(cart_id, Utc::now()),
            Err(CheckoutError::CartNotFound(cart_id))
        );
    }

    #[test]
    fn short_line_aborts_the_whole_checkout_and_leaves_other_stock_untouched() {
        let f = fixture(MapOrderRepository::default());
        let now = Utc::now();
        let warehouse_id = WarehouseId::new();

        let p1 = add_product(&f, 10_000);
        let p2 = add_product(&f, 5_000);
        // P1 short (1 on hand for a 2-unit line), P2 plentiful.
        f.ledger.stock(StockKey::new(p1, warehouse_id), 1, now).unwrap();
        f.ledger.stock(StockKey::new(p2, warehouse_id), 5, now).unwrap();

        let mut cart = Cart::new(CartId::new(), CustomerId::new(), now);
        cart.add_line(p1, warehouse_id, 2, 10_000, now).unwrap();
        cart.add_line(p2, warehouse_id, 1, 5_000, now).unwrap();
        let cart_id = cart.id_typed();
        f.carts.put(cart);

        let err = f.coordinator.checkout(cart_id, now).unwrap_err();
        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: p1,
                warehouse_id,
                available: 1,
            }
        );

        // Nothing moved, the cart survived, no order exists.
        assert_eq!(f.ledger.available(StockKey::new(p1, warehouse_id)), 1);
        assert_eq!(f.ledger.available(StockKey::new(p2, warehouse_id)), 5);
        assert_eq!(f.orders.count(), 0);
        assert_eq!(f.carts.lines_len(cart_id), 2);
    }

    #[test]
    fn persistence_failure_compensates_the_reservation() {
        let f = fixture(MapOrderRepository::failing());
        let now = Utc::now();
        let warehouse_id = WarehouseId::new();

        let p1 = add_product(&f, 10_000);
        f.ledger.stock(StockKey::new(p1, warehouse_id), 5, now).unwrap();

        let mut cart = Cart::new(CartId::new(), CustomerId::new(), now);
        cart.add_line(p1, warehouse_id, 2, 10_000, now).unwrap();
        let cart_id = cart.id_typed();
        f.carts.put(cart);

        let err = f.coordinator.checkout(cart_id, now).unwrap_err();
        assert!(matches!(err, CheckoutError::Failed(_)));

        // Reserved stock was released again; the cart is intact.
        assert_eq!(f.ledger.available(StockKey::new(p1, warehouse_id)), 5);
        assert_eq!(f.carts.lines_len(cart_id), 1);
    }

    #[test]
    fn vanished_product_fails_before_any_reservation() {
        let f = fixture(MapOrderRepository::default());
        let now = Utc::now();
        let warehouse_id = WarehouseId::new();

        let known = add_product(&f, 10_000);
        let unknown = ProductId::new();
        f.ledger.stock(StockKey::new(known, warehouse_id), 5, now).unwrap();

        let mut cart = Cart::new(CartId::new(), CustomerId::new(), now);
        cart.add_line(known, warehouse_id, 1, 10_000, now).unwrap();
        cart.add_line(unknown, warehouse_id, 1, 5_000, now).unwrap();
        let cart_id = cart.id_typed();
        f.carts.put(cart);

        assert_eq!(
            f.coordinator.checkout(cart_id, now),
            Err(CheckoutError::UnknownProduct(unknown))
        );
        assert_eq!(f.ledger.available(StockKey::new(known, warehouse_id)), 5);
    }
}
