//! Engine wiring: composes the catalog port, promotion store, stock ledger,
//! stores and the coordinator into the service surface the rest of the
//! system calls.

use std::sync::Arc;

use orderflow_catalog::ProductCatalog;
use orderflow_checkout::CheckoutCoordinator;
use orderflow_inventory::StockLedger;
use orderflow_pricing::{PriceResolver, PromotionStore};

use crate::cart::CartService;
use crate::checkout::CheckoutService;
use crate::inventory::InventoryService;
use crate::orders::OrderService;
use crate::pricing::PricingService;
use crate::stores::{InMemoryCartStore, InMemoryOrderStore};

pub struct Engine {
    promotions: Arc<PromotionStore>,
    carts: CartService,
    checkout: CheckoutService,
    orders: OrderService,
    inventory: InventoryService,
    pricing: PricingService,
}

impl Engine {
    /// Wire up a full engine over the given catalog.
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        let promotions = Arc::new(PromotionStore::new());
        let resolver = Arc::new(PriceResolver::new(catalog, promotions.clone()));
        let ledger = Arc::new(StockLedger::new());
        let cart_store = Arc::new(InMemoryCartStore::new());
        let order_store = Arc::new(InMemoryOrderStore::new());

        let coordinator = CheckoutCoordinator::new(
            resolver.clone(),
            ledger.clone(),
            cart_store.clone(),
            order_store.clone(),
        );

        Self {
            carts: CartService::new(cart_store, resolver.clone()),
            checkout: CheckoutService::new(coordinator),
            orders: OrderService::new(order_store, ledger.clone()),
            inventory: InventoryService::new(ledger),
            pricing: PricingService::new(resolver),
            promotions,
        }
    }

    /// Promotion records (insert/remove promotions through this).
    pub fn promotions(&self) -> &PromotionStore {
        &self.promotions
    }

    pub fn carts(&self) -> &CartService {
        &self.carts
    }

    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn inventory(&self) -> &InventoryService {
        &self.inventory
    }

    pub fn pricing(&self) -> &PricingService {
        &self.pricing
    }
}
