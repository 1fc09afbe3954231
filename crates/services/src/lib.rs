//! The engine's stable call surface.
//!
//! This crate wires the domain crates together and exposes the services the
//! surrounding system consumes. It is a library boundary: callers get typed
//! results, never raw storage errors.

pub mod cart;
pub mod checkout;
pub mod engine;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod stores;

pub use cart::{CartLineTotals, CartService, CartServiceError, CartTotals};
pub use checkout::{CheckoutService, OrderSummary};
pub use engine::Engine;
pub use inventory::InventoryService;
pub use orders::{OrderService, OrderServiceError};
pub use pricing::PricingService;
pub use stores::{InMemoryCartStore, InMemoryOrderStore};
