//! Persistence ports the coordinator works against.
//!
//! The coordinator composes these traits so it can be tested with in-memory
//! implementations and wired to real storage without changing its logic.

use chrono::{DateTime, Utc};
use thiserror::Error;

use orderflow_core::CartId;
use orderflow_sales::{Cart, Order};

/// Infrastructure failure while persisting. A storage adapter that enforces a
/// bounded persistence time reports the expiry as `DeadlineExceeded`; both
/// variants drive the same compensation path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage operation exceeded its deadline")]
    DeadlineExceeded,
}

pub trait CartRepository: Send + Sync {
    fn get(&self, cart_id: CartId) -> Option<Cart>;

    /// Empty the cart after a successful checkout.
    fn clear(&self, cart_id: CartId, at: DateTime<Utc>);
}

pub trait OrderRepository: Send + Sync {
    fn insert(&self, order: Order) -> Result<(), RepositoryError>;
}
