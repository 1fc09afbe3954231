//! Inventory: the stock ledger.
//!
//! Per-(product, warehouse) available quantities with atomic
//! reserve/release/adjust primitives, a non-negativity invariant, and an
//! append-only movement ledger for audit and reconciliation.

pub mod ledger;
pub mod movement;

pub use ledger::{LedgerError, StockLedger};
pub use movement::{MovementCause, StockKey, StockMovement};
