//! The stock ledger: per-(product, warehouse) available quantity with
//! linearizable mutations and an append-only audit trail.
//!
//! Every mutation of a key happens under that key's own lock, so the
//! check-and-decrement of a reservation is one atomic step and concurrent
//! operations on the same key serialize. Distinct keys share no lock and
//! proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use orderflow_core::{MovementId, OrderId};

use crate::movement::{MovementCause, StockKey, StockMovement};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The atomic check-and-decrement found less stock than requested.
    /// Business-expected under contention; the caller learns the current
    /// availability for user-facing messaging.
    #[error("insufficient stock for {key}: requested {requested}, available {available}")]
    InsufficientStock {
        key: StockKey,
        requested: u32,
        available: u64,
    },

    /// A manual adjustment would drive the entry below zero.
    #[error("adjustment would drive {key} negative: delta {delta}, available {available}")]
    WouldGoNegative {
        key: StockKey,
        delta: i64,
        available: u64,
    },

    /// A zero quantity/delta mutates nothing and is a caller error.
    #[error("quantity must be non-zero for {key}")]
    InvalidQuantity { key: StockKey },
}

/// Per-key available-quantity store.
///
/// The only legitimate mutators of `quantity_on_hand` are the atomic
/// operations below; every successful one appends a [`StockMovement`].
#[derive(Debug, Default)]
pub struct StockLedger {
    entries: RwLock<HashMap<StockKey, Arc<Mutex<u64>>>>,
    movements: Mutex<Vec<StockMovement>>,
}

/// A poisoned entry lock still holds a consistent balance: mutations compute
/// the new value first and assign it in one store.
fn recover<'a, T>(
    result: Result<MutexGuard<'a, T>, PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    result.unwrap_or_else(PoisonError::into_inner)
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing entry cell without creating one.
    fn existing_cell(&self, key: StockKey) -> Option<Arc<Mutex<u64>>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    /// Look up or create the entry cell for a key.
    fn cell(&self, key: StockKey) -> Arc<Mutex<u64>> {
        if let Some(cell) = self.existing_cell(key) {
            return cell;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_default().clone()
    }

    /// Append the audit record for a mutation. Called while the entry lock is
    /// held so `resulting_on_hand` is the balance the mutation produced.
    fn record(
        &self,
        key: StockKey,
        delta: i64,
        resulting_on_hand: u64,
        cause: MovementCause,
        occurred_at: DateTime<Utc>,
    ) {
        let movement = StockMovement {
            id: MovementId::new(),
            key,
            delta,
            resulting_on_hand,
            cause,
            occurred_at,
        };
        debug!(%key, delta, resulting_on_hand, "stock movement");
        recover(self.movements.lock()).push(movement);
    }

    /// Current availability of a key. A never-stocked key has zero on hand.
    pub fn available(&self, key: StockKey) -> u64 {
        match self.existing_cell(key) {
            Some(cell) => *recover(cell.lock()),
            None => 0,
        }
    }

    /// Receive goods: create the entry on first stocking, then increment.
    pub fn stock(
        &self,
        key: StockKey,
        quantity: u32,
        occurred_at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity { key });
        }
        let cell = self.cell(key);
        let mut on_hand = recover(cell.lock());
        *on_hand = on_hand.saturating_add(u64::from(quantity));
        self.record(
            key,
            i64::from(quantity),
            *on_hand,
            MovementCause::Stocked,
            occurred_at,
        );
        Ok(*on_hand)
    }

    /// Atomically check `quantity_on_hand >= quantity` and decrement in the
    /// same step. On failure the entry is untouched.
    pub fn reserve(
        &self,
        key: StockKey,
        quantity: u32,
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidQuantity { key });
        }

        let Some(cell) = self.existing_cell(key) else {
            warn!(%key, requested = quantity, "reserve against never-stocked entry");
            return Err(LedgerError::InsufficientStock {
                key,
                requested: quantity,
                available: 0,
            });
        };

        let mut on_hand = recover(cell.lock());
        let requested = u64::from(quantity);
        if *on_hand < requested {
            return Err(LedgerError::InsufficientStock {
                key,
                requested: quantity,
                available: *on_hand,
            });
        }

        *on_hand -= requested;
        self.record(
            key,
            -i64::from(quantity),
            *on_hand,
            MovementCause::Reservation { order_id },
            occurred_at,
        );
        Ok(*on_hand)
    }

    /// Atomically increment a key; used on cancellation and compensation.
    /// Never fails: a release only restores what a reservation deducted.
    pub fn release(
        &self,
        key: StockKey,
        quantity: u32,
        order_id: OrderId,
        occurred_at: DateTime<Utc>,
    ) -> u64 {
        if quantity == 0 {
            return self.available(key);
        }
        let cell = self.cell(key);
        let mut on_hand = recover(cell.lock());
        *on_hand = on_hand.saturating_add(u64::from(quantity));
        self.record(
            key,
            i64::from(quantity),
            *on_hand,
            MovementCause::Release { order_id },
            occurred_at,
        );
        *on_hand
    }

    /// Signed manual correction (inventory adjustment). Rejects a delta that
    /// would drive the entry negative; the entry is left untouched.
    pub fn adjust(
        &self,
        key: StockKey,
        delta: i64,
        reason: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<u64, LedgerError> {
        if delta == 0 {
            return Err(LedgerError::InvalidQuantity { key });
        }

        let cell = self.cell(key);
        let mut on_hand = recover(cell.lock());

        let new_on_hand = if delta >= 0 {
            on_hand.saturating_add(delta.unsigned_abs())
        } else {
            let decrement = delta.unsigned_abs();
            if *on_hand < decrement {
                warn!(%key, delta, available = *on_hand, "rejected negative-going adjustment");
                return Err(LedgerError::WouldGoNegative {
                    key,
                    delta,
                    available: *on_hand,
                });
            }
            *on_hand - decrement
        };

        *on_hand = new_on_hand;
        self.record(
            key,
            delta,
            *on_hand,
            MovementCause::Adjustment {
                reason: reason.into(),
            },
            occurred_at,
        );
        Ok(*on_hand)
    }

    /// Reserve several keys as one all-or-nothing unit.
    ///
    /// Lines are walked in sorted key order. If any line fails, every
    /// already-reserved line is released (compensated) before the failure is
    /// surfaced, so a partially-stocked cart leaves zero net ledger effect.
    pub fn reserve_batch(
        &self,
        order_id: OrderId,
        lines: &[(StockKey, u32)],
        occurred_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let mut sorted = lines.to_vec();
        sorted.sort_by_key(|(key, _)| *key);

        let mut reserved: Vec<(StockKey, u32)> = Vec::with_capacity(sorted.len());
        for (key, quantity) in sorted {
            match self.reserve(key, quantity, order_id, occurred_at) {
                Ok(_) => reserved.push((key, quantity)),
                Err(err) => {
                    warn!(%order_id, failed_key = %key, "rolling back partial reservation");
                    for (held_key, held_quantity) in reserved.into_iter().rev() {
                        self.release(held_key, held_quantity, order_id, occurred_at);
                    }
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Full movement history of one key, oldest first.
    pub fn movements(&self, key: StockKey) -> Vec<StockMovement> {
        recover(self.movements.lock())
            .iter()
            .filter(|m| m.key == key)
            .cloned()
            .collect()
    }

    /// Manual corrections only (the adjustment ledger view of the history).
    pub fn adjustments(&self, key: StockKey) -> Vec<StockMovement> {
        recover(self.movements.lock())
            .iter()
            .filter(|m| m.key == key && matches!(m.cause, MovementCause::Adjustment { .. }))
            .cloned()
            .collect()
    }
}
