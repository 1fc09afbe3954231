use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use orderflow_core::{ProductId, PromotionId};

use crate::promotion::Promotion;

/// In-memory promotion records.
///
/// Promotions are validated at construction ([`Promotion::new`]); the store
/// only holds and filters them.
#[derive(Debug, Default)]
pub struct PromotionStore {
    promotions: RwLock<HashMap<PromotionId, Promotion>>,
}

impl PromotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, promotion: Promotion) {
        if let Ok(mut promotions) = self.promotions.write() {
            promotions.insert(promotion.id_typed(), promotion);
        }
    }

    pub fn remove(&self, id: PromotionId) -> Option<Promotion> {
        self.promotions.write().ok()?.remove(&id)
    }

    pub fn get(&self, id: PromotionId) -> Option<Promotion> {
        self.promotions.read().ok()?.get(&id).cloned()
    }

    /// All promotions in force for `product_id` at `as_of`, in no particular
    /// order; the resolver applies the deterministic selection.
    pub fn active_for(&self, product_id: ProductId, as_of: DateTime<Utc>) -> Vec<Promotion> {
        match self.promotions.read() {
            Ok(promotions) => promotions
                .values()
                .filter(|p| p.applies_to(product_id) && p.is_active_at(as_of))
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}
