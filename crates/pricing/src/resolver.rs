//! Effective-price resolution.
//!
//! The resolver is a pure function of the product's base price, the active
//! promotion set and a point in time. It never mutates promotion or product
//! data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_catalog::ProductCatalog;
use orderflow_core::{DomainError, DomainResult, ProductId, PromotionId, ValueObject};

use crate::promotion::Promotion;
use crate::store::PromotionStore;

/// The price a unit actually sells for at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivePrice {
    /// Base (pre-promotion) unit price in smallest currency unit.
    pub base_price: u64,
    /// Unit price after the best applicable promotion (equals `base_price`
    /// when none applies).
    pub unit_price: u64,
    /// The promotion that produced `unit_price`, if any.
    pub applied_promotion: Option<PromotionId>,
}

impl ValueObject for EffectivePrice {}

/// Pick the single best promotion for a base price.
///
/// Lowest resulting unit price wins; ties break on earlier `starts_at`, then
/// on the lower promotion id. Deterministic regardless of input order.
pub fn select_best(base_price: u64, candidates: &[Promotion]) -> EffectivePrice {
    let best = candidates
        .iter()
        .map(|p| (p.discount().apply(base_price), p.starts_at(), p.id_typed()))
        .min();

    match best {
        Some((unit_price, _, id)) => EffectivePrice {
            base_price,
            unit_price,
            applied_promotion: Some(id),
        },
        None => EffectivePrice {
            base_price,
            unit_price: base_price,
            applied_promotion: None,
        },
    }
}

/// Resolves effective prices against the catalog and the promotion records.
pub struct PriceResolver {
    catalog: Arc<dyn ProductCatalog>,
    promotions: Arc<PromotionStore>,
}

impl PriceResolver {
    pub fn new(catalog: Arc<dyn ProductCatalog>, promotions: Arc<PromotionStore>) -> Self {
        Self {
            catalog,
            promotions,
        }
    }

    /// Resolve the effective unit price of `product_id` at `as_of`.
    ///
    /// Fails only when the product is unknown to the catalog.
    pub fn resolve(
        &self,
        product_id: ProductId,
        as_of: DateTime<Utc>,
    ) -> DomainResult<EffectivePrice> {
        let product = self
            .catalog
            .product(product_id)
            .ok_or(DomainError::NotFound)?;

        let candidates = self.promotions.active_for(product_id, as_of);
        Ok(select_best(product.base_price(), &candidates))
    }
}
