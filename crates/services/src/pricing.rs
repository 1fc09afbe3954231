use std::sync::Arc;

use chrono::{DateTime, Utc};

use orderflow_core::{DomainResult, ProductId};
use orderflow_pricing::{EffectivePrice, PriceResolver};

/// Effective-price lookups for callers outside the engine.
pub struct PricingService {
    resolver: Arc<PriceResolver>,
}

impl PricingService {
    pub fn new(resolver: Arc<PriceResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolve(
        &self,
        product_id: ProductId,
        as_of: DateTime<Utc>,
    ) -> DomainResult<EffectivePrice> {
        self.resolver.resolve(product_id, as_of)
    }
}
