use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::{DomainError, DomainResult, Entity, ProductId, PromotionId};

use crate::discount::Discount;

/// A time-bounded discount rule scoped to one or more products.
///
/// Multiple promotions may overlap in time for the same product; picking the
/// winner is the resolver's job, not the promotion's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    id: PromotionId,
    name: String,
    product_ids: Vec<ProductId>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    discount: Discount,
}

impl Promotion {
    pub fn new(
        id: PromotionId,
        name: impl Into<String>,
        product_ids: Vec<ProductId>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        discount: Discount,
    ) -> DomainResult<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if product_ids.is_empty() {
            return Err(DomainError::validation(
                "promotion must be scoped to at least one product",
            ));
        }
        if starts_at > ends_at {
            return Err(DomainError::validation(
                "validity window start must not be after its end",
            ));
        }
        discount.validate()?;

        Ok(Self {
            id,
            name,
            product_ids,
            starts_at,
            ends_at,
            discount,
        })
    }

    pub fn id_typed(&self) -> PromotionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.ends_at
    }

    pub fn discount(&self) -> Discount {
        self.discount
    }

    /// Validity window is inclusive at both ends.
    pub fn is_active_at(&self, as_of: DateTime<Utc>) -> bool {
        self.starts_at <= as_of && as_of <= self.ends_at
    }

    pub fn applies_to(&self, product_id: ProductId) -> bool {
        self.product_ids.contains(&product_id)
    }
}

impl Entity for Promotion {
    type Id = PromotionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
