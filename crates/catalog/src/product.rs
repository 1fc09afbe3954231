use serde::{Deserialize, Serialize};

use orderflow_core::{CategoryId, DomainError, DomainResult, Entity, ProductId};

/// Product reference data as supplied by the catalog collaborator.
///
/// The engine treats a product as immutable during a single checkout; price
/// changes show up as a different snapshot on the next resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    category_id: CategoryId,
    /// Unit purchase cost in smallest currency unit (e.g., cents).
    purchase_cost: u64,
    /// Base (pre-promotion) unit sale price in smallest currency unit.
    base_price: u64,
}

impl Product {
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        category_id: CategoryId,
        purchase_cost: u64,
        base_price: u64,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let name = name.into();

        if sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            id,
            sku,
            name,
            category_id,
            purchase_cost,
            base_price,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn purchase_cost(&self) -> u64 {
        self.purchase_cost
    }

    pub fn base_price(&self) -> u64 {
        self.base_price
    }

    /// Replace the base sale price (catalog-side price move).
    pub fn with_base_price(mut self, base_price: u64) -> Self {
        self.base_price = base_price;
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_requires_sku_and_name() {
        let err = Product::new(
            ProductId::new(),
            "  ",
            "Widget",
            CategoryId::new(),
            50,
            100,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = Product::new(ProductId::new(), "W-1", "", CategoryId::new(), 50, 100)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn with_base_price_replaces_only_the_price() {
        let product = Product::new(ProductId::new(), "W-1", "Widget", CategoryId::new(), 50, 100)
            .unwrap();
        let repriced = product.clone().with_base_price(120);

        assert_eq!(repriced.base_price(), 120);
        assert_eq!(repriced.sku(), product.sku());
        assert_eq!(repriced.id_typed(), product.id_typed());
    }
}
