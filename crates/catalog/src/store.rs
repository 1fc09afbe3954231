//! The read port the engine uses to look up catalog data, plus an in-memory
//! implementation for tests and embedded use.

use std::collections::HashMap;
use std::sync::RwLock;

use orderflow_core::{ProductId, WarehouseId};

use crate::product::Product;
use crate::warehouse::Warehouse;

/// Read-only view of the catalog collaborator.
///
/// The engine never writes through this port; products and warehouses are
/// owned by the external catalog service.
pub trait ProductCatalog: Send + Sync {
    fn product(&self, id: ProductId) -> Option<Product>;
    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse>;
}

/// In-memory catalog.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<ProductId, Product>>,
    warehouses: RwLock<HashMap<WarehouseId, Warehouse>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_product(&self, product: Product) {
        if let Ok(mut products) = self.products.write() {
            products.insert(product.id_typed(), product);
        }
    }

    pub fn upsert_warehouse(&self, warehouse: Warehouse) {
        if let Ok(mut warehouses) = self.warehouses.write() {
            warehouses.insert(warehouse.id_typed(), warehouse);
        }
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn product(&self, id: ProductId) -> Option<Product> {
        self.products.read().ok()?.get(&id).cloned()
    }

    fn warehouse(&self, id: WarehouseId) -> Option<Warehouse> {
        self.warehouses.read().ok()?.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderflow_core::CategoryId;

    #[test]
    fn upsert_replaces_an_existing_product() {
        let catalog = InMemoryCatalog::new();
        let id = ProductId::new();
        let product =
            Product::new(id, "W-1", "Widget", CategoryId::new(), 50, 100).unwrap();

        catalog.upsert_product(product.clone());
        catalog.upsert_product(product.with_base_price(130));

        let found = catalog.product(id).unwrap();
        assert_eq!(found.base_price(), 130);
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        let catalog = InMemoryCatalog::new();
        assert!(catalog.product(ProductId::new()).is_none());
        assert!(catalog.warehouse(WarehouseId::new()).is_none());
    }
}
