//! Catalog reference data (external collaborator port).
//!
//! Products and warehouses are owned by the surrounding application's catalog
//! service; this crate carries the read-side types the engine needs (identity,
//! prices, warehouse references) and the `ProductCatalog` port it reads through.

pub mod product;
pub mod store;
pub mod warehouse;

pub use product::Product;
pub use store::{InMemoryCatalog, ProductCatalog};
pub use warehouse::Warehouse;
