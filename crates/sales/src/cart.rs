use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use orderflow_core::{CartId, CartLineId, CustomerId, Entity, ProductId, WarehouseId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Quantities below one are rejected; removal goes through `remove_line`.
    #[error("quantity must be at least 1, got {quantity}")]
    InvalidQuantity { quantity: u32 },

    #[error("cart has no line {line_id}")]
    LineNotFound { line_id: CartLineId },
}

/// One desired (product, warehouse, quantity) with the unit price snapshotted
/// at the moment the line was last touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: u32,
    /// Snapshot in smallest currency unit; display-only, re-resolved at
    /// checkout.
    pub unit_price: u64,
}

impl CartLine {
    pub fn subtotal(&self) -> u64 {
        self.unit_price * u64::from(self.quantity)
    }
}

/// Mutable pre-purchase staging area for one customer.
///
/// Cart mutations never touch the stock ledger: two customers may both hold
/// the last unit of a product in their carts, and only checkout decides who
/// gets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    customer_id: CustomerId,
    lines: Vec<CartLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(id: CartId, customer_id: CustomerId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            customer_id,
            lines: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Subtotal over the snapshotted line prices.
    pub fn total(&self) -> u64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add a desired quantity of a product from a warehouse.
    ///
    /// At most one line exists per (product, warehouse): re-adding merges the
    /// quantities and refreshes the snapshot price. Returns the line's id.
    pub fn add_line(
        &mut self,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
        unit_price: u64,
        at: DateTime<Utc>,
    ) -> Result<CartLineId, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let line_id = match self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.warehouse_id == warehouse_id)
        {
            Some(line) => {
                line.quantity += quantity;
                line.unit_price = unit_price;
                line.id
            }
            None => {
                let id = CartLineId::new();
                self.lines.push(CartLine {
                    id,
                    product_id,
                    warehouse_id,
                    quantity,
                    unit_price,
                });
                id
            }
        };

        self.updated_at = at;
        Ok(line_id)
    }

    /// Replace a line's quantity. Removal must go through [`Cart::remove_line`].
    pub fn update_quantity(
        &mut self,
        line_id: CartLineId,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(CartError::LineNotFound { line_id })?;

        line.quantity = quantity;
        self.updated_at = at;
        Ok(())
    }

    pub fn remove_line(&mut self, line_id: CartLineId, at: DateTime<Utc>) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != line_id);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound { line_id });
        }
        self.updated_at = at;
        Ok(())
    }

    /// Empty the cart; used after successful checkout or explicit customer
    /// action.
    pub fn clear(&mut self, at: DateTime<Utc>) {
        self.lines.clear();
        self.updated_at = at;
    }
}

impl Entity for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cart() -> Cart {
        Cart::new(CartId::new(), CustomerId::new(), Utc::now())
    }

    #[test]
    fn adding_the_same_product_and_warehouse_merges_quantities() {
        let mut cart = test_cart();
        let product_id = ProductId::new();
        let warehouse_id = WarehouseId::new();

        let first = cart
            .add_line(product_id, warehouse_id, 2, 100, Utc::now())
            .unwrap();
        let second = cart
            .add_line(product_id, warehouse_id, 3, 90, Utc::now())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        // The merge refreshed the snapshot price.
        assert_eq!(cart.lines()[0].unit_price, 90);
    }

    #[test]
    fn distinct_warehouses_keep_distinct_lines() {
        let mut cart = test_cart();
        let product_id = ProductId::new();

        cart.add_line(product_id, WarehouseId::new(), 1, 100, Utc::now())
            .unwrap();
        cart.add_line(product_id, WarehouseId::new(), 1, 100, Utc::now())
            .unwrap();

        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn total_recomputes_on_every_mutation() {
        let mut cart = test_cart();
        let line_id = cart
            .add_line(ProductId::new(), WarehouseId::new(), 2, 100, Utc::now())
            .unwrap();
        cart.add_line(ProductId::new(), WarehouseId::new(), 1, 50, Utc::now())
            .unwrap();
        assert_eq!(cart.total(), 250);

        cart.update_quantity(line_id, 4, Utc::now()).unwrap();
        assert_eq!(cart.total(), 450);

        cart.remove_line(line_id, Utc::now()).unwrap();
        assert_eq!(cart.total(), 50);

        cart.clear(Utc::now());
        assert_eq!(cart.total(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn zero_quantity_is_rejected_on_add_and_update() {
        let mut cart = test_cart();
        let err = cart
            .add_line(ProductId::new(), WarehouseId::new(), 0, 100, Utc::now())
            .unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity { quantity: 0 });

        let line_id = cart
            .add_line(ProductId::new(), WarehouseId::new(), 1, 100, Utc::now())
            .unwrap();
        let err = cart.update_quantity(line_id, 0, Utc::now()).unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity { quantity: 0 });
        // The line survives a rejected update.
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn unknown_line_ids_are_reported() {
        let mut cart = test_cart();
        let missing = CartLineId::new();
        assert_eq!(
            cart.update_quantity(missing, 2, Utc::now()).unwrap_err(),
            CartError::LineNotFound { line_id: missing }
        );
        assert_eq!(
            cart.remove_line(missing, Utc::now()).unwrap_err(),
            CartError::LineNotFound { line_id: missing }
        );
    }
}
