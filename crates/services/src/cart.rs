use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use orderflow_checkout::CartRepository;
use orderflow_core::{CartId, CartLineId, CustomerId, ProductId, WarehouseId};
use orderflow_pricing::PriceResolver;
use orderflow_sales::CartError;

use crate::stores::InMemoryCartStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartServiceError {
    #[error("cart not found")]
    CartNotFound,

    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Per-line view for display, with the snapshotted subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineTotals {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: u32,
    pub unit_price: u64,
    pub subtotal: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub cart_id: CartId,
    pub lines: Vec<CartLineTotals>,
    pub total: u64,
}

/// Cart mutations. Prices are snapshotted through the resolver at the moment
/// of mutation; the stock ledger is never touched here.
pub struct CartService {
    carts: Arc<InMemoryCartStore>,
    resolver: Arc<PriceResolver>,
}

impl CartService {
    pub fn new(carts: Arc<InMemoryCartStore>, resolver: Arc<PriceResolver>) -> Self {
        Self { carts, resolver }
    }

    /// Add a desired quantity to the customer's cart, creating the cart on
    /// first use. Returns the cart and the affected line.
    pub fn add_line(
        &self,
        customer_id: CustomerId,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<(CartId, CartLineId), CartServiceError> {
        let price = self
            .resolver
            .resolve(product_id, now)
            .map_err(|_| CartServiceError::UnknownProduct(product_id))?;

        let cart_id = self.carts.open(customer_id, now);
        let line_id = self
            .carts
            .with_cart(cart_id, |cart| {
                cart.add_line(product_id, warehouse_id, quantity, price.unit_price, now)
            })
            .ok_or(CartServiceError::CartNotFound)??;

        debug!(%cart_id, %product_id, quantity, "cart line added");
        Ok((cart_id, line_id))
    }

    pub fn update_quantity(
        &self,
        cart_id: CartId,
        line_id: CartLineId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<(), CartServiceError> {
        self.carts
            .with_cart(cart_id, |cart| cart.update_quantity(line_id, quantity, now))
            .ok_or(CartServiceError::CartNotFound)??;
        Ok(())
    }

    pub fn remove_line(
        &self,
        cart_id: CartId,
        line_id: CartLineId,
        now: DateTime<Utc>,
    ) -> Result<(), CartServiceError> {
        self.carts
            .with_cart(cart_id, |cart| cart.remove_line(line_id, now))
            .ok_or(CartServiceError::CartNotFound)??;
        Ok(())
    }

    pub fn clear(&self, cart_id: CartId, now: DateTime<Utc>) -> Result<(), CartServiceError> {
        self.carts
            .with_cart(cart_id, |cart| cart.clear(now))
            .ok_or(CartServiceError::CartNotFound)
    }

    pub fn totals(&self, cart_id: CartId) -> Result<CartTotals, CartServiceError> {
        let cart = self.carts.get(cart_id).ok_or(CartServiceError::CartNotFound)?;
        let lines = cart
            .lines()
            .iter()
            .map(|l| CartLineTotals {
                line_id: l.id,
                product_id: l.product_id,
                warehouse_id: l.warehouse_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
                subtotal: l.subtotal(),
            })
            .collect();

        Ok(CartTotals {
            cart_id,
            lines,
            total: cart.total(),
        })
    }
}
