//! Sales: carts and orders.
//!
//! The cart is a mutable, advisory staging area; the order is the immutable
//! record a checkout produces, moving through a small explicit state machine.

pub mod cart;
pub mod order;

pub use cart::{Cart, CartError, CartLine};
pub use order::{Order, OrderLine, OrderStatus, StockEffect, TransitionError};
