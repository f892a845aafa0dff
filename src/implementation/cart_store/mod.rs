//! # Cart Store
//!
//! The authoritative client-side view of what the user intends to buy,
//! independent of and advisory to the backend's true inventory state.

mod cart;
mod line;
mod store;

pub use cart::{Cart, CartTotals};
pub use line::CartLine;
pub use store::{CartStore, CartView};
