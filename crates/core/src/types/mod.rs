//! Core types for UniQ Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod role;

pub use id::*;
pub use price::{Price, PriceError};
pub use product::{NewProduct, Product};
pub use role::Role;
