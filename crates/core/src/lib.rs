//! UniQ Store Core - Shared types library.
//!
//! This crate provides common types used across all UniQ Store components:
//! - `storefront` - Public catalog, cart, checkout and the `/admin` panel
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, products and roles
//! - [`form`] - Admin product form state and validity
//! - [`cart`] - Session cart and checkout line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod form;
pub mod types;

pub use cart::{Cart, CartItem, CheckoutItem};
pub use form::{FormMode, ProductForm};
pub use types::*;
