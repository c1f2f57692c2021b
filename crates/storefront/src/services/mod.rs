//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `products` - Product operations behind the authentication gate
//! - `events` - Change notifications fanned out to open pages
//! - `identity` - Session token verification
//! - `payments` - Hosted checkout sessions
//! - `uploads` - Image upload to external storage

pub mod events;
pub mod identity;
pub mod payments;
pub mod products;
pub mod uploads;

pub use events::{ProductChange, ProductEvents};
pub use identity::{Identity, IdentityError, IdentityVerifier};
pub use payments::{PaymentError, PaymentProcessor, StripeCheckout};
pub use products::{ProductError, ProductService};
pub use uploads::{ImageStorage, ImageUpload, UploadClient, UploadError};
