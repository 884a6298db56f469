//! The record kinds kept by an inventory.

pub mod product;
pub mod product_variant;
pub mod provider;
pub mod sell;
pub mod seller;
pub mod user;

pub use product::{Product, VariantLine};
pub use product_variant::ProductVariant;
pub use provider::Provider;
pub use sell::{LineItem, Sell, SellStatus};
pub use seller::{Role, Seller};
pub use user::{PublicUser, User};
