//! Core types for the Preforma catalog.
//!
//! This module provides type-safe wrappers for the catalog's domain concepts.

pub mod email;
pub mod id;
pub mod image;
pub mod product;
pub mod quantity;

pub use email::{ContactEmail, EmailError};
pub use id::{CUSTOM_ID_PREFIX, ProductId};
pub use image::{ImageError, ProductImage};
pub use product::{Grams, InvalidWeight, NeckType, ParseEnumError, Product, Sector};
pub use quantity::{InvalidQuantity, Quantity};
