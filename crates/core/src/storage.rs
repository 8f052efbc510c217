//! Persistence seams for the catalog.
//!
//! Two layers:
//!
//! - [`KeyValueStore`] - a string key/value store (the browser local-storage
//!   model). The storefront ships a file-backed implementation; tests use
//!   [`MemoryStore`].
//! - [`ProductRepository`] - `load`/`save` of the custom-product collection.
//!   [`KeyValueProductRepository`] stores it as a JSON array under
//!   [`keys::CUSTOM_PRODUCTS`].
//!
//! There is no schema versioning: a record shape that no longer parses makes
//! the whole collection unreadable, and the catalog treats it as empty.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::types::Product;

/// Well-known storage keys.
pub mod keys {
    /// JSON array of admin-created products.
    pub const CUSTOM_PRODUCTS: &str = "custom_products";

    /// Admin session flag (`"true"` or absent).
    pub const ADMIN_SESSION: &str = "admin_session";
}

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not read or write.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the backend cannot be read.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the write fails.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Backend`] if the write fails.
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// In-memory [`KeyValueStore`].
///
/// Clones share the same entries, which lets tests simulate a page reload by
/// building a fresh store over the same backing map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Backend("memory store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Load/save access to the custom-product collection.
pub trait ProductRepository: Send + Sync {
    /// Read the full collection. An absent collection is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend fails or the stored value does
    /// not decode.
    fn load(&self) -> StorageResult<Vec<Product>>;

    /// Replace the full collection.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if encoding or the backend write fails.
    fn save(&self, products: &[Product]) -> StorageResult<()>;
}

impl<R: ProductRepository + ?Sized> ProductRepository for Box<R> {
    fn load(&self) -> StorageResult<Vec<Product>> {
        (**self).load()
    }

    fn save(&self, products: &[Product]) -> StorageResult<()> {
        (**self).save(products)
    }
}

impl<R: ProductRepository + ?Sized> ProductRepository for Arc<R> {
    fn load(&self) -> StorageResult<Vec<Product>> {
        (**self).load()
    }

    fn save(&self, products: &[Product]) -> StorageResult<()> {
        (**self).save(products)
    }
}

/// [`ProductRepository`] that keeps the collection as JSON in a key/value store.
#[derive(Debug, Clone)]
pub struct KeyValueProductRepository<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValueProductRepository<S> {
    /// Wrap a key/value store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> ProductRepository for KeyValueProductRepository<S> {
    fn load(&self) -> StorageResult<Vec<Product>> {
        match self.store.get(keys::CUSTOM_PRODUCTS)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, products: &[Product]) -> StorageResult<()> {
        let raw = serde_json::to_string(products)?;
        self.store.set(keys::CUSTOM_PRODUCTS, &raw)
    }
}
