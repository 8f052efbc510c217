//! The product catalog: fixed built-in records plus persisted custom records.
//!
//! [`CatalogStore`] owns the merged list in memory and mirrors every mutation
//! of a custom record into a [`ProductRepository`]. The persisted collection
//! is re-read before each write rather than cached, so the store never writes
//! back a stale copy it loaded at startup.
//!
//! Edits to built-in records only change the in-memory list. They are gone
//! after the store is rebuilt; built-ins are never written to the repository.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::{ProductRepository, StorageError};
use crate::types::{Grams, NeckType, Product, ProductId, ProductImage, Sector};

/// Catalog mutation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The repository write failed. The in-memory list was not changed.
    #[error("failed to persist custom products: {0}")]
    Storage(#[from] StorageError),

    /// A record with this id is already in the catalog.
    #[error("product {0} already exists")]
    DuplicateId(ProductId),
}

/// Result alias for catalog mutations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// The built-in preform records, in catalog order.
#[must_use]
pub fn builtin_products() -> Vec<Product> {
    let fixture = |id: &str,
                   name: &str,
                   sector: Sector,
                   weight: f64,
                   neck: NeckType,
                   image: &str,
                   description: &str| Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        sector,
        weight: Grams::from_literal(weight),
        neck,
        image: ProductImage::asset(image),
        description: description.to_owned(),
    };

    vec![
        fixture(
            "pf-001",
            "Preforma PET 15g PCO",
            Sector::Food,
            15.0,
            NeckType::Pco,
            "/static/img/preforma-botella.jpg",
            "Ideal para botellas de agua 500ml",
        ),
        fixture(
            "pf-002",
            "Preforma PET 20g PCO",
            Sector::Beverage,
            20.0,
            NeckType::Pco,
            "/static/img/bidon.png",
            "Perfecta para refrescos y jugos 600ml",
        ),
        fixture(
            "pf-003",
            "Preforma PET 28g 30/25",
            Sector::Beverage,
            28.0,
            NeckType::ThirtyTwentyFive,
            "/static/img/preforma-bidon.webp",
            "Para bebidas carbonatadas 1L",
        ),
        fixture(
            "pf-004",
            "Preforma PET 28g 30/25",
            Sector::Beverage,
            28.0,
            NeckType::ThirtyTwentyFive,
            "/static/img/tapas-botella.png",
            "Para bebidas carbonatadas 1L",
        ),
        fixture(
            "pf-005",
            "Jaba",
            Sector::Food,
            28.0,
            NeckType::ThirtyTwentyFive,
            "/static/img/jaba.avif",
            "Para bebidas carbonatadas 1L",
        ),
    ]
}

/// In-memory catalog backed by a custom-product repository.
#[derive(Debug)]
pub struct CatalogStore<R> {
    repository: R,
    builtin_ids: Vec<ProductId>,
    products: Vec<Product>,
}

impl<R: ProductRepository> CatalogStore<R> {
    /// Build the catalog from the standard built-ins and the repository.
    #[must_use]
    pub fn load(repository: R) -> Self {
        Self::with_builtins(repository, builtin_products())
    }

    /// Build the catalog from explicit built-ins and the repository.
    ///
    /// An unreadable collection is logged and treated as empty.
    #[must_use]
    pub fn with_builtins(repository: R, builtins: Vec<Product>) -> Self {
        let custom = load_or_empty(&repository);
        let builtin_ids = builtins.iter().map(|p| p.id.clone()).collect();

        let mut products = builtins;
        products.extend(custom);
        info!(total = products.len(), "catalog loaded");

        Self {
            repository,
            builtin_ids,
            products,
        }
    }

    /// Built-ins followed by custom records, each group in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Whether a record with this id is in the catalog.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Whether the id belongs to a record that is not a built-in.
    #[must_use]
    pub fn is_custom(&self, id: &ProductId) -> bool {
        self.contains(id) && !self.builtin_ids.contains(id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Append a record and persist it with the custom collection.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if the id is taken, or
    /// [`CatalogError::Storage`] if the write fails.
    pub fn add(&mut self, product: Product) -> CatalogResult<()> {
        if self.contains(&product.id) {
            return Err(CatalogError::DuplicateId(product.id));
        }

        let mut custom = load_or_empty(&self.repository);
        custom.push(product.clone());
        self.repository.save(&custom)?;

        info!(product_id = %product.id, "product added");
        self.products.push(product);
        Ok(())
    }

    /// Replace the record with the same id.
    ///
    /// Returns `false` when no record has that id. The persisted copy is
    /// replaced only when the id is in the custom collection.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the write fails.
    pub fn update(&mut self, product: Product) -> CatalogResult<bool> {
        let Some(position) = self.products.iter().position(|p| p.id == product.id) else {
            debug!(product_id = %product.id, "update for unknown product ignored");
            return Ok(false);
        };

        let mut custom = load_or_empty(&self.repository);
        if let Some(stored) = custom.iter_mut().find(|p| p.id == product.id) {
            *stored = product.clone();
            self.repository.save(&custom)?;
        } else {
            debug!(product_id = %product.id, "updated record is not persisted");
        }

        info!(product_id = %product.id, "product updated");
        if let Some(slot) = self.products.get_mut(position) {
            *slot = product;
        }
        Ok(true)
    }

    /// Remove a record from memory and from the custom collection.
    ///
    /// Returns the removed record, or `None` if the id was unknown.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] if the write fails.
    pub fn remove(&mut self, id: &ProductId) -> CatalogResult<Option<Product>> {
        let mut custom = load_or_empty(&self.repository);
        let before = custom.len();
        custom.retain(|p| &p.id != id);
        if custom.len() != before {
            self.repository.save(&custom)?;
        }

        let Some(position) = self.products.iter().position(|p| &p.id == id) else {
            return Ok(None);
        };
        info!(product_id = %id, "product removed");
        Ok(Some(self.products.remove(position)))
    }
}

fn load_or_empty<R: ProductRepository>(repository: &R) -> Vec<Product> {
    repository.load().unwrap_or_else(|error| {
        warn!(%error, "custom products unreadable, treating as empty");
        Vec::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueProductRepository, KeyValueStore, MemoryStore, keys};

    fn custom(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Preforma {id}"),
            sector: Sector::Cleaning,
            weight: Grams::new(46.0).unwrap(),
            neck: NeckType::Mm38,
            image: ProductImage::placeholder(),
            description: String::new(),
        }
    }

    fn store_over(kv: &MemoryStore) -> CatalogStore<KeyValueProductRepository<MemoryStore>> {
        CatalogStore::load(KeyValueProductRepository::new(kv.clone()))
    }

    fn ids<R: ProductRepository>(store: &CatalogStore<R>) -> Vec<&str> {
        store.list().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_initial_list_is_builtins_then_persisted() {
        let kv = MemoryStore::new();
        KeyValueProductRepository::new(kv.clone())
            .save(&[custom("custom-1"), custom("custom-2")])
            .unwrap();

        let store = store_over(&kv);
        assert_eq!(
            ids(&store),
            ["pf-001", "pf-002", "pf-003", "pf-004", "pf-005", "custom-1", "custom-2"]
        );
    }

    #[test]
    fn test_corrupt_storage_loads_as_empty() {
        let kv = MemoryStore::new();
        kv.set(keys::CUSTOM_PRODUCTS, "[{\"id\":").unwrap();

        let store = store_over(&kv);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_add_survives_reload() {
        let kv = MemoryStore::new();
        let mut store = store_over(&kv);
        store.add(custom("custom-10")).unwrap();

        let reloaded = store_over(&kv);
        assert_eq!(reloaded.get(&ProductId::new("custom-10")), Some(&custom("custom-10")));
        assert!(reloaded.is_custom(&ProductId::new("custom-10")));
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = store_over(&MemoryStore::new());
        let err = store.add(custom("pf-001")).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(_)));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_remove_never_reintroduced_by_reload() {
        let kv = MemoryStore::new();
        let mut store = store_over(&kv);
        store.add(custom("custom-1")).unwrap();
        store.add(custom("custom-2")).unwrap();

        let removed = store.remove(&ProductId::new("custom-1")).unwrap();
        assert_eq!(removed.map(|p| p.id), Some(ProductId::new("custom-1")));

        let reloaded = store_over(&kv);
        assert!(!reloaded.contains(&ProductId::new("custom-1")));
        assert!(reloaded.contains(&ProductId::new("custom-2")));
    }

    #[test]
    fn test_update_custom_record_is_persisted() {
        let kv = MemoryStore::new();
        let mut store = store_over(&kv);
        store.add(custom("custom-1")).unwrap();

        let mut edited = custom("custom-1");
        edited.name = "Preforma 48g".to_string();
        assert!(store.update(edited.clone()).unwrap());

        assert_eq!(store_over(&kv).get(&edited.id), Some(&edited));
    }

    #[test]
    fn test_update_builtin_is_session_only() {
        let kv = MemoryStore::new();
        let mut store = store_over(&kv);

        let mut edited = store.get(&ProductId::new("pf-002")).cloned().unwrap();
        edited.description = "Solo por esta sesión".to_string();
        assert!(store.update(edited.clone()).unwrap());
        assert_eq!(store.get(&edited.id), Some(&edited));

        let reloaded = store_over(&kv);
        assert_ne!(reloaded.get(&edited.id), Some(&edited));
        assert_eq!(kv.get(keys::CUSTOM_PRODUCTS).unwrap(), None);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = store_over(&MemoryStore::new());
        assert!(!store.update(custom("custom-404")).unwrap());
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_remove_builtin_is_memory_only() {
        let kv = MemoryStore::new();
        let mut store = store_over(&kv);
        assert!(store.remove(&ProductId::new("pf-005")).unwrap().is_some());
        assert_eq!(store.len(), 4);
        assert_eq!(store_over(&kv).len(), 5);
    }

    struct FailingRepository;

    impl ProductRepository for FailingRepository {
        fn load(&self) -> Result<Vec<Product>, StorageError> {
            Ok(Vec::new())
        }

        fn save(&self, _products: &[Product]) -> Result<(), StorageError> {
            Err(StorageError::Backend("disk full".to_string()))
        }
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let mut store = CatalogStore::load(FailingRepository);
        let err = store.add(custom("custom-1")).unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
        assert!(!store.contains(&ProductId::new("custom-1")));
    }
}
