//! Application state shared across handlers.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::RwLock;

use preforma_core::storage::StorageError;
use preforma_core::{CatalogStore, KeyValueProductRepository, ProductRepository};

use crate::config::StorefrontConfig;
use crate::services::auth::AdminGate;
use crate::services::quote_delivery::{DeliveryError, QuoteDelivery};
use crate::storage::FileStore;

/// The shared catalog, persisted through a boxed repository.
pub type Catalog = CatalogStore<Box<dyn ProductRepository>>;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("quote delivery error: {0}")]
    Delivery(#[from] DeliveryError),
    #[error("submission delay out of range")]
    InvalidDelay,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Visitor state (quote cart,
/// editor draft, admin flag) lives in the session, not here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: RwLock<Catalog>,
    admin: AdminGate,
    delivery: QuoteDelivery,
    submission_delay: TimeDelta,
}

impl AppState {
    /// Create application state backed by the configured data file.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file location or SMTP settings are
    /// unusable.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let store = FileStore::open(&config.data_path)?;
        let repository: Box<dyn ProductRepository> =
            Box::new(KeyValueProductRepository::new(store));
        let delivery = QuoteDelivery::from_config(config.quote_email.as_ref())?;
        Self::with_parts(config, repository, delivery)
    }

    /// Create application state over an explicit repository and delivery.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::InvalidDelay`] if the submission delay does not
    /// fit a timestamp offset.
    pub fn with_parts(
        config: StorefrontConfig,
        repository: Box<dyn ProductRepository>,
        delivery: QuoteDelivery,
    ) -> Result<Self, StateError> {
        let submission_delay =
            TimeDelta::from_std(config.submission_delay).map_err(|_| StateError::InvalidDelay)?;
        let admin = AdminGate::new(config.admin_password.clone());
        let catalog = CatalogStore::load(repository);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog: RwLock::new(catalog),
                admin,
                delivery,
                submission_delay,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The shared catalog. Mutations take the write lock.
    #[must_use]
    pub fn catalog(&self) -> &RwLock<Catalog> {
        &self.inner.catalog
    }

    /// Admin password gate.
    #[must_use]
    pub fn admin(&self) -> &AdminGate {
        &self.inner.admin
    }

    /// Quote request delivery.
    #[must_use]
    pub fn delivery(&self) -> &QuoteDelivery {
        &self.inner.delivery
    }

    /// How long a sent quote stays visible before the cart is cleared.
    #[must_use]
    pub fn submission_delay(&self) -> TimeDelta {
        self.inner.submission_delay
    }
}
