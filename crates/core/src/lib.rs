//! Preforma Core - catalog, quote cart and admin editor.
//!
//! This crate holds the business rules of the Preforma storefront:
//! - [`catalog`] - built-in plus admin-created product records, persisted
//!   through a [`storage::ProductRepository`]
//! - [`cart`] - the visitor's quote cart
//! - [`filter`] - sector / weight / neck filtering of the catalog
//! - [`editor`] - admin create/edit/delete flows over drafts
//! - [`quote`] - quote request form and its delayed completion
//!
//! # Architecture
//!
//! No network I/O lives here. Persistence goes through the
//! [`storage::KeyValueStore`] trait, whose file-backed implementation is in
//! the storefront crate. Time is always passed in, never read from the clock.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod editor;
pub mod filter;
pub mod quote;
pub mod storage;
pub mod types;

pub use cart::{QuoteCart, QuoteItem};
pub use catalog::{CatalogError, CatalogResult, CatalogStore, builtin_products};
pub use editor::{
    DeletionOutcome, DraftError, EditorError, EditorMode, PendingDeletion, ProductDraft,
    ProductEditor,
};
pub use filter::{FilterCriteria, SectorFilter, WeightRange, filter_products};
pub use quote::{
    QuoteForm, QuoteFormError, QuoteRequest, QuoteSubmission, SubmissionError, SubmissionState,
};
pub use storage::{
    KeyValueProductRepository, KeyValueStore, MemoryStore, ProductRepository, StorageError,
    StorageResult,
};
pub use types::*;
