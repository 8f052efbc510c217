//! Admin record editor.
//!
//! The editor is a two-mode state machine over a [`ProductDraft`]:
//!
//! ```text
//!            start_edit(p)
//!   Create ───────────────▶ Edit(p.id)
//!     ▲                         │
//!     └──── submit / reset ─────┘
//! ```
//!
//! A draft has every field optional and only becomes a [`Product`] through
//! [`ProductDraft::into_product`] at submission. Deletion goes through a
//! [`PendingDeletion`] that must be confirmed explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::{CatalogError, CatalogStore};
use crate::storage::ProductRepository;
use crate::types::{
    Grams, ImageError, InvalidWeight, NeckType, Product, ProductId, ProductImage, Sector,
};

/// Why a draft could not become a product.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    /// Required fields are blank or unset.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The weight is not a positive number.
    #[error(transparent)]
    InvalidWeight(#[from] InvalidWeight),
}

/// Editor operation errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Edit-mode submission whose draft lost the id being edited.
    #[error("draft does not carry the id of the product being edited ({editing})")]
    EditIdMismatch {
        /// Id the editor entered edit mode with.
        editing: ProductId,
    },

    /// The referenced product is not in the catalog.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),
}

/// A product under construction. Every field is optional until submission.
///
/// Serialized with the same field names as [`Product`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub name: Option<String>,
    pub sector: Option<Sector>,
    #[serde(rename = "gramaje")]
    pub weight: Option<f64>,
    #[serde(rename = "tipoCuello")]
    pub neck: Option<NeckType>,
    pub image: Option<ProductImage>,
    pub description: Option<String>,
}

impl ProductDraft {
    /// The form's starting state: food sector and PCO neck preselected.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            sector: Some(Sector::Food),
            neck: Some(NeckType::Pco),
            ..Self::default()
        }
    }

    /// Copy of an existing record, for edit mode.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: Some(product.id.clone()),
            name: Some(product.name.clone()),
            sector: Some(product.sector),
            weight: Some(product.weight.get()),
            neck: Some(product.neck),
            image: Some(product.image.clone()),
            description: Some(product.description.clone()),
        }
    }

    /// Overwrite fields that are set in `patch`. The id is never patched.
    pub fn merge(&mut self, patch: Self) {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if patch.sector.is_some() {
            self.sector = patch.sector;
        }
        if patch.weight.is_some() {
            self.weight = patch.weight;
        }
        if patch.neck.is_some() {
            self.neck = patch.neck;
        }
        if patch.image.is_some() {
            self.image = patch.image;
        }
        if patch.description.is_some() {
            self.description = patch.description;
        }
    }

    /// Validate and convert into a complete record with the given id.
    ///
    /// Name, sector, weight and neck type are required. A missing image
    /// becomes the placeholder, a missing description becomes empty.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingFields`] listing every missing field, or
    /// [`DraftError::InvalidWeight`] for a non-positive weight.
    pub fn into_product(self, id: ProductId) -> Result<Product, DraftError> {
        let name = self
            .name
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if self.sector.is_none() {
            missing.push("sector");
        }
        if self.weight.is_none() {
            missing.push("gramaje");
        }
        if self.neck.is_none() {
            missing.push("tipoCuello");
        }

        let (Some(name), Some(sector), Some(weight), Some(neck)) =
            (name, self.sector, self.weight, self.neck)
        else {
            return Err(DraftError::MissingFields(missing));
        };

        Ok(Product {
            id,
            name,
            sector,
            weight: Grams::new(weight)?,
            neck,
            image: self.image.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Which submission the editor will perform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum EditorMode {
    #[default]
    Create,
    Edit(ProductId),
}

/// Create/edit state machine for catalog records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEditor {
    mode: EditorMode,
    draft: ProductDraft,
}

impl Default for ProductEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductEditor {
    /// Editor in create mode with a blank draft.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: EditorMode::Create,
            draft: ProductDraft::blank(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> &EditorMode {
        &self.mode
    }

    #[must_use]
    pub const fn draft(&self) -> &ProductDraft {
        &self.draft
    }

    /// Enter edit mode for an existing record, replacing the draft.
    pub fn start_edit(&mut self, product: &Product) {
        self.mode = EditorMode::Edit(product.id.clone());
        self.draft = ProductDraft::from_product(product);
    }

    /// Back to create mode with a blank draft.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Merge form input into the draft.
    pub fn update_draft(&mut self, patch: ProductDraft) {
        self.draft.merge(patch);
    }

    /// Embed an uploaded image into the draft.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] if the upload is not an acceptable image. The
    /// draft keeps its previous image.
    pub fn attach_image(&mut self, content_type: &str, bytes: &[u8]) -> Result<(), ImageError> {
        self.draft.image = Some(ProductImage::from_upload(content_type, bytes)?);
        Ok(())
    }

    /// Submit the draft to the catalog and reset to create mode.
    ///
    /// In create mode a fresh `custom-` id is generated from `now`. In edit
    /// mode the draft must carry the id being edited. On error the editor
    /// keeps its mode and draft so the form can be corrected.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError`] for invalid drafts, id mismatches, records that
    /// disappeared while being edited, and storage failures.
    pub fn submit<R: ProductRepository>(
        &mut self,
        catalog: &mut CatalogStore<R>,
        now: DateTime<Utc>,
    ) -> Result<Product, EditorError> {
        let product = match &self.mode {
            EditorMode::Create => {
                let id = ProductId::generate_custom(now, |id| catalog.contains(id));
                let product = self.draft.clone().into_product(id)?;
                catalog.add(product.clone())?;
                product
            }
            EditorMode::Edit(editing) => {
                if self.draft.id.as_ref() != Some(editing) {
                    return Err(EditorError::EditIdMismatch {
                        editing: editing.clone(),
                    });
                }
                let product = self.draft.clone().into_product(editing.clone())?;
                if !catalog.update(product.clone())? {
                    return Err(EditorError::UnknownProduct(editing.clone()));
                }
                product
            }
        };

        self.reset();
        Ok(product)
    }

    /// Start deleting a record. Nothing is removed until the returned
    /// confirmation is answered.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::UnknownProduct`] if the id is not in the catalog.
    pub fn request_delete<R: ProductRepository>(
        catalog: &CatalogStore<R>,
        id: &ProductId,
    ) -> Result<PendingDeletion, EditorError> {
        let product = catalog
            .get(id)
            .ok_or_else(|| EditorError::UnknownProduct(id.clone()))?;
        Ok(PendingDeletion {
            id: product.id.clone(),
            name: product.name.clone(),
        })
    }

    /// Drop edit mode if it targets a record that no longer exists.
    pub fn forget(&mut self, id: &ProductId) {
        if matches!(&self.mode, EditorMode::Edit(editing) if editing == id) {
            self.reset();
        }
    }
}

/// A delete awaiting a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDeletion {
    pub id: ProductId,
    pub name: String,
}

/// Result of answering a [`PendingDeletion`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeletionOutcome {
    Deleted(Product),
    Cancelled,
    /// Confirmed, but the record was already gone.
    NotFound,
}

impl PendingDeletion {
    /// Answer the confirmation. Only `confirmed == true` removes the record.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the removal cannot be persisted.
    pub fn resolve<R: ProductRepository>(
        self,
        confirmed: bool,
        catalog: &mut CatalogStore<R>,
    ) -> Result<DeletionOutcome, CatalogError> {
        if !confirmed {
            info!(product_id = %self.id, "deletion cancelled");
            return Ok(DeletionOutcome::Cancelled);
        }
        Ok(catalog
            .remove(&self.id)?
            .map_or(DeletionOutcome::NotFound, DeletionOutcome::Deleted))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::storage::{KeyValueProductRepository, MemoryStore};

    type Store = CatalogStore<KeyValueProductRepository<MemoryStore>>;

    fn catalog(kv: &MemoryStore) -> Store {
        CatalogStore::load(KeyValueProductRepository::new(kv.clone()))
    }

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn filled_draft() -> ProductDraft {
        ProductDraft {
            name: Some("Preforma PET 46g 38mm".to_string()),
            sector: Some(Sector::Cleaning),
            weight: Some(46.0),
            neck: Some(NeckType::Mm38),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_into_product_applies_defaults() {
        let product = filled_draft().into_product(ProductId::new("custom-1")).unwrap();
        assert!(product.image.is_placeholder());
        assert_eq!(product.description, "");
    }

    #[test]
    fn test_into_product_lists_missing_fields() {
        let draft = ProductDraft {
            name: Some("   ".to_string()),
            ..ProductDraft::blank()
        };
        assert_eq!(
            draft.into_product(ProductId::new("x")),
            Err(DraftError::MissingFields(vec!["name", "gramaje"]))
        );
    }

    #[test]
    fn test_into_product_rejects_zero_weight() {
        let draft = ProductDraft {
            weight: Some(0.0),
            ..filled_draft()
        };
        assert!(matches!(
            draft.into_product(ProductId::new("x")),
            Err(DraftError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_create_submit_adds_custom_record_and_resets() {
        let kv = MemoryStore::new();
        let mut store = catalog(&kv);
        let mut editor = ProductEditor::new();
        editor.update_draft(filled_draft());

        let product = editor.submit(&mut store, at(1_700_000_000_000)).unwrap();

        assert_eq!(product.id.as_str(), "custom-1700000000000");
        assert_eq!(editor, ProductEditor::new());
        assert!(catalog(&kv).contains(&product.id));
    }

    #[test]
    fn test_create_submit_in_same_millisecond_gets_distinct_ids() {
        let mut store = catalog(&MemoryStore::new());
        let mut editor = ProductEditor::new();

        editor.update_draft(filled_draft());
        let first = editor.submit(&mut store, at(5)).unwrap();
        editor.update_draft(filled_draft());
        let second = editor.submit(&mut store, at(5)).unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_invalid_submit_keeps_draft() {
        let mut store = catalog(&MemoryStore::new());
        let mut editor = ProductEditor::new();
        editor.update_draft(ProductDraft {
            name: Some("Sin gramaje".to_string()),
            ..ProductDraft::default()
        });

        let err = editor.submit(&mut store, at(1)).unwrap_err();
        assert!(matches!(err, EditorError::Draft(DraftError::MissingFields(_))));
        assert_eq!(editor.draft().name.as_deref(), Some("Sin gramaje"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_edit_submit_updates_record() {
        let kv = MemoryStore::new();
        let mut store = catalog(&kv);
        let mut editor = ProductEditor::new();
        editor.update_draft(filled_draft());
        let created = editor.submit(&mut store, at(1)).unwrap();

        editor.start_edit(&created);
        assert_eq!(editor.mode(), &EditorMode::Edit(created.id.clone()));
        editor.update_draft(ProductDraft {
            description: Some("Para detergentes 2L".to_string()),
            ..ProductDraft::default()
        });
        let updated = editor.submit(&mut store, at(2)).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(editor.mode(), &EditorMode::Create);
        assert_eq!(
            catalog(&kv).get(&created.id).map(|p| p.description.as_str()),
            Some("Para detergentes 2L")
        );
    }

    #[test]
    fn test_edit_submit_requires_matching_id() {
        let mut store = catalog(&MemoryStore::new());
        let mut editor = ProductEditor::new();
        let builtin = store.list()[0].clone();
        editor.start_edit(&builtin);
        editor.draft.id = None;

        let err = editor.submit(&mut store, at(1)).unwrap_err();
        assert!(matches!(err, EditorError::EditIdMismatch { .. }));
    }

    #[test]
    fn test_edit_of_deleted_record_fails() {
        let mut store = catalog(&MemoryStore::new());
        let mut editor = ProductEditor::new();
        let builtin = store.list()[1].clone();
        editor.start_edit(&builtin);
        store.remove(&builtin.id).unwrap();

        let err = editor.submit(&mut store, at(1)).unwrap_err();
        assert!(matches!(err, EditorError::UnknownProduct(_)));
    }

    #[test]
    fn test_merge_never_touches_id() {
        let mut draft = ProductDraft::from_product(&catalog(&MemoryStore::new()).list()[0]);
        draft.merge(ProductDraft {
            id: Some(ProductId::new("hijack")),
            name: Some("Nuevo".to_string()),
            ..ProductDraft::default()
        });
        assert_eq!(draft.id, Some(ProductId::new("pf-001")));
        assert_eq!(draft.name.as_deref(), Some("Nuevo"));
    }

    #[test]
    fn test_attach_image_embeds_data_url() {
        let mut editor = ProductEditor::new();
        editor.attach_image("image/webp", b"RIFF").unwrap();
        assert!(editor.draft().image.as_ref().unwrap().is_inline());

        assert!(editor.attach_image("text/plain", b"hi").is_err());
        assert!(editor.draft().image.as_ref().unwrap().is_inline());
    }

    #[test]
    fn test_deletion_requires_confirmation() {
        let kv = MemoryStore::new();
        let mut store = catalog(&kv);
        let mut editor = ProductEditor::new();
        editor.update_draft(filled_draft());
        let created = editor.submit(&mut store, at(1)).unwrap();

        let pending = ProductEditor::request_delete(&store, &created.id).unwrap();
        assert_eq!(
            pending.clone().resolve(false, &mut store).unwrap(),
            DeletionOutcome::Cancelled
        );
        assert!(store.contains(&created.id));

        let outcome = pending.clone().resolve(true, &mut store).unwrap();
        assert_eq!(outcome, DeletionOutcome::Deleted(created.clone()));
        assert!(!catalog(&kv).contains(&created.id));

        assert_eq!(pending.resolve(true, &mut store).unwrap(), DeletionOutcome::NotFound);
    }

    #[test]
    fn test_request_delete_unknown_product() {
        let store = catalog(&MemoryStore::new());
        assert!(matches!(
            ProductEditor::request_delete(&store, &ProductId::new("custom-9")),
            Err(EditorError::UnknownProduct(_))
        ));
    }

    #[test]
    fn test_forget_resets_only_matching_edit() {
        let store = catalog(&MemoryStore::new());
        let mut editor = ProductEditor::new();
        editor.start_edit(&store.list()[2]);

        editor.forget(&ProductId::new("pf-001"));
        assert!(matches!(editor.mode(), EditorMode::Edit(_)));

        editor.forget(&ProductId::new("pf-003"));
        assert_eq!(editor.mode(), &EditorMode::Create);
    }
}
