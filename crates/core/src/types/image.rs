//! Product image references.
//!
//! An image is either a path to a bundled asset or an inline `data:` URL built
//! from an uploaded file. There is no external image host.

use core::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Errors from converting an upload into an inline image.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The upload had no bytes.
    #[error("image upload is empty")]
    Empty,
    /// The declared content type is not `image/*`.
    #[error("unsupported content type {0:?}, expected an image")]
    NotAnImage(String),
    /// The upload exceeds [`ProductImage::MAX_UPLOAD_BYTES`].
    #[error("image is {size} bytes, limit is {max}")]
    TooLarge {
        /// Size of the rejected upload.
        size: usize,
        /// Upload limit.
        max: usize,
    },
}

/// Reference to a product's display image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductImage(String);

impl ProductImage {
    /// Image used when a record is created without one.
    pub const PLACEHOLDER: &'static str = "/placeholder.svg";

    /// Upload ceiling. Inline images live in the persisted collection, so they
    /// are kept small.
    pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

    /// Reference a bundled asset by path.
    #[must_use]
    pub fn asset(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The placeholder image.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(Self::PLACEHOLDER.to_owned())
    }

    /// Embed an uploaded file as a base64 `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] for empty, oversized, or non-image uploads.
    pub fn from_upload(content_type: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        let mime = content_type.trim().to_ascii_lowercase();
        if !mime.starts_with("image/") {
            return Err(ImageError::NotAnImage(content_type.to_owned()));
        }
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > Self::MAX_UPLOAD_BYTES {
            return Err(ImageError::TooLarge {
                size: bytes.len(),
                max: Self::MAX_UPLOAD_BYTES,
            });
        }

        Ok(Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes))))
    }

    /// Whether this is the placeholder image.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0 == Self::PLACEHOLDER
    }

    /// Whether the image is embedded inline.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.0.starts_with("data:")
    }

    /// The reference as a string (path or data URL).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProductImage {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for ProductImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
