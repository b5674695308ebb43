//! Image file encoding for transport.
//!
//! The remote API takes images embedded as `data:` URIs, so each file is
//! read fully and base64-encoded, tagged with a format derived from its
//! extension (`jpg` normalizes to `jpeg`).

use base64::{engine::general_purpose, Engine};
use std::path::Path;

use crate::error::{Error, Result};

/// A base64-encoded image payload plus its format tag.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub payload: String,
    pub format: String,
}

impl EncodedImage {
    /// Render as an embeddable `data:image/...;base64,...` URI.
    pub fn data_uri(&self) -> String {
        format!("data:image/{};base64,{}", self.format, self.payload)
    }
}

/// Format tag for an image path, from its extension.
pub fn image_format(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if ext == "jpg" {
        "jpeg".to_string()
    } else {
        ext
    }
}

/// Read an image file and base64-encode it.
///
/// Failure is an [`Error::ImageRead`] for the caller to surface as a
/// per-pair failure; it must not abort the batch.
pub fn encode_image(path: &Path) -> Result<EncodedImage> {
    let bytes = std::fs::read(path).map_err(|source| Error::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(EncodedImage {
        payload: general_purpose::STANDARD.encode(&bytes),
        format: image_format(path),
    })
}
