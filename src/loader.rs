//! Document loading: resolves a handle into raw UTF-8 text.
//!
//! Only a binary distinction is made: `.pdf` files go through `pdf-extract`,
//! `.txt`/`.md` files are read as UTF-8. Every other extension is rejected
//! with [`RagError::UnsupportedFormat`] before any bytes are read; there is
//! no content sniffing.

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::error::RagError;
use crate::models::{DocumentHandle, DocumentKind, SourceDocument};

/// Determine the declared content kind from the handle's file extension.
pub fn kind_for_path(path: &Path) -> Result<DocumentKind, RagError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => Ok(DocumentKind::Pdf),
        "txt" | "md" => Ok(DocumentKind::PlainText),
        "" => Err(RagError::UnsupportedFormat("(no extension)".to_string())),
        other => Err(RagError::UnsupportedFormat(other.to_string())),
    }
}

/// Load the document a handle points at.
///
/// Fails with [`RagError::UnsupportedFormat`] for undeclared kinds and
/// [`RagError::Load`] when content extraction fails (unreadable file,
/// corrupt PDF, invalid UTF-8).
pub fn load(handle: &DocumentHandle) -> Result<SourceDocument, RagError> {
    let kind = kind_for_path(&handle.path)?;

    let source_id = handle
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| handle.path.to_string_lossy().into_owned());

    let text = match kind {
        DocumentKind::Pdf => {
            let bytes = std::fs::read(&handle.path)
                .with_context(|| format!("Failed to read {}", handle.path.display()))
                .map_err(RagError::Load)?;
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| RagError::Load(anyhow::anyhow!("PDF extraction failed: {}", e)))?
        }
        DocumentKind::PlainText => std::fs::read_to_string(&handle.path)
            .with_context(|| format!("Failed to read {}", handle.path.display()))
            .map_err(RagError::Load)?,
    };

    debug!(source_id = %source_id, chars = text.chars().count(), "loaded document");

    Ok(SourceDocument {
        source_id,
        kind,
        text,
    })
}
