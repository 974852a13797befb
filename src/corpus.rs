//! Document source: a directory of `.txt` files.
//!
//! Each file becomes one document, with the file name as its stable ID.
//! Files are visited in lexicographic order so build order (and therefore
//! tie-breaking in the index) is deterministic across runs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::normalize::normalize;

/// A document read from the source collection, immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable unique identifier (the source file name).
    pub id: String,
    /// Original text, used for result previews.
    pub raw_text: String,
    /// Normalized text, used for hashing, embedding, and overlap.
    pub normalized_text: String,
    /// Length of the normalized text in characters.
    pub length: usize,
}

impl Document {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let normalized_text = normalize(&raw_text);
        let length = normalized_text.chars().count();
        Self {
            id: id.into(),
            raw_text,
            normalized_text,
            length,
        }
    }
}

/// Load every `*.txt` file under `dir` as a document, sorted by file name.
///
/// Non-`.txt` entries and subdirectories are skipped.
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("read document directory {}", dir.display()))?
        .filter_map(|entry| Some(entry.ok()?.file_name().to_string_lossy().into_owned()))
        .filter(|name| name.ends_with(".txt"))
        .collect();
    names.sort();

    let mut docs = Vec::with_capacity(names.len());
    for name in names {
        let path = dir.join(&name);
        if !path.is_file() {
            continue;
        }
        let raw_text = fs::read_to_string(&path)
            .with_context(|| format!("read document {}", path.display()))?;
        docs.push(Document::new(name, raw_text));
    }

    debug!(dir = %dir.display(), count = docs.len(), "loaded corpus");
    Ok(docs)
}
