//! Persistent embedding cache keyed by document ID.
//!
//! The cache maps each document ID to the content hash and embedding vector
//! that were current the last time the document was embedded. An entry is
//! reusable only while its stored hash still equals the hash of the
//! document's normalized text; any mismatch forces recomputation.
//!
//! # Durability
//!
//! `put` upserts the entry and synchronously persists the whole store before
//! returning, so a crash never loses more than the in-flight update. The
//! persist is atomic with respect to partial writes: the store is written to
//! a temp file in the same directory, fsynced, and renamed over the target.
//!
//! # Corruption policy
//!
//! A missing store file is an empty cache. A store file that exists but does
//! not parse is a fatal [`CacheError::Corrupt`]: silently discarding it would
//! throw away every cached embedding, so the decision is left to the user.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Error from cache load or persist.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store at {path} exists but cannot be parsed: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cache I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cache store serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One cached embedding, keyed by document ID in the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    /// Embedding vector as computed from the normalized text.
    pub embedding: Vec<f32>,
    /// Hex SHA256 of the normalized text at embed time.
    pub hash: String,
    /// When the entry was last written.
    pub updated_at: DateTime<Utc>,
}

/// Embedding cache backed by a single JSON store file.
#[derive(Debug)]
pub struct EmbeddingCache {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

impl EmbeddingCache {
    /// Load the store at `path`.
    ///
    /// A missing file is an empty cache, not an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|source| CacheError::Corrupt {
                    path: path.clone(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.clone(),
                    source,
                });
            }
        };
        debug!(path = %path.display(), entries = entries.len(), "loaded embedding cache");
        Ok(Self { path, entries })
    }

    /// Look up the entry for a document ID.
    pub fn get(&self, doc_id: &str) -> Option<&CacheEntry> {
        self.entries.get(doc_id)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Upsert an entry and synchronously persist the whole store.
    pub fn put(
        &mut self,
        doc_id: &str,
        hash: &str,
        embedding: Vec<f32>,
    ) -> Result<(), CacheError> {
        self.entries.insert(
            doc_id.to_string(),
            CacheEntry {
                embedding,
                hash: hash.to_string(),
                updated_at: Utc::now(),
            },
        );
        self.persist()
    }

    /// Write the store to disk via atomic publish.
    ///
    /// Writes to `<store>.tmp`, fsyncs, then renames over the target so a
    /// crash mid-write leaves the previous store intact.
    fn persist(&self) -> Result<(), CacheError> {
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(io_err)?;

        let raw = serde_json::to_vec_pretty(&self.entries)?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = File::create(&temp_path).map_err(io_err)?;
        file.write_all(&raw).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&temp_path, &self.path).map_err(io_err)?;
        sync_dir(parent).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    // Directory handles cannot be fsynced on Windows; rename is still atomic.
    Ok(())
}
