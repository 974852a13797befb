//! Search engine orchestration.
//!
//! [`SearchEngine`] ties the pipeline together: documents are normalized and
//! content-hashed, embeddings come from the cache when the hash still
//! matches (and the dimension agrees with the active embedder) or from the
//! provider otherwise, and the resulting vectors are built into one
//! immutable index snapshot.
//!
//! Rebuilds swap the snapshot behind an `RwLock` as a single `Arc`
//! assignment, so a search in flight sees either the old or the new index,
//! never a partially built one. A document that fails to embed during a
//! build is skipped with a warning and reported in the [`BuildReport`]; a
//! query that fails to embed fails that search only.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::cache::{CacheError, EmbeddingCache};
use crate::corpus::Document;
use crate::embedder::{Embedder, EmbedderError};
use crate::explain::{self, Explanation, round_to};
use crate::index::{IndexError, VectorIndex};
use crate::normalize::{content_hash_hex, normalize};

/// Characters of raw text kept in a result preview.
pub const PREVIEW_CHARS: usize = 200;

/// Error from engine build or search.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("search index has not been built yet")]
    IndexNotBuilt,
    #[error("query embedding failed: {0}")]
    QueryEmbedding(EmbedderError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// One ranked, explained search hit.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub doc_id: String,
    /// Cosine similarity, rounded to 4 decimals.
    pub score: f32,
    /// Leading slice of the original document text.
    pub preview: String,
    pub explanation: Explanation,
}

/// Outcome of a build: how each document's vector was obtained.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BuildReport {
    /// Documents in the built index.
    pub indexed: usize,
    /// Vectors reused from the cache.
    pub reused: usize,
    /// Vectors freshly computed by the embedder.
    pub embedded: usize,
    /// Documents dropped because embedding failed.
    pub skipped: Vec<String>,
}

/// Display metadata kept alongside each index position.
#[derive(Debug)]
struct DocMeta {
    preview: String,
    normalized_text: String,
}

/// A fully built index plus the metadata its positions refer to.
#[derive(Debug)]
struct IndexSnapshot {
    index: VectorIndex,
    docs: Vec<DocMeta>,
}

/// Orchestrator over embedder, cache, and index.
///
/// Explicitly constructed, no global state; independent instances are cheap
/// enough for tests. Lifecycle: `new` → `build_index` → `search` (rebuild
/// at any time).
pub struct SearchEngine {
    embedder: Arc<dyn Embedder>,
    cache: Mutex<EmbeddingCache>,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
}

impl SearchEngine {
    pub fn new(embedder: Arc<dyn Embedder>, cache: EmbeddingCache) -> Self {
        Self {
            embedder,
            cache: Mutex::new(cache),
            snapshot: RwLock::new(None),
        }
    }

    /// Whether a build has completed and searches can run.
    pub fn is_ready(&self) -> bool {
        self.snapshot.read().is_some()
    }

    /// Build (or rebuild) the index over `docs`.
    ///
    /// Per document: reuse the cached vector when its stored hash matches
    /// the current normalized-text hash and its length matches the active
    /// embedder's dimension; otherwise embed and persist the new entry. An
    /// embedding failure skips that document and the build continues.
    pub fn build_index(&self, docs: &[Document]) -> Result<BuildReport, EngineError> {
        let dimension = self.embedder.dimension();
        let mut report = BuildReport::default();
        let mut entries = Vec::with_capacity(docs.len());
        let mut metas = Vec::with_capacity(docs.len());

        // Cache mutation serializes through this lock for the whole build.
        let mut cache = self.cache.lock();

        for doc in docs {
            let hash = content_hash_hex(&doc.normalized_text);

            let vector = match cache.get(&doc.id) {
                Some(entry) if entry.hash == hash && entry.embedding.len() == dimension => {
                    report.reused += 1;
                    entry.embedding.clone()
                }
                _ => match self.embedder.embed(&doc.normalized_text) {
                    Ok(vector) => {
                        cache.put(&doc.id, &hash, vector.clone())?;
                        report.embedded += 1;
                        vector
                    }
                    Err(error) => {
                        warn!(doc_id = %doc.id, %error, "embedding failed, skipping document");
                        report.skipped.push(doc.id.clone());
                        continue;
                    }
                },
            };

            entries.push((doc.id.clone(), vector));
            metas.push(DocMeta {
                preview: make_preview(&doc.raw_text),
                normalized_text: doc.normalized_text.clone(),
            });
        }

        let index = VectorIndex::build(entries)?;
        report.indexed = index.len();

        *self.snapshot.write() = Some(Arc::new(IndexSnapshot { index, docs: metas }));

        info!(
            indexed = report.indexed,
            reused = report.reused,
            embedded = report.embedded,
            skipped = report.skipped.len(),
            embedder = self.embedder.id(),
            "index built"
        );
        Ok(report)
    }

    /// Execute a query, returning at most `top_k` explained results.
    pub fn search(&self, query_text: &str, top_k: usize) -> Result<Vec<SearchResult>, EngineError> {
        let snapshot = self
            .snapshot
            .read()
            .clone()
            .ok_or(EngineError::IndexNotBuilt)?;

        let normalized_query = normalize(query_text);
        let query_vector = self
            .embedder
            .embed(&normalized_query)
            .map_err(EngineError::QueryEmbedding)?;

        let hits = snapshot.index.search(&query_vector, top_k)?;

        let results = hits
            .into_iter()
            .map(|hit| {
                let meta = &snapshot.docs[hit.position];
                let explanation =
                    explain::explain(&normalized_query, &meta.normalized_text, hit.score);
                SearchResult {
                    doc_id: hit.doc_id,
                    score: round_to(hit.score, 4),
                    preview: meta.preview.clone(),
                    explanation,
                }
            })
            .collect();
        Ok(results)
    }
}

/// First [`PREVIEW_CHARS`] characters of the raw text, with a trailing
/// ellipsis marker.
fn make_preview(raw_text: &str) -> String {
    let mut preview: String = raw_text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
