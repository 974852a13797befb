//! Embedding provider abstraction.
//!
//! The engine depends only on the [`Embedder`] trait: given normalized text,
//! deterministically produce a fixed-dimension vector. Embedding is the
//! expensive step in the pipeline and the reason the cache exists, so the
//! engine never retries a failed call; failures propagate to the policy
//! layer (skip-and-warn during builds, fatal for a query).
//!
//! The in-tree implementation is [`HashEmbedder`], an FNV-1a feature-hashing
//! embedder: deterministic, dependency-free, and always available. Semantic
//! ML embedders plug in behind the same trait.

use thiserror::Error;

/// Error from an embedding provider.
#[derive(Debug, Error)]
pub enum EmbedderError {
    #[error("embedder unavailable: {0}")]
    Unavailable(String),
    #[error("embedding failed: {0}")]
    Failed(String),
}

pub type EmbedderResult<T> = Result<T, EmbedderError>;

/// An embedding provider with a fixed output dimension.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector for a given embedder ID.
pub trait Embedder: Send + Sync {
    /// Stable identifier (e.g. "fnv1a-384").
    fn id(&self) -> &str;

    /// Output dimension, constant for the lifetime of the embedder.
    fn dimension(&self) -> usize;

    /// Embed normalized text into a `dimension()`-length vector.
    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>>;
}

/// Default dimension for the feature-hash embedder.
pub const HASH_EMBEDDER_DIMENSION: usize = 384;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a feature-hashing embedder.
///
/// Each word token is hashed into one of `dimension` buckets with a
/// hash-derived sign, so lexically similar texts land near each other in the
/// vector space. Not semantic, but deterministic and model-free.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    id: String,
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(HASH_EMBEDDER_DIMENSION)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            id: format!("fnv1a-{dimension}"),
            dimension,
        }
    }
}

impl Embedder for HashEmbedder {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> EmbedderResult<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimension as u64) as usize;
            // One hash bit decides the sign so unrelated tokens sharing a
            // bucket tend to cancel rather than pile up.
            let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        Ok(vector)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
