//! Flat in-memory vector index with cosine-similarity search.
//!
//! Vectors are L2-normalized at build time and stored contiguously, so the
//! relevance score is a plain inner product. Build fully replaces prior
//! state; there is no incremental mutation, and entries are never removed
//! individually. A brute-force scan is O(N·D) per query, which is the right
//! trade at the corpus sizes this index serves; an approximate backend can
//! replace it behind the same contract.
//!
//! Search selects the top-k via a bounded min-heap over the whole corpus,
//! with ties broken by insertion order so equal scores produce deterministic
//! output.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use thiserror::Error;

/// Error from index build or search.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("duplicate doc_id in index build: {0}")]
    DuplicateDocId(String),
}

/// One search hit: a document position, its ID, and its cosine score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDoc {
    /// Insertion-order position of the document within the index.
    pub position: usize,
    pub doc_id: String,
    pub score: f32,
}

/// Immutable flat similarity index over unit vectors.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    doc_ids: Vec<String>,
    /// Row-major slab of unit vectors, `len() == doc_ids.len() * dimension`.
    vectors: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from `(doc_id, vector)` pairs.
    ///
    /// Every vector is normalized to unit length. The dimension is fixed by
    /// the first entry; a later entry with a different length fails the
    /// build, as does a duplicate `doc_id`. Zero entries is legal and yields
    /// an index that returns no results for any query.
    pub fn build<I>(entries: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut dimension = 0usize;
        let mut doc_ids = Vec::new();
        let mut vectors = Vec::new();
        let mut seen = HashSet::new();

        for (doc_id, mut vector) in entries {
            if dimension == 0 {
                dimension = vector.len();
            }
            if vector.len() != dimension || dimension == 0 {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    got: vector.len(),
                });
            }
            if !seen.insert(doc_id.clone()) {
                return Err(IndexError::DuplicateDocId(doc_id));
            }
            normalize_in_place(&mut vector);
            doc_ids.push(doc_id);
            vectors.extend_from_slice(&vector);
        }

        Ok(Self {
            dimension,
            doc_ids,
            vectors,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.doc_ids.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.doc_ids.is_empty()
    }

    /// Vector dimension, or 0 for an empty index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `top_k` highest-scoring documents for a query vector.
    ///
    /// The query is normalized before scoring. Returns at most
    /// `min(top_k, len)` results in descending score order; `top_k == 0`
    /// yields an empty list. Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredDoc>, IndexError> {
        if top_k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: query.len(),
            });
        }

        let mut unit_query = query.to_vec();
        normalize_in_place(&mut unit_query);

        let mut heap = BinaryHeap::with_capacity(top_k + 1);
        for (position, row) in self.vectors.chunks_exact(self.dimension).enumerate() {
            let score = dot(row, &unit_query);
            heap.push(std::cmp::Reverse(HeapEntry { score, position }));
            if heap.len() > top_k {
                heap.pop();
            }
        }

        let mut results: Vec<ScoredDoc> = heap
            .into_iter()
            .map(|entry| ScoredDoc {
                position: entry.0.position,
                doc_id: self.doc_ids[entry.0.position].clone(),
                score: entry.0.score,
            })
            .collect();
        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position.cmp(&b.position))
        });
        Ok(results)
    }
}

/// Heap entry ordered by score, then by earlier position on ties.
#[derive(Debug, PartialEq)]
struct HeapEntry {
    score: f32,
    position: usize,
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // For equal scores, a later position ranks as "greater" so the
        // bounded min-heap evicts it first, keeping first-built entries.
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.position.cmp(&self.position))
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale a vector to unit L2 norm. Zero vectors are left unchanged.
fn normalize_in_place(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, v: &[f32]) -> (String, Vec<f32>) {
        (id.to_string(), v.to_vec())
    }

    #[test]
    fn test_empty_build_returns_nothing() {
        let index = VectorIndex::build(Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_self_similarity_is_one() {
        let index = VectorIndex::build(vec![
            entry("a", &[3.0, 4.0, 0.0]),
            entry("b", &[0.0, 1.0, 1.0]),
        ])
        .unwrap();

        let results = index.search(&[3.0, 4.0, 0.0], 1).unwrap();
        assert_eq!(results[0].doc_id, "a");
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_bounded_by_corpus_size() {
        let index = VectorIndex::build(vec![
            entry("a", &[1.0, 0.0]),
            entry("b", &[0.0, 1.0]),
        ])
        .unwrap();

        assert_eq!(index.search(&[1.0, 0.0], 5).unwrap().len(), 2);
        assert_eq!(index.search(&[1.0, 0.0], 1).unwrap().len(), 1);
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_descending_score_order() {
        let index = VectorIndex::build(vec![
            entry("far", &[0.0, 1.0]),
            entry("near", &[1.0, 0.1]),
            entry("exact", &[1.0, 0.0]),
        ])
        .unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "near", "far"]);
        assert!(results[0].score >= results[1].score);
        assert!(results[1].score >= results[2].score);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        // Identical vectors produce identical scores for any query.
        let index = VectorIndex::build(vec![
            entry("first", &[1.0, 1.0]),
            entry("second", &[1.0, 1.0]),
            entry("third", &[1.0, 1.0]),
        ])
        .unwrap();

        let results = index.search(&[2.0, 2.0], 2).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = VectorIndex::build(vec![entry("a", &[1.0, 0.0, 0.0])]).unwrap();
        let err = index.search(&[1.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            IndexError::DimensionMismatch { expected: 3, got: 2 }
        ));
    }

    #[test]
    fn test_build_dimension_mismatch() {
        let err = VectorIndex::build(vec![
            entry("a", &[1.0, 0.0]),
            entry("b", &[1.0, 0.0, 0.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, IndexError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_build_rejects_duplicate_doc_id() {
        let err = VectorIndex::build(vec![
            entry("a", &[1.0, 0.0]),
            entry("a", &[0.0, 1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, IndexError::DuplicateDocId(id) if id == "a"));
    }

    #[test]
    fn test_stored_vectors_are_unit_length() {
        let index = VectorIndex::build(vec![entry("a", &[10.0, 0.0])]).unwrap();
        // A unit query against a stored unit vector scores exactly their
        // cosine; magnitude of the original vector must not matter.
        let results = index.search(&[0.1, 0.0], 1).unwrap();
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let index = VectorIndex::build(vec![entry("a", &[1.0, 0.0])]).unwrap();
        let results = index.search(&[0.0, 0.0], 1).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
    }
}
