//! Text normalization for consistent embedding input.
//!
//! Normalization is **critical for determinism**: the same visual text must
//! always produce the same normalized form, which in turn produces the same
//! content hash. The content hash is the sole staleness signal for the
//! embedding cache, so any instability here silently defeats caching.
//!
//! # Processing Pipeline
//!
//! 1. **Lowercasing** - "Space Shuttle" → "space shuttle"
//! 2. **Tag stripping** - Remove `<...>` markup spans, keep text content
//! 3. **Whitespace normalization** - Collapse runs to single spaces, trim
//!
//! The pipeline is pure and idempotent: `normalize(normalize(x)) ==
//! normalize(x)` for all inputs.

use sha2::{Digest, Sha256};

/// Normalize text for hashing and embedding.
///
/// Applies the full pipeline (lowercase, tag strip, whitespace collapse).
/// The output is deterministic and idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = strip_tags(&lowered);
    collapse_whitespace(&stripped)
}

/// Compute the SHA256 content hash of text as a lowercase hex string.
///
/// The hash is computed on the UTF-8 bytes of the input. For consistent
/// results, always normalize text first.
pub fn content_hash_hex(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(digest)
}

/// Remove `<...>` tag spans, keeping the surrounding text.
///
/// An unclosed `<` at end of input drops the dangling fragment, matching the
/// greedy-removal behavior of a `<[^>]+>` pattern applied repeatedly.
fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == '<' {
            for inner in chars.by_ref() {
                if inner == '>' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Collapse whitespace runs to single spaces and trim both ends.
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev_whitespace = true; // start true to trim leading

    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_whitespace {
                result.push(' ');
                prev_whitespace = true;
            }
        } else {
            result.push(c);
            prev_whitespace = false;
        }
    }

    result.trim_end().to_string()
}
