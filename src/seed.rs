//! Bundled sample corpus for demos and smoke tests.
//!
//! Writes a handful of short space/graphics documents as `doc_NNN.txt`
//! files, so the pipeline can be exercised without an external dataset.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

const SAMPLE_DOCS: &[&str] = &[
    "The space shuttle launch was delayed by weather. Engineers reviewed \
     the external tank sensors before committing to the new launch window.",
    "JPEG compression discards high-frequency detail that the eye barely \
     notices. Quality settings trade file size against visible artifacts.",
    "The lunar module descended through a cloud of dust kicked up by its \
     own engine. Apollo crews reported the surface glittered like powder.",
    "Ray tracing follows light backwards from the camera through each \
     pixel, bouncing between surfaces until it reaches a light source.",
    "Orbital mechanics is mostly patience: a spacecraft raising its orbit \
     burns prograde at perigee and then coasts for hours.",
    "Texture mapping wraps a flat image around polygon geometry. Filtering \
     choices decide whether distant surfaces shimmer or blur.",
    "The Hubble deep field exposed a seemingly empty patch of sky for days \
     and found thousands of galaxies in the darkness.",
    "Vector displays draw strokes directly instead of scanning a raster \
     grid, which is why old arcade lines look impossibly sharp.",
];

/// Write the sample corpus into `dir`, creating it if needed.
///
/// Returns the number of documents written. Existing files with the same
/// names are overwritten.
pub fn write_sample_corpus(dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir)
        .with_context(|| format!("create corpus directory {}", dir.display()))?;

    for (i, text) in SAMPLE_DOCS.iter().enumerate() {
        let path = dir.join(format!("doc_{i:03}.txt"));
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    }

    info!(dir = %dir.display(), count = SAMPLE_DOCS.len(), "wrote sample corpus");
    Ok(SAMPLE_DOCS.len())
}
