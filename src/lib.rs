pub mod cache;
pub mod corpus;
pub mod embedder;
pub mod engine;
pub mod explain;
pub mod index;
pub mod normalize;
pub mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cache::EmbeddingCache;
use embedder::HashEmbedder;
use engine::SearchEngine;

/// Default number of results when `--top-k` is not given.
pub const DEFAULT_TOP_K: usize = 5;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "docsearch",
    version,
    about = "Semantic search over a local document collection"
)]
pub struct Cli {
    /// Override data dir (embedding cache location)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the index and warm the embedding cache
    Index {
        /// Directory of .txt documents
        #[arg(long)]
        docs: PathBuf,
    },
    /// Search the document collection
    Search {
        /// The query text
        query: String,

        /// Number of results to return
        #[arg(long)]
        top_k: Option<usize>,

        /// Directory of .txt documents
        #[arg(long)]
        docs: PathBuf,
    },
    /// Write a small bundled sample corpus
    Seed {
        /// Target directory for the sample documents
        #[arg(long)]
        docs: PathBuf,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);

    match cli.command {
        Commands::Index { docs } => {
            let engine = open_engine(&data_dir)?;
            let documents = corpus::load_corpus(&docs)?;
            let report = engine.build_index(&documents)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Search { query, top_k, docs } => {
            let engine = open_engine(&data_dir)?;
            let documents = corpus::load_corpus(&docs)?;
            engine.build_index(&documents)?;

            let top_k = top_k.unwrap_or_else(default_top_k);
            let results = engine.search(&query, top_k)?;
            for result in &results {
                println!("{}", serde_json::to_string(result)?);
            }
            Ok(())
        }
        Commands::Seed { docs } => {
            let count = seed::write_sample_corpus(&docs)?;
            println!("wrote {count} sample documents to {}", docs.display());
            Ok(())
        }
    }
}

fn open_engine(data_dir: &std::path::Path) -> Result<SearchEngine> {
    let cache_path = data_dir.join("embedding_cache.json");
    let cache = EmbeddingCache::load(&cache_path)
        .with_context(|| format!("load embedding cache at {}", cache_path.display()))?;
    Ok(SearchEngine::new(Arc::new(HashEmbedder::default()), cache))
}

/// Default result count, overridable via `DOCSEARCH_TOP_K`.
pub fn default_top_k() -> usize {
    dotenvy::var("DOCSEARCH_TOP_K")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOP_K)
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "docsearch", "docsearch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".docsearch"))
}
