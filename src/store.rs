//! In-memory vector store with atomic single-file persistence.
//!
//! The store holds one entry per indexed chunk: the embedding vector, the
//! chunk text, and the originating article URL. Search is exact
//! nearest-neighbor by cosine similarity. A `process` run builds a fresh
//! store and overwrites any prior file wholesale; there is no incremental
//! update.
//!
//! Persistence is a single JSON file written atomically: serialize to a
//! temporary sibling, fsync, then rename into place, so a crash mid-write
//! never leaves a half-written store. Loading distinguishes "not built
//! yet" (file absent, an expected condition) from a corrupt or
//! incompatible file (an error).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::embedding::cosine_similarity;
use crate::models::Chunk;

/// Bumped when the on-disk layout changes. A mismatch on load is reported
/// as an incompatible store, not a parse failure.
const STORE_FORMAT_VERSION: u32 = 1;

/// One indexed chunk: embedding vector, text, and source URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEntry {
    pub embedding: Vec<f32>,
    pub text: String,
    pub source_url: String,
}

/// The persisted similarity index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    pub format_version: u32,
    pub embedding_model: String,
    pub dims: usize,
    pub built_at: DateTime<Utc>,
    pub entries: Vec<StoreEntry>,
}

/// A search hit: entry content plus its similarity to the query.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub score: f32,
    pub text: String,
    pub source_url: String,
}

/// Outcome of loading the store file.
#[derive(Debug)]
pub enum StoreState {
    /// No store file exists — `process` has not run successfully yet.
    NotBuilt,
    Ready(VectorStore),
}

impl VectorStore {
    pub fn new(embedding_model: &str, dims: usize) -> Self {
        Self {
            format_version: STORE_FORMAT_VERSION,
            embedding_model: embedding_model.to_string(),
            dims,
            built_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, chunk: &Chunk, embedding: Vec<f32>) {
        self.entries.push(StoreEntry {
            embedding,
            text: chunk.text.clone(),
            source_url: chunk.source_url.clone(),
        });
    }

    /// Top-k entries by descending cosine similarity to `query`.
    /// Ties break on insertion order, so results are deterministic.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<Retrieved> {
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(i, score)| Retrieved {
                score,
                text: self.entries[i].text.clone(),
                source_url: self.entries[i].source_url.clone(),
            })
            .collect()
    }

    /// Distinct source URLs in insertion order.
    pub fn source_urls(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.source_url) {
                seen.push(entry.source_url.clone());
            }
        }
        seen
    }
}

/// Write the store to `path` atomically: temp sibling, fsync, rename.
pub fn save_store(store: &VectorStore, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    let bytes = serde_json::to_vec(store).context("Failed to serialize store")?;

    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_path);

    let mut file = std::fs::File::create(&tmp_path)
        .with_context(|| format!("Failed to create temp store file: {}", tmp_path.display()))?;
    file.write_all(&bytes)
        .with_context(|| format!("Failed to write store: {}", tmp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("Failed to sync store: {}", tmp_path.display()))?;
    drop(file);

    std::fs::rename(&tmp_path, path).with_context(|| {
        format!(
            "Failed to move store into place: {} -> {}",
            tmp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Load the store from `path`.
///
/// A missing file is [`StoreState::NotBuilt`]. An unreadable, unparseable,
/// or incompatible file is an error naming the path.
pub fn load_store(path: &Path) -> Result<StoreState> {
    if !path.exists() {
        return Ok(StoreState::NotBuilt);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file: {}", path.display()))?;

    let store: VectorStore = serde_json::from_str(&content)
        .with_context(|| format!("Corrupt store file: {}", path.display()))?;

    if store.format_version != STORE_FORMAT_VERSION {
        bail!(
            "Incompatible store file {} (format version {}, expected {}). \
             Run `newsq process` to rebuild it.",
            path.display(),
            store.format_version,
            STORE_FORMAT_VERSION
        );
    }

    Ok(StoreState::Ready(store))
}
