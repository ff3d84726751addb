//! Core data models used throughout newsq.
//!
//! These types represent the articles, chunks, and answers that flow
//! through the processing and question-answering pipeline.

use chrono::{DateTime, Utc};

/// A fetched article before chunking. Discarded once chunked.
#[derive(Debug, Clone)]
pub struct Document {
    pub url: String,
    pub title: Option<String>,
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// A chunk of an article's body text.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: String,
    pub source_url: String,
    pub chunk_index: i64,
    pub text: String,
    pub hash: String,
}

/// The result of answering a question: model output plus cited source URLs.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
}
