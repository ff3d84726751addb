//! The `process` action: fetch → chunk → embed → build store → persist.
//!
//! Stateless per invocation. Every prior store is fully replaced; any
//! failure along the way aborts before the store file is touched, so a
//! failed run never leaves a partial index behind.

use anyhow::{bail, Result};

use crate::chunk::chunk_document;
use crate::config::{self, Config};
use crate::embedding;
use crate::fetch;
use crate::models::Chunk;
use crate::progress::{ProcessEvent, ProgressReporter};
use crate::store::{self, VectorStore};

pub async fn run_process(
    config: &Config,
    urls: &[String],
    progress: &dyn ProgressReporter,
) -> Result<()> {
    // Credential resolution is fatal before any network call.
    let api_key = config::resolve_api_key(config)?;

    let usable = fetch::usable_urls(urls)?;
    let client = fetch::article_client(config)?;
    let total = usable.len() as u64;

    let mut documents = Vec::with_capacity(usable.len());
    for (i, url) in usable.iter().enumerate() {
        progress.report(ProcessEvent::Fetching { n: i as u64, total });
        documents.push(fetch::fetch_article(&client, url).await?);
    }
    progress.report(ProcessEvent::Fetching { n: total, total });

    progress.report(ProcessEvent::Chunking {
        documents: documents.len() as u64,
    });
    let mut chunks: Vec<Chunk> = Vec::new();
    for document in &documents {
        chunks.extend(chunk_document(document, &config.chunking));
    }
    if chunks.is_empty() {
        bail!("No text chunks produced from the fetched articles");
    }

    let mut store = VectorStore::new(&config.embedding.model, config.embedding.dims);
    let batch_size = config.embedding.batch_size;
    let total_batches = chunks.len().div_ceil(batch_size) as u64;

    for (i, batch) in chunks.chunks(batch_size).enumerate() {
        progress.report(ProcessEvent::Embedding {
            n: i as u64,
            total: total_batches,
        });
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = embedding::embed_texts(
            &config.embedding,
            &config.api.base_url,
            &api_key,
            &texts,
        )
        .await?;
        for (chunk, vector) in batch.iter().zip(vectors) {
            store.insert(chunk, vector);
        }
    }

    progress.report(ProcessEvent::Indexing {
        chunks: store.entries.len() as u64,
    });
    store::save_store(&store, &config.store.path)?;

    println!("process");
    println!("  articles fetched: {}", documents.len());
    for document in &documents {
        match &document.title {
            Some(title) => println!("    - {} ({})", title, document.url),
            None => println!("    - {}", document.url),
        }
    }
    println!("  chunks indexed: {}", store.entries.len());
    println!("  embedding model: {}", store.embedding_model);
    println!("  store: {}", config.store.path.display());
    println!("ok");

    Ok(())
}
