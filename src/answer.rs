//! The `ask` action: load the store, retrieve, call the model, print.
//!
//! Asking before any successful `process` run is a silent no-op: the
//! store is simply not built yet, nothing is printed, and the exit code
//! is 0. A corrupt store, a retrieval failure, or a model-call failure
//! aborts the query with the error shown.

use anyhow::Result;

use crate::config::{self, Config};
use crate::embedding;
use crate::llm;
use crate::store::{self, StoreState};

pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    if question.trim().is_empty() {
        return Ok(());
    }

    let api_key = config::resolve_api_key(config)?;

    let store = match store::load_store(&config.store.path)? {
        StoreState::Ready(store) => store,
        StoreState::NotBuilt => return Ok(()),
    };

    let query_vec = embedding::embed_query(
        &config.embedding,
        &config.api.base_url,
        &api_key,
        question,
    )
    .await?;

    let hits = store.search(&query_vec, config.retrieval.top_k);
    if hits.is_empty() {
        return Ok(());
    }

    let prompt = llm::build_prompt(question, &hits);
    let raw = llm::complete(&config.llm, &config.api.base_url, &api_key, &prompt).await?;
    let answer = llm::parse_answer(&raw);

    println!("Answer");
    println!();
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {}", source);
        }
    }

    Ok(())
}
