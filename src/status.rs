//! The `status` action: report what the persisted store contains.

use anyhow::Result;

use crate::config::Config;
use crate::store::{self, StoreState};

pub fn run_status(config: &Config) -> Result<()> {
    match store::load_store(&config.store.path)? {
        StoreState::NotBuilt => {
            println!("store: not built ({})", config.store.path.display());
            println!("Run `newsq process <URL>...` to build it.");
        }
        StoreState::Ready(store) => {
            println!("store: {}", config.store.path.display());
            println!("  built: {}", store.built_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!(
                "  embedding model: {} ({} dims)",
                store.embedding_model, store.dims
            );
            println!("  chunks: {}", store.entries.len());
            let sources = store.source_urls();
            println!("  sources: {}", sources.len());
            for url in sources {
                println!("    - {}", url);
            }
        }
    }

    Ok(())
}
