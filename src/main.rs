//! # newsq CLI
//!
//! The `newsq` binary is the interface to the news research tool. Each
//! subcommand is a stateless action over the persisted store file.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `newsq process <URL>...` | Fetch up to 3 articles, chunk, embed, and build the store |
//! | `newsq ask "<question>"` | Answer a question from the store, citing source URLs |
//! | `newsq status` | Show whether a store exists and what it contains |
//!
//! ## Examples
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//!
//! # Build the index from two articles
//! newsq process https://example.com/a https://example.com/b
//!
//! # Ask about them
//! newsq ask "What did the article say about interest rates?"
//!
//! # Inspect the index
//! newsq status
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use newsq::config;
use newsq::progress::ProgressMode;
use newsq::{answer, process, status};

/// newsq — fetch news articles, index them, and ask questions with cited
/// sources.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; every setting has a built-in default, so the file is optional.
/// The OpenAI credential comes from the `OPENAI_API_KEY` environment
/// variable or from the secrets file named in `[secrets] path`.
#[derive(Parser)]
#[command(
    name = "newsq",
    about = "News research tool — fetch articles, index them, and ask questions with cited sources",
    version
)]
struct Cli {
    /// Path to configuration file (TOML). Optional; defaults apply when absent.
    #[arg(long, global = true, default_value = "./config/newsq.toml")]
    config: PathBuf,

    /// Progress output on stderr: auto, off, human, or json.
    #[arg(long, global = true, default_value = "auto", value_parser = parse_progress)]
    progress: ProgressMode,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Fetch article URLs and build the retrieval index.
    ///
    /// Fetches each URL, splits the article text into chunks, embeds the
    /// chunks, and writes the store file atomically, replacing any prior
    /// store wholesale. A failure on any URL aborts the run without
    /// touching the store.
    Process {
        /// Article URLs (1 to 3). Blank entries are skipped.
        #[arg(num_args = 1..=3, required = true)]
        urls: Vec<String>,
    },

    /// Ask a question about the indexed articles.
    ///
    /// Retrieves the most relevant chunks and asks the completion model
    /// to answer from them, citing source URLs. If no store has been
    /// built yet, this prints nothing and exits successfully.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Show the state of the persisted store.
    Status,
}

fn parse_progress(s: &str) -> Result<ProgressMode, String> {
    ProgressMode::parse(s).ok_or_else(|| {
        format!(
            "invalid progress mode '{}'; use auto, off, human, or json",
            s
        )
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Process { urls } => {
            let reporter = cli.progress.reporter();
            process::run_process(&cfg, &urls, reporter.as_ref()).await?;
        }
        Commands::Ask { question } => {
            answer::run_ask(&cfg, &question).await?;
        }
        Commands::Status => {
            status::run_status(&cfg)?;
        }
    }

    Ok(())
}
