//! # newsq
//!
//! A news research CLI: paste up to three article URLs, build a retrieval
//! index over their text, and answer free-text questions with a hosted
//! language model that cites its sources.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌────────────┐
//! │  Fetch   │──▶│   Pipeline    │──▶│ Store file  │
//! │ article  │   │ Chunk+Embed  │   │ (atomic)    │
//! │  URLs    │   └──────────────┘   └─────┬──────┘
//! └──────────┘                            │
//!                                         ▼
//!                                   ┌────────────┐
//!                                   │    Ask      │
//!                                   │ retrieve +  │
//!                                   │ complete    │
//!                                   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! newsq process https://example.com/article-1 https://example.com/article-2
//! newsq ask "What did the central bank decide?"
//! newsq status
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credential resolution |
//! | [`models`] | Core data types |
//! | [`fetch`] | Article fetching and HTML text extraction |
//! | [`chunk`] | Recursive character text splitting |
//! | [`embedding`] | OpenAI embeddings client |
//! | [`store`] | Vector store with atomic persistence |
//! | [`llm`] | Completion client, prompting, and answer parsing |
//! | [`process`] | The `process` pipeline |
//! | [`answer`] | The `ask` flow |
//! | [`status`] | Store inspection |
//! | [`progress`] | Progress reporting on stderr |

pub mod answer;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod fetch;
pub mod llm;
pub mod models;
pub mod process;
pub mod progress;
pub mod status;
pub mod store;
