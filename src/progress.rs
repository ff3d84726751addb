//! Process progress reporting.
//!
//! Reports observable progress during `newsq process` so users see which
//! stage the pipeline is in and how much is left. Progress is emitted on
//! **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for the process pipeline.
#[derive(Clone, Debug)]
pub enum ProcessEvent {
    /// Fetching article n of total.
    Fetching { n: u64, total: u64 },
    /// All documents fetched; splitting into chunks.
    Chunking { documents: u64 },
    /// Embedding batch n of total batches.
    Embedding { n: u64, total: u64 },
    /// Writing the store to disk.
    Indexing { chunks: u64 },
}

/// Reports process progress. Implementations write to stderr (human or JSON).
pub trait ProgressReporter: Send + Sync {
    /// Emit a progress event. Called from the process pipeline.
    fn report(&self, event: ProcessEvent);
}

/// Human-friendly progress on stderr: "process  embedding  2 / 5 batches".
pub struct StderrProgress;

impl ProgressReporter for StderrProgress {
    fn report(&self, event: ProcessEvent) {
        let line = match &event {
            ProcessEvent::Fetching { n, total } => {
                format!("process  fetching  {} / {} urls\n", n, total)
            }
            ProcessEvent::Chunking { documents } => {
                format!("process  chunking  {} documents\n", documents)
            }
            ProcessEvent::Embedding { n, total } => {
                format!("process  embedding  {} / {} batches\n", n, total)
            }
            ProcessEvent::Indexing { chunks } => {
                format!("process  indexing  {} chunks\n", chunks)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl ProgressReporter for JsonProgress {
    fn report(&self, event: ProcessEvent) {
        let obj = match &event {
            ProcessEvent::Fetching { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "fetching",
                "n": n,
                "total": total
            }),
            ProcessEvent::Chunking { documents } => serde_json::json!({
                "event": "progress",
                "phase": "chunking",
                "documents": documents
            }),
            ProcessEvent::Embedding { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "embedding",
                "n": n,
                "total": total
            }),
            ProcessEvent::Indexing { chunks } => serde_json::json!({
                "event": "progress",
                "phase": "indexing",
                "chunks": chunks
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: ProcessEvent) {}
}

/// Progress mode for the CLI: auto, off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Auto,
    Off,
    Human,
    Json,
}

impl ProgressMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(ProgressMode::Auto),
            "off" => Some(ProgressMode::Off),
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            _ => None,
        }
    }

    /// Build a reporter for this mode. `Auto` emits human progress only
    /// when stderr is a TTY.
    pub fn reporter(&self) -> Box<dyn ProgressReporter> {
        match self {
            ProgressMode::Auto => {
                if atty::is(atty::Stream::Stderr) {
                    Box::new(StderrProgress)
                } else {
                    Box::new(NoProgress)
                }
            }
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!(ProgressMode::parse("auto"), Some(ProgressMode::Auto));
        assert_eq!(ProgressMode::parse("off"), Some(ProgressMode::Off));
        assert_eq!(ProgressMode::parse("human"), Some(ProgressMode::Human));
        assert_eq!(ProgressMode::parse("json"), Some(ProgressMode::Json));
        assert_eq!(ProgressMode::parse("loud"), None);
    }
}
