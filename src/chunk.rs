//! Recursive character text splitter.
//!
//! Splits article body text into [`Chunk`]s bounded by a configurable
//! `max_chars` limit. Splitting tries an ordered list of separators from
//! coarsest (`"\n\n"`) to finest (`","`): a piece still over the limit
//! after a split is recursively split with the remaining separators, and
//! adjacent small pieces are greedily re-merged so chunks stay close to
//! the limit without crossing it.
//!
//! Each chunk receives a UUID, its source URL, a contiguous index, and a
//! SHA-256 hash of its text.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::models::{Chunk, Document};

/// Split a document into chunks tagged with its source URL.
/// Returns chunks with contiguous indices starting at 0; an empty or
/// whitespace-only body yields no chunks.
pub fn chunk_document(document: &Document, config: &ChunkingConfig) -> Vec<Chunk> {
    split_text(&document.body, config.max_chars, &config.separators)
        .into_iter()
        .enumerate()
        .map(|(i, text)| make_chunk(&document.url, i as i64, &text))
        .collect()
}

/// Split text into pieces of at most `max_chars` characters.
///
/// Deterministic: identical input and parameters always produce the same
/// sequence. A piece that no separator can split may exceed `max_chars`;
/// that is the only case where the bound is not honored.
pub fn split_text(text: &str, max_chars: usize, separators: &[String]) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed.len() <= max_chars {
        return vec![trimmed.to_string()];
    }
    split_recursive(trimmed, max_chars, separators)
}

fn split_recursive(text: &str, max_chars: usize, separators: &[String]) -> Vec<String> {
    // No separator left that can break this piece below the bound.
    let Some((sep, finer)) = separators.split_first() else {
        return vec![text.to_string()];
    };

    if !text.contains(sep.as_str()) {
        return split_recursive(text, max_chars, finer);
    }

    let mut pieces: Vec<String> = Vec::new();
    for part in text.split(sep.as_str()) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part.len() > max_chars {
            pieces.extend(split_recursive(part, max_chars, finer));
        } else {
            pieces.push(part.to_string());
        }
    }

    merge_pieces(pieces, sep, max_chars)
}

/// Greedily re-merge adjacent pieces, rejoined with the separator that
/// split them, while the merge stays within `max_chars`.
fn merge_pieces(pieces: Vec<String>, sep: &str, max_chars: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    let mut current = String::new();

    for piece in pieces {
        if current.is_empty() {
            current = piece;
            continue;
        }
        if current.len() + sep.len() + piece.len() <= max_chars {
            current.push_str(sep);
            current.push_str(&piece);
        } else {
            merged.push(current);
            current = piece;
        }
    }
    if !current.is_empty() {
        merged.push(current);
    }

    merged
}

fn make_chunk(source_url: &str, index: i64, text: &str) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    Chunk {
        id: Uuid::new_v4().to_string(),
        source_url: source_url.to_string(),
        chunk_index: index,
        text: text.to_string(),
        hash,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn seps() -> Vec<String> {
        vec![
            "\n\n".to_string(),
            "\n".to_string(),
            ".".to_string(),
            ",".to_string(),
        ]
    }

    fn doc(body: &str) -> Document {
        Document {
            url: "https://example.com/article".to_string(),
            title: None,
            body: body.to_string(),
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn test_small_text_single_piece() {
        let pieces = split_text("Hello, world!", 1000, &seps());
        assert_eq!(pieces, vec!["Hello, world!"]);
    }

    #[test]
    fn test_empty_text_no_pieces() {
        assert!(split_text("", 1000, &seps()).is_empty());
        assert!(split_text("   \n\n  ", 1000, &seps()).is_empty());
    }

    #[test]
    fn test_splits_on_paragraphs_first() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let pieces = split_text(text, 20, &seps());
        assert!(pieces.len() >= 3);
        assert!(pieces[0].contains("First paragraph"));
    }

    #[test]
    fn test_falls_back_to_finer_separators() {
        // One long paragraph with no newlines forces sentence-level splits.
        let text = "Sentence one is here. Sentence two is here. Sentence three is here.";
        let pieces = split_text(text, 25, &seps());
        assert!(pieces.len() > 1);
        for p in &pieces {
            assert!(p.len() <= 25, "piece too long: {:?}", p);
        }
    }

    #[test]
    fn test_size_bound_respected() {
        let text = (0..40)
            .map(|i| format!("Paragraph number {} with a bit of filler text.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let pieces = split_text(&text, 200, &seps());
        for p in &pieces {
            assert!(p.len() <= 200, "piece of {} chars exceeds bound", p.len());
        }
    }

    #[test]
    fn test_unsplittable_piece_may_exceed_bound() {
        // No separator occurs in this token, so it cannot be split.
        let text = "x".repeat(50);
        let pieces = split_text(&text, 10, &seps());
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 50);
    }

    #[test]
    fn test_adjacent_pieces_remerged() {
        // Six short paragraphs that fit pairwise under the bound should not
        // produce six chunks.
        let text = "aaaa\n\nbbbb\n\ncccc\n\ndddd\n\neeee\n\nffff";
        let pieces = split_text(text, 15, &seps());
        assert!(pieces.len() < 6);
        for p in &pieces {
            assert!(p.len() <= 15);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = "Alpha.\n\nBeta.\n\nGamma, delta.\n\nEpsilon.";
        let a = split_text(text, 12, &seps());
        let b = split_text(text, 12, &seps());
        assert_eq!(a, b);
    }

    #[test]
    fn test_chunk_document_indices_and_hash() {
        let body = (0..20)
            .map(|i| format!("Paragraph {} talks about the market.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        let d = doc(&body);
        let chunks = chunk_document(&d, &ChunkingConfig::default());
        assert!(!chunks.is_empty());
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.chunk_index, i as i64);
            assert_eq!(c.source_url, d.url);
            assert_eq!(c.hash.len(), 64);
        }

        // Re-chunking identical text yields identical chunk texts and hashes.
        let again = chunk_document(&d, &ChunkingConfig::default());
        assert_eq!(chunks.len(), again.len());
        for (a, b) in chunks.iter().zip(again.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.hash, b.hash);
            assert_eq!(a.chunk_index, b.chunk_index);
        }
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        let d = doc("");
        assert!(chunk_document(&d, &ChunkingConfig::default()).is_empty());
    }
}
