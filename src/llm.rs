//! Chat-completions client and answer parsing.
//!
//! Builds the retrieval-augmented prompt, calls the hosted completion
//! model, and parses the response into answer text plus a cited-source
//! list. The prompt instructs the model to answer only from the provided
//! context and to end with a `SOURCES:` block listing one URL per line.
//!
//! Retry strategy matches the embeddings client: 429/5xx/network errors
//! retry with exponential backoff, other 4xx fail immediately.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::LlmConfig;
use crate::models::Answer;
use crate::store::Retrieved;

const SOURCES_MARKER: &str = "SOURCES:";

/// Build the prompt from the question and the retrieved chunks.
pub fn build_prompt(question: &str, context: &[Retrieved]) -> String {
    let mut prompt = String::from(
        "You are a news research assistant. Answer the question using ONLY the \
         context below. If the context does not contain the answer, say you \
         don't know. After the answer, write a line containing exactly \
         \"SOURCES:\" followed by the URLs of the context passages you used, \
         one URL per line.\n\n",
    );

    for (i, retrieved) in context.iter().enumerate() {
        prompt.push_str(&format!(
            "Context {} (source: {}):\n{}\n\n",
            i + 1,
            retrieved.source_url,
            retrieved.text
        ));
    }

    prompt.push_str(&format!("Question: {}\n", question));
    prompt
}

/// Call the chat-completions endpoint and return the raw model output.
pub async fn complete(
    config: &LlmConfig,
    base_url: &str,
    api_key: &str,
    prompt: &str,
) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;

    let body = serde_json::json!({
        "model": config.model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "temperature": config.temperature,
        "max_tokens": config.max_tokens,
    });

    let url = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));
    let mut last_err = None;

    for attempt in 0..=2u32 {
        if attempt > 0 {
            tokio::time::sleep(Duration::from_secs(1 << (attempt - 1))).await;
        }

        let resp = client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response.json().await?;
                    return extract_content(&json);
                }

                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(anyhow::anyhow!(
                        "Completions API error {}: {}",
                        status,
                        body_text
                    ));
                    continue;
                }

                let body_text = response.text().await.unwrap_or_default();
                bail!("Completions API error {}: {}", status, body_text);
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Completion failed after retries")))
}

/// Pull `choices[0].message.content` out of the response.
fn extract_content(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Invalid completions response: missing message content"))
}

/// Split raw model output into answer text and cited source URLs.
///
/// The sources block starts at the last line beginning with `SOURCES:`
/// (case-insensitive). Source lines are split on newlines and commas,
/// trimmed, and stripped of leading list markers; blanks are dropped.
/// No marker means the whole output is the answer, with no sources.
pub fn parse_answer(raw: &str) -> Answer {
    let lines: Vec<&str> = raw.lines().collect();
    let marker_idx = lines.iter().rposition(|line| {
        line.trim_start()
            .to_ascii_uppercase()
            .starts_with(SOURCES_MARKER)
    });

    let Some(idx) = marker_idx else {
        return Answer {
            text: raw.trim().to_string(),
            sources: Vec::new(),
        };
    };

    let text = lines[..idx].join("\n").trim().to_string();

    // Sources: the rest of the marker line, plus every line after it.
    let marker_line = lines[idx].trim_start();
    let mut source_text = marker_line[SOURCES_MARKER.len()..].to_string();
    for line in &lines[idx + 1..] {
        source_text.push('\n');
        source_text.push_str(line);
    }

    let sources = source_text
        .split(['\n', ','])
        .map(|line| {
            line.trim()
                .trim_start_matches(['-', '*', '•'])
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect();

    Answer { text, sources }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_includes_context_and_question() {
        let context = vec![Retrieved {
            score: 0.9,
            text: "Rates were held steady.".to_string(),
            source_url: "https://news.example/rates".to_string(),
        }];
        let prompt = build_prompt("What happened to rates?", &context);
        assert!(prompt.contains("Rates were held steady."));
        assert!(prompt.contains("https://news.example/rates"));
        assert!(prompt.contains("Question: What happened to rates?"));
        assert!(prompt.contains("SOURCES:"));
    }

    #[test]
    fn test_extract_content() {
        let json = serde_json::json!({
            "choices": [ { "message": { "role": "assistant", "content": "hi" } } ]
        });
        assert_eq!(extract_content(&json).unwrap(), "hi");
    }

    #[test]
    fn test_extract_content_missing() {
        let json = serde_json::json!({ "choices": [] });
        assert!(extract_content(&json).is_err());
    }

    #[test]
    fn test_parse_answer_with_sources() {
        let raw = "Rates were held steady.\n\nSOURCES:\nhttps://a.example\nhttps://b.example\n";
        let answer = parse_answer(raw);
        assert_eq!(answer.text, "Rates were held steady.");
        assert_eq!(answer.sources, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_answer_without_marker() {
        let answer = parse_answer("Just an answer with no citations.");
        assert_eq!(answer.text, "Just an answer with no citations.");
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn test_parse_answer_bulleted_sources() {
        let raw = "Answer.\nSOURCES:\n- https://a.example\n* https://b.example";
        let answer = parse_answer(raw);
        assert_eq!(answer.sources, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_answer_inline_comma_sources() {
        let raw = "Answer.\nSources: https://a.example, https://b.example";
        let answer = parse_answer(raw);
        assert_eq!(answer.text, "Answer.");
        assert_eq!(answer.sources, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_answer_blank_source_lines_dropped() {
        let raw = "Answer.\nSOURCES:\n\nhttps://a.example\n\n";
        let answer = parse_answer(raw);
        assert_eq!(answer.sources, vec!["https://a.example"]);
    }
}
