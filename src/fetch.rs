//! Article ingestion: fetch URLs and reduce HTML to readable text.
//!
//! Up to three URLs per run; blank entries are skipped. Any fetch failure
//! aborts the whole run — the caller must not persist a partial index.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::config::Config;
use crate::models::Document;

/// Most article hosts reject requests without a user agent.
const USER_AGENT: &str = concat!("newsq/", env!("CARGO_PKG_VERSION"));

pub const MAX_URLS: usize = 3;

/// HTTP client for article fetches, with the configured timeout.
pub fn article_client(config: &Config) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch.timeout_secs))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Fetch one URL and extract its article text.
///
/// Fails on an unreachable URL, a non-2xx status, or a page that yields
/// no extractable text.
pub async fn fetch_article(client: &reqwest::Client, url: &str) -> Result<Document> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?
        .error_for_status()
        .with_context(|| format!("Failed to fetch {}", url))?;

    let html = response
        .text()
        .await
        .with_context(|| format!("Failed to read response body from {}", url))?;

    let (title, body) = html_to_text(&html);
    if body.trim().is_empty() {
        bail!("No article text extracted from {}", url);
    }

    Ok(Document {
        url: url.to_string(),
        title,
        body,
        fetched_at: Utc::now(),
    })
}

/// Drop blank entries and enforce the URL limit.
pub fn usable_urls(urls: &[String]) -> Result<Vec<&str>> {
    let usable: Vec<&str> = urls
        .iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty())
        .collect();

    if usable.is_empty() {
        bail!("No URLs provided");
    }
    if usable.len() > MAX_URLS {
        bail!(
            "At most {} URLs are supported, got {}",
            MAX_URLS,
            usable.len()
        );
    }

    Ok(usable)
}

/// Reduce an HTML page to its title and readable article text.
///
/// Block-level content elements (paragraphs, headings, list items) become
/// paragraphs separated by blank lines; script, style, and navigation
/// chrome are not selected and so drop out.
fn html_to_text(html: &str) -> (Option<String>, String) {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").expect("static selector");
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let block_selector = Selector::parse("p, h1, h2, h3, h4, li").expect("static selector");
    let mut blocks: Vec<String> = Vec::new();
    for element in document.select(&block_selector) {
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    (title, blocks.join("\n\n"))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
