use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub secrets: SecretsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("news_store.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            separators: default_separators(),
        }
    }
}

fn default_max_chars() -> usize {
    1000
}

/// Coarsest-first separator preference: paragraph, line, sentence, clause.
fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        ".".to_string(),
        ",".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    4
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dims: default_dims(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
fn default_dims() -> usize {
    1536
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f64 {
    0.9
}
fn default_max_tokens() -> u32 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SecretsConfig {
    pub path: Option<PathBuf>,
}

/// Load configuration from a TOML file.
///
/// A missing file is not an error — defaults cover every setting. A file
/// that exists but fails to parse or validate is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    if config.chunking.max_chars == 0 {
        anyhow::bail!("chunking.max_chars must be > 0");
    }
    if config.chunking.separators.is_empty() {
        anyhow::bail!("chunking.separators must not be empty");
    }
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }
    if config.embedding.dims == 0 {
        anyhow::bail!("embedding.dims must be > 0");
    }
    if config.embedding.batch_size == 0 {
        anyhow::bail!("embedding.batch_size must be > 0");
    }
    if !(0.0..=2.0).contains(&config.llm.temperature) {
        anyhow::bail!("llm.temperature must be in [0.0, 2.0]");
    }

    Ok(config)
}

/// Resolve the OpenAI API credential.
///
/// Resolution order: the `OPENAI_API_KEY` environment variable, then the
/// `[my_secrets] OPENAI_API_KEY` entry of the configured secrets file.
/// Both absent is fatal — every network-using command calls this before
/// touching the network.
pub fn resolve_api_key(config: &Config) -> Result<String> {
    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    if let Some(ref secrets_path) = config.secrets.path {
        if secrets_path.exists() {
            let content = std::fs::read_to_string(secrets_path).with_context(|| {
                format!("Failed to read secrets file: {}", secrets_path.display())
            })?;
            let secrets: toml::Value = toml::from_str(&content).with_context(|| {
                format!("Failed to parse secrets file: {}", secrets_path.display())
            })?;
            if let Some(key) = secrets
                .get("my_secrets")
                .and_then(|s| s.get("OPENAI_API_KEY"))
                .and_then(|k| k.as_str())
            {
                if !key.trim().is_empty() {
                    return Ok(key.to_string());
                }
            }
        }
    }

    anyhow::bail!(
        "API key not found. Set the OPENAI_API_KEY environment variable, or add \
         [my_secrets] OPENAI_API_KEY to the secrets file configured in [secrets] path."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config(Path::new("/nonexistent/newsq.toml")).unwrap();
        assert_eq!(config.chunking.max_chars, 1000);
        assert_eq!(config.chunking.separators, vec!["\n\n", "\n", ".", ","]);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.api.base_url, "https://api.openai.com");
        assert!((config.llm.temperature - 0.9).abs() < 1e-9);
        assert_eq!(config.llm.max_tokens, 500);
    }

    #[test]
    fn partial_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nmax_chars = 256\n\n[retrieval]\ntop_k = 2").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.chunking.max_chars, 256);
        assert_eq!(config.retrieval.top_k, 2);
        // Untouched sections keep defaults
        assert_eq!(config.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn zero_max_chars_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nmax_chars = 0").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_chars"));
    }

    #[test]
    fn empty_separators_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chunking]\nseparators = []").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("separators"));
    }

    #[test]
    fn secrets_file_fallback() {
        let mut secrets = tempfile::NamedTempFile::new().unwrap();
        writeln!(secrets, "[my_secrets]\nOPENAI_API_KEY = \"sk-from-secrets\"").unwrap();

        let config = Config {
            secrets: SecretsConfig {
                path: Some(secrets.path().to_path_buf()),
            },
            ..Config::default()
        };

        // Only meaningful when the env var is not set in the test environment.
        if std::env::var("OPENAI_API_KEY").is_err() {
            let key = resolve_api_key(&config).unwrap();
            assert_eq!(key, "sk-from-secrets");
        }
    }

    #[test]
    fn no_credential_anywhere_fails() {
        if std::env::var("OPENAI_API_KEY").is_ok() {
            return;
        }
        let config = Config::default();
        let err = resolve_api_key(&config).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
