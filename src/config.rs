use anyhow::{Context, Result};
use sdgp_context_core::memory::{DEFAULT_CAPACITY, DEFAULT_RECENT_TURNS, DEFAULT_RESPONSE_CHARS};
use sdgp_context_core::rank::{default_topics, FieldWeights, RankParams, TopicBoost, DEFAULT_TOP_K};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// A dataset file, or a directory holding `*sdgp_projects*.json` exports.
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./output")
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./ai_cache")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
    #[serde(default = "default_project_url_base")]
    pub project_url_base: String,
    #[serde(default = "default_domain_boost")]
    pub domain_boost: u32,
    #[serde(default = "default_problem_boost")]
    pub problem_boost: u32,
    #[serde(default = "default_overview_domains")]
    pub overview_domains: usize,
    #[serde(default = "default_overview_projects")]
    pub overview_projects: usize,
    #[serde(default)]
    pub weights: FieldWeights,
    #[serde(default = "default_topics")]
    pub topics: Vec<TopicBoost>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            excerpt_chars: default_excerpt_chars(),
            project_url_base: default_project_url_base(),
            domain_boost: default_domain_boost(),
            problem_boost: default_problem_boost(),
            overview_domains: default_overview_domains(),
            overview_projects: default_overview_projects(),
            weights: FieldWeights::default(),
            topics: default_topics(),
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_excerpt_chars() -> usize {
    150
}
fn default_project_url_base() -> String {
    "https://www.sdgp.lk/project".to_string()
}
fn default_domain_boost() -> u32 {
    15
}
fn default_problem_boost() -> u32 {
    10
}
fn default_overview_domains() -> usize {
    8
}
fn default_overview_projects() -> usize {
    5
}

impl RetrievalConfig {
    pub fn rank_params(&self) -> RankParams {
        RankParams {
            weights: self.weights.clone(),
            topics: self.topics.clone(),
            domain_boost: self.domain_boost,
            problem_boost: self.problem_boost,
            top_k: self.top_k,
        }
    }

    /// Canonical detail-page URL for a project id.
    pub fn project_url(&self, id: &str) -> String {
        format!("{}/{}", self.project_url_base.trim_end_matches('/'), id)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversationConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_recent_turns")]
    pub recent_turns: usize,
    #[serde(default = "default_response_chars")]
    pub response_chars: usize,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            recent_turns: default_recent_turns(),
            response_chars: default_response_chars(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_recent_turns() -> usize {
    DEFAULT_RECENT_TURNS
}
fn default_response_chars() -> usize {
    DEFAULT_RESPONSE_CHARS
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_max_retries() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    60
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Config {
    /// All defaults; used when no config file exists.
    pub fn minimal() -> Self {
        Self {
            data: DataConfig::default(),
            cache: CacheConfig::default(),
            retrieval: RetrievalConfig::default(),
            conversation: ConversationConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.conversation.capacity == 0 {
        anyhow::bail!("conversation.capacity must be >= 1");
    }

    for topic in &config.retrieval.topics {
        if topic.query_terms.iter().all(|t| t.trim().is_empty()) {
            anyhow::bail!(
                "retrieval.topics '{}' must have at least one query term",
                topic.name
            );
        }
    }

    match config.generation.provider.as_str() {
        "disabled" | "openai" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled, openai, or ollama.",
            other
        ),
    }

    if config.generation.is_enabled() && config.generation.model.is_none() {
        anyhow::bail!(
            "generation.model must be specified when provider is '{}'",
            config.generation.provider
        );
    }

    Ok(())
}
