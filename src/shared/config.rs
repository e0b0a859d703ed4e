//! Application configuration. Credentials, pipeline tuning, output paths.
//!
//! `AppConfig` is the raw, all-optional view loaded from env / file. `PipelineSettings`
//! is the validated value handed to each component at construction time.

use crate::domain::DomainError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SOURCES: &[&str] = &["BrawlStars", "ClashOfClans", "ClashRoyale"];
pub const DEFAULT_POSTS_PER_SOURCE: u32 = 5;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;
pub const DEFAULT_TOP_N_WORDS: usize = 5;
pub const DEFAULT_EXAMPLE_COUNT: usize = 2;
pub const DEFAULT_EXAMPLE_MAX_CHARS: usize = 200;
pub const DEFAULT_EXPORT_PATH: &str = "reddit_comments_categorized.csv";
pub const DEFAULT_SUMMARY_PATH: &str = "reddit_feedback_summary.txt";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Subreddits to process. Read from FEEDBACK_SUBREDDITS (comma-separated).
    #[serde(default)]
    pub subreddits: Option<Vec<String>>,

    /// Hot posts fetched per subreddit (default 5).
    #[serde(default)]
    pub posts_per_source: Option<u32>,

    // ─────────────────────────────────────────────────────────────────────────
    // Classification
    // ─────────────────────────────────────────────────────────────────────────
    /// Comments per classification request (default 10).
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Attempts per batch before it is skipped (default 3).
    #[serde(default)]
    pub max_retries: Option<u32>,

    /// Fixed delay between attempts, seconds (default 2).
    #[serde(default)]
    pub retry_delay_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Summary
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub top_n_words: Option<usize>,

    #[serde(default)]
    pub example_count: Option<usize>,

    #[serde(default)]
    pub example_max_chars: Option<usize>,

    // ─────────────────────────────────────────────────────────────────────────
    // Outputs
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub export_path: Option<String>,

    #[serde(default)]
    pub summary_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Reddit credentials (script app)
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub reddit_client_id: Option<String>,

    #[serde(default)]
    pub reddit_client_secret: Option<String>,

    #[serde(default)]
    pub reddit_user_agent: Option<String>,

    #[serde(default)]
    pub reddit_username: Option<String>,

    #[serde(default)]
    pub reddit_password: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // AI
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key. Read from FEEDBACK_AI_API_KEY or OPENAI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI chat completions.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-3.5-turbo".
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Per-request HTTP timeout in seconds, for both Reddit and AI calls (default 30).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(
            config::Environment::with_prefix("FEEDBACK")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("subreddits"),
        );
        if let Ok(path) = std::env::var("FEEDBACK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Validate and resolve every tuning knob into the settings the pipeline runs with.
    pub fn pipeline_settings(&self) -> Result<PipelineSettings, DomainError> {
        let sources: Vec<String> = match &self.subreddits {
            Some(list) => list
                .iter()
                .map(|s| s.trim().trim_start_matches("r/").to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
        };
        if sources.is_empty() {
            return Err(DomainError::Config("no subreddits configured".into()));
        }

        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(DomainError::Config("batch_size must be at least 1".into()));
        }
        let max_retries = self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES);
        if max_retries == 0 {
            return Err(DomainError::Config("max_retries must be at least 1".into()));
        }

        Ok(PipelineSettings {
            sources,
            posts_per_source: self.posts_per_source.unwrap_or(DEFAULT_POSTS_PER_SOURCE),
            classifier: ClassifierSettings {
                batch_size,
                max_retries,
                retry_delay: Duration::from_secs(
                    self.retry_delay_secs.unwrap_or(DEFAULT_RETRY_DELAY_SECS),
                ),
            },
            summary: SummarySettings {
                top_n_words: self.top_n_words.unwrap_or(DEFAULT_TOP_N_WORDS),
                example_count: self.example_count.unwrap_or(DEFAULT_EXAMPLE_COUNT),
                example_max_chars: self.example_max_chars.unwrap_or(DEFAULT_EXAMPLE_MAX_CHARS),
            },
        })
    }

    /// Where the CSV export and the text summary are written.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths {
            export_path: PathBuf::from(
                self.export_path.as_deref().unwrap_or(DEFAULT_EXPORT_PATH),
            ),
            summary_path: PathBuf::from(
                self.summary_path.as_deref().unwrap_or(DEFAULT_SUMMARY_PATH),
            ),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reddit Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the Reddit credentials when client id, secret, username and password are all set.
    /// Each field falls back to its unprefixed env var (REDDIT_CLIENT_ID, ...).
    pub fn reddit_credentials(&self) -> Option<RedditCredentials> {
        let client_id = or_env(&self.reddit_client_id, "REDDIT_CLIENT_ID")?;
        let client_secret = or_env(&self.reddit_client_secret, "REDDIT_CLIENT_SECRET")?;
        let username = or_env(&self.reddit_username, "REDDIT_USERNAME")?;
        let password = or_env(&self.reddit_password, "REDDIT_PASSWORD")?;
        let user_agent = or_env(&self.reddit_user_agent, "REDDIT_USER_AGENT").unwrap_or_else(
            || format!("reddit-feedback/{} by {}", env!("CARGO_PKG_VERSION"), username),
        );
        Some(RedditCredentials {
            client_id,
            client_secret,
            user_agent,
            username,
            password,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the AI API key if configured. Reads from config or OPENAI_API_KEY env.
    pub fn ai_api_key(&self) -> Option<String> {
        or_env(&self.ai_api_key, "OPENAI_API_KEY")
    }

    /// Returns the AI API URL. Defaults to OpenAI chat completions endpoint.
    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string())
    }

    /// Returns the AI model name. Defaults to "gpt-3.5-turbo".
    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| "gpt-3.5-turbo".to_string())
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}

/// Configured value, else the named env var; blank strings count as unset.
fn or_env(value: &Option<String>, var: &str) -> Option<String> {
    value
        .clone()
        .or_else(|| std::env::var(var).ok())
        .filter(|s| !s.trim().is_empty())
}

/// Reddit "script" app credentials (password grant).
#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub username: String,
    pub password: String,
}

/// Validated run settings, passed explicitly into every component.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub sources: Vec<String>,
    pub posts_per_source: u32,
    pub classifier: ClassifierSettings,
    pub summary: SummarySettings,
}

/// Output files, handed to the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub export_path: PathBuf,
    pub summary_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub batch_size: usize,
    /// Total attempts per batch (not counting the first as a "retry").
    pub max_retries: u32,
    pub retry_delay: Duration,
}

#[derive(Debug, Clone)]
pub struct SummarySettings {
    pub top_n_words: usize,
    pub example_count: usize,
    /// Rendered example lines are cut to this many characters.
    pub example_max_chars: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            top_n_words: DEFAULT_TOP_N_WORDS,
            example_count: DEFAULT_EXAMPLE_COUNT,
            example_max_chars: DEFAULT_EXAMPLE_MAX_CHARS,
        }
    }
}
