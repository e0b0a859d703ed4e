//! Mock AI adapter for running without API calls.
//!
//! Answers classification prompts with a keyword heuristic, in the same JSON shape the
//! real model is asked for.

use crate::domain::{Category, DomainError};
use crate::ports::AiPort;
use std::time::Duration;
use tracing::info;

/// Keyword lists checked in order; first hit wins, otherwise `Other`.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Bug,
        &["bug", "crash", "glitch", "error", "broken", "freeze", "lag"],
    ),
    (
        Category::FeatureRequest,
        &["please add", "should add", "wish", "would be nice", "feature", "suggest"],
    ),
    (
        Category::Negative,
        &["hate", "worst", "terrible", "awful", "unfair", "boring", "nerf"],
    ),
    (
        Category::Positive,
        &["love", "great", "awesome", "amazing", "best", "fun", "thanks"],
    ),
];

/// Mock AI adapter.
///
/// Returns predetermined responses without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    fn guess(comment: &str) -> Category {
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| comment.contains(w)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AiPort for MockAiAdapter {
    async fn complete(&self, prompt: &str) -> Result<Option<String>, DomainError> {
        // Comments are the "- " lines after the "Comments:" marker.
        let comments: Vec<&str> = prompt
            .split_once("Comments:\n")
            .map(|(_, body)| body.lines().filter_map(|l| l.strip_prefix("- ")).collect())
            .unwrap_or_default();

        info!(
            comments = comments.len(),
            "[MOCK] Simulating AI classification"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let items: Vec<serde_json::Value> = comments
            .iter()
            .map(|c| {
                serde_json::json!({
                    "comment": c,
                    "category": Self::guess(&c.to_lowercase()).as_str(),
                })
            })
            .collect();
        Ok(Some(serde_json::Value::Array(items).to_string()))
    }
}
