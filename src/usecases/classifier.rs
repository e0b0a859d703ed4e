//! Batch classifier. Sends cleaned comments to the AI port in fixed-size batches,
//! validates each structured response against its batch, and retries with a fixed delay.
//!
//! Failures are contained per batch: an exhausted batch is logged and skipped, never
//! raised to the caller. Callers compare `classified.len()` with the input length if
//! exact coverage matters.

use crate::domain::{normalize_text, Category, Classification, CleanedComment, DomainError};
use crate::ports::AiPort;
use crate::shared::config::ClassifierSettings;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A batch that exhausted every attempt.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// 1-based batch number within the call.
    pub batch: usize,
    pub size: usize,
    pub last_error: String,
}

/// Outcome of one `classify` call.
#[derive(Debug, Default)]
pub struct ClassificationReport {
    /// Accepted results, in batch order.
    pub classified: Vec<Classification>,
    pub batches: usize,
    pub failed_batches: Vec<BatchFailure>,
    /// Entries dropped because the model answered with a label outside the vocabulary.
    pub rejected: usize,
}

impl ClassificationReport {
    pub fn skipped_comments(&self) -> usize {
        self.failed_batches.iter().map(|f| f.size).sum()
    }
}

/// One `{comment, category}` pair as the model returns it.
#[derive(Debug, Deserialize)]
struct LlmClassification {
    comment: String,
    category: String,
}

/// Models sometimes wrap the list in an object even when asked for a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LlmPayload {
    List(Vec<LlmClassification>),
    Wrapped {
        #[serde(alias = "comments", alias = "items", alias = "classifications")]
        results: Vec<LlmClassification>,
    },
}

impl LlmPayload {
    fn into_items(self) -> Vec<LlmClassification> {
        match self {
            LlmPayload::List(items) | LlmPayload::Wrapped { results: items } => items,
        }
    }
}

/// Validated batch: accepted entries plus how many were rejected for an unknown label.
#[derive(Debug)]
struct BatchOutcome {
    classified: Vec<Classification>,
    rejected: usize,
}

pub struct BatchClassifier {
    ai: Arc<dyn AiPort>,
    settings: ClassifierSettings,
}

impl BatchClassifier {
    pub fn new(ai: Arc<dyn AiPort>, settings: ClassifierSettings) -> Self {
        Self { ai, settings }
    }

    /// Classify `comments`, batch by batch, in order.
    pub async fn classify(&self, comments: &[CleanedComment]) -> ClassificationReport {
        let mut report = ClassificationReport::default();
        let batch_size = self.settings.batch_size.max(1);

        for (i, batch) in comments.chunks(batch_size).enumerate() {
            let batch_no = i + 1;
            report.batches += 1;

            match self.classify_batch(batch_no, batch).await {
                Ok(outcome) => {
                    debug!(
                        batch = batch_no,
                        accepted = outcome.classified.len(),
                        rejected = outcome.rejected,
                        "batch classified"
                    );
                    report.rejected += outcome.rejected;
                    report.classified.extend(outcome.classified);
                }
                Err(e) => {
                    warn!(
                        batch = batch_no,
                        size = batch.len(),
                        attempts = self.attempts(),
                        error = %e,
                        "failed to process batch, skipping"
                    );
                    report.failed_batches.push(BatchFailure {
                        batch: batch_no,
                        size: batch.len(),
                        last_error: e.to_string(),
                    });
                }
            }
        }

        if !report.failed_batches.is_empty() || report.rejected > 0 {
            info!(
                input = comments.len(),
                classified = report.classified.len(),
                skipped = report.skipped_comments(),
                rejected = report.rejected,
                "classification finished with gaps"
            );
        }

        report
    }

    fn attempts(&self) -> u32 {
        self.settings.max_retries.max(1)
    }

    /// Run one batch through the retry loop. Returns the last error once attempts are exhausted.
    async fn classify_batch(
        &self,
        batch_no: usize,
        batch: &[CleanedComment],
    ) -> Result<BatchOutcome, DomainError> {
        let prompt = build_prompt(batch);
        let attempts = self.attempts();
        let mut last_error = DomainError::EmptyResponse;

        for attempt in 1..=attempts {
            let result = match self.ai.complete(&prompt).await {
                Ok(Some(content)) if !content.trim().is_empty() => {
                    parse_batch_response(&content, batch)
                }
                Ok(_) => Err(DomainError::EmptyResponse),
                Err(e) => Err(e),
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) => {
                    warn!(batch = batch_no, attempt, error = %e, "classification attempt failed");
                    last_error = e;
                }
            }

            if attempt < attempts && !self.settings.retry_delay.is_zero() {
                tokio::time::sleep(self.settings.retry_delay).await;
            }
        }

        Err(last_error)
    }
}

/// Build the single request for a batch.
pub fn build_prompt(batch: &[CleanedComment]) -> String {
    let categories = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let lines = batch
        .iter()
        .map(|c| format!("- {}", c.text))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Categorize each Reddit comment into one of the following categories: {categories}.\n\
         Return a JSON list of objects with 'comment' and 'category', one per comment, \
         in the same order as given. Echo each comment exactly.\n\
         Comments:\n{lines}"
    )
}

/// Strip markdown fences and surrounding prose, leaving the JSON value.
fn sanitize_json(raw_text: &str) -> &str {
    let mut trimmed = raw_text.trim();

    // Handle markdown code blocks: ```json ... ``` or ``` ... ```
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        trimmed = match rest.rfind("```") {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        };
    }

    // Cut to the outermost JSON value, array or object, whichever opens first.
    if let Some(start) = trimmed.find(['[', '{']) {
        let close = if trimmed[start..].starts_with('[') { ']' } else { '}' };
        if let Some(end) = trimmed.rfind(close) {
            if start < end {
                return &trimmed[start..=end];
            }
        }
    }

    trimmed
}

/// Parse and validate a model response for `batch`.
///
/// Length and echoed comments must match the batch, otherwise the whole response is
/// rejected (and retried). Entries with an unknown category are dropped individually.
fn parse_batch_response(
    content: &str,
    batch: &[CleanedComment],
) -> Result<BatchOutcome, DomainError> {
    let json = sanitize_json(content);
    let items = serde_json::from_str::<LlmPayload>(json)
        .map_err(|e| DomainError::InvalidResponse(format!("JSON parse failed: {}", e)))?
        .into_items();

    if items.len() != batch.len() {
        return Err(DomainError::InvalidResponse(format!(
            "expected {} entries, got {}",
            batch.len(),
            items.len()
        )));
    }

    let mut classified = Vec::with_capacity(batch.len());
    let mut rejected = 0;
    for (pos, (item, source)) in items.into_iter().zip(batch).enumerate() {
        if normalize_text(&item.comment) != source.text {
            return Err(DomainError::InvalidResponse(format!(
                "entry {} echoes '{}' instead of '{}'",
                pos + 1,
                item.comment.chars().take(60).collect::<String>(),
                source.text.chars().take(60).collect::<String>()
            )));
        }
        match item.category.parse::<Category>() {
            Ok(category) => classified.push(Classification {
                source_index: source.source_index,
                comment: source.text.clone(),
                category,
            }),
            Err(e) => {
                warn!(comment = %source.text, error = %e, "dropping entry with unknown category");
                rejected += 1;
            }
        }
    }

    Ok(BatchOutcome {
        classified,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Parse the `- comment` lines out of a prompt.
    fn prompt_comments(prompt: &str) -> Vec<String> {
        prompt
            .split_once("Comments:\n")
            .map(|(_, body)| {
                body.lines()
                    .filter_map(|l| l.strip_prefix("- "))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn echo_json(comments: &[String], category: &str) -> String {
        let items: Vec<_> = comments
            .iter()
            .map(|c| serde_json::json!({ "comment": c, "category": category }))
            .collect();
        serde_json::Value::Array(items).to_string()
    }

    enum Reply {
        Echo(&'static str),
        Raw(Option<&'static str>),
        Fail,
    }

    /// Replays scripted replies in order, then echoes as "Other". Records every prompt.
    struct ScriptedAi {
        replies: Mutex<VecDeque<Reply>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedAi {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AiPort for ScriptedAi {
        async fn complete(&self, prompt: &str) -> Result<Option<String>, DomainError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let comments = prompt_comments(prompt);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Echo(category)) => Ok(Some(echo_json(&comments, category))),
                Some(Reply::Raw(body)) => Ok(body.map(String::from)),
                Some(Reply::Fail) => Err(DomainError::Ai("timeout".into())),
                None => Ok(Some(echo_json(&comments, "Other"))),
            }
        }
    }

    fn cleaned(n: usize) -> Vec<CleanedComment> {
        (0..n)
            .map(|i| CleanedComment {
                source_index: i * 2,
                text: format!("comment number {i}"),
            })
            .collect()
    }

    fn classifier(ai: Arc<ScriptedAi>, batch_size: usize, max_retries: u32) -> BatchClassifier {
        BatchClassifier::new(
            ai,
            ClassifierSettings {
                batch_size,
                max_retries,
                retry_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_batches_are_contiguous() {
        let ai = ScriptedAi::new(vec![]);
        let report = classifier(ai.clone(), 10, 3).classify(&cleaned(25)).await;

        let sizes: Vec<usize> = ai
            .prompts()
            .iter()
            .map(|p| prompt_comments(p).len())
            .collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(report.batches, 3);
        assert_eq!(report.classified.len(), 25);
        assert!(report.failed_batches.is_empty());

        // Results keep batch order and carry the source index through.
        let indices: Vec<usize> = report.classified.iter().map(|c| c.source_index).collect();
        let expected: Vec<usize> = (0..25).map(|i| i * 2).collect();
        assert_eq!(indices, expected);
    }

    #[tokio::test]
    async fn test_retry_then_success() {
        let ai = ScriptedAi::new(vec![Reply::Fail, Reply::Raw(Some("not json")), Reply::Echo("Bug")]);
        let report = classifier(ai.clone(), 10, 3).classify(&cleaned(4)).await;

        assert_eq!(ai.prompts().len(), 3);
        assert_eq!(report.classified.len(), 4);
        assert!(report.failed_batches.is_empty());
        assert!(report.classified.iter().all(|c| c.category == Category::Bug));
    }

    #[tokio::test]
    async fn test_exhausted_batch_is_skipped() {
        let ai = ScriptedAi::new(vec![Reply::Fail, Reply::Raw(None), Reply::Fail]);
        let report = classifier(ai.clone(), 2, 3).classify(&cleaned(5)).await;

        // 3 failed attempts for batch 1, then one each for batches 2 and 3.
        assert_eq!(ai.prompts().len(), 5);
        assert_eq!(report.batches, 3);
        assert_eq!(report.failed_batches.len(), 1);
        assert_eq!(report.failed_batches[0].batch, 1);
        assert_eq!(report.failed_batches[0].size, 2);
        assert!(report.failed_batches[0].last_error.contains("timeout"));
        assert_eq!(report.skipped_comments(), 2);

        let indices: Vec<usize> = report.classified.iter().map(|c| c.source_index).collect();
        assert_eq!(indices, vec![4, 6, 8]);
    }

    #[tokio::test]
    async fn test_length_mismatch_is_retried() {
        let short = r#"[{"comment": "comment number 0", "category": "Bug"}]"#;
        let ai = ScriptedAi::new(vec![Reply::Raw(Some(short))]);
        let report = classifier(ai.clone(), 10, 3).classify(&cleaned(2)).await;

        assert_eq!(ai.prompts().len(), 2);
        assert_eq!(report.classified.len(), 2);
    }

    #[tokio::test]
    async fn test_echo_mismatch_is_retried() {
        let swapped = r#"[
            {"comment": "comment number 1", "category": "Bug"},
            {"comment": "comment number 0", "category": "Bug"}
        ]"#;
        let ai = ScriptedAi::new(vec![Reply::Raw(Some(swapped)), Reply::Raw(Some(swapped))]);
        let report = classifier(ai.clone(), 10, 2).classify(&cleaned(2)).await;

        assert_eq!(ai.prompts().len(), 2);
        assert!(report.classified.is_empty());
        assert_eq!(report.failed_batches.len(), 1);
        assert!(report.failed_batches[0].last_error.contains("echoes"));
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected_not_coerced() {
        let body = r#"```json
{"results": [
    {"comment": "Comment number 0!", "category": "feature request"},
    {"comment": "comment number 1", "category": "Praise"}
]}
```"#;
        let ai = ScriptedAi::new(vec![Reply::Raw(Some(body))]);
        let report = classifier(ai.clone(), 10, 3).classify(&cleaned(2)).await;

        assert_eq!(ai.prompts().len(), 1);
        assert_eq!(report.rejected, 1);
        assert_eq!(
            report.classified,
            vec![Classification {
                source_index: 0,
                comment: "comment number 0".into(),
                category: Category::FeatureRequest,
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_requests() {
        let ai = ScriptedAi::new(vec![]);
        let report = classifier(ai.clone(), 10, 3).classify(&[]).await;
        assert!(ai.prompts().is_empty());
        assert_eq!(report.batches, 0);
        assert!(report.classified.is_empty());
    }

    #[test]
    fn test_prompt_lists_vocabulary_and_comments() {
        let prompt = build_prompt(&cleaned(2));
        assert!(prompt.contains("Bug, Feature Request, Positive, Negative, Other"));
        assert!(prompt.ends_with("Comments:\n- comment number 0\n- comment number 1"));
    }

    #[test]
    fn test_sanitize_json_variants() {
        assert_eq!(sanitize_json(r#"[{"a":1}]"#), r#"[{"a":1}]"#);
        assert_eq!(sanitize_json("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(sanitize_json("```\n[1]\n```"), "[1]");
        assert_eq!(
            sanitize_json("Here you go:\n[{\"x\": 1}]\nThanks"),
            "[{\"x\": 1}]"
        );
        assert_eq!(sanitize_json(r#"{"results": []}"#), r#"{"results": []}"#);
    }
}
