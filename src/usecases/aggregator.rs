//! Feedback aggregator. Rolls classified records up per category and renders the text report.

use crate::domain::{Category, CategorySummary, ClassifiedRecord};
use crate::shared::config::SummarySettings;
use std::collections::HashMap;

pub struct FeedbackAggregator {
    settings: SummarySettings,
}

impl FeedbackAggregator {
    pub fn new(settings: SummarySettings) -> Self {
        Self { settings }
    }

    /// One summary per category present, in first-seen order. Absent categories are omitted.
    pub fn summarize(&self, records: &[ClassifiedRecord]) -> Vec<CategorySummary> {
        let mut order: Vec<Category> = Vec::new();
        for record in records {
            if !order.contains(&record.category) {
                order.push(record.category);
            }
        }

        order
            .into_iter()
            .map(|category| {
                let in_category: Vec<&ClassifiedRecord> =
                    records.iter().filter(|r| r.category == category).collect();
                let text = in_category
                    .iter()
                    .map(|r| r.original_comment.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                CategorySummary {
                    category,
                    count: in_category.len(),
                    top_words: top_words(&text, self.settings.top_n_words),
                    examples: in_category
                        .iter()
                        .take(self.settings.example_count)
                        .map(|r| r.original_comment.clone())
                        .collect(),
                }
            })
            .collect()
    }

    /// Render summaries as the plain-text report.
    pub fn render(&self, summaries: &[CategorySummary]) -> String {
        let mut lines: Vec<String> = Vec::new();
        for summary in summaries {
            let words = if summary.top_words.is_empty() {
                "N/A".to_string()
            } else {
                summary
                    .top_words
                    .iter()
                    .map(|(w, c)| format!("{} ({})", w, c))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            lines.push(format!("Category: {}", summary.category));
            lines.push(format!("Count: {}", summary.count));
            lines.push(format!("Most common words: {}", words));
            lines.push("Example comments:".to_string());
            for example in &summary.examples {
                lines.push(format!(
                    "- {}",
                    display_example(example, self.settings.example_max_chars)
                ));
            }
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// `summarize` then `render`. Deterministic for a given input.
    pub fn report(&self, records: &[ClassifiedRecord]) -> String {
        self.render(&self.summarize(records))
    }
}

/// Most frequent tokens. Lowercased, ASCII punctuation removed, split on whitespace.
/// Descending by count; equal counts keep first-occurrence order.
fn top_words(text: &str, n: usize) -> Vec<(String, usize)> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for token in cleaned.split_whitespace() {
        match index.get(token) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(token.to_string(), counts.len());
                counts.push((token.to_string(), 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order among ties.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// One-line, length-capped rendering of an example comment.
fn display_example(text: &str, max_chars: usize) -> String {
    text.chars()
        .take(max_chars)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
