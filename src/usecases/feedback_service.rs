//! Feedback run: fetch -> clean -> classify -> join -> aggregate -> write.
//!
//! - Forum and export failures are fatal and propagate
//! - Classification failures stay inside the classifier (batch skip)
//! - Joins use the source index carried through normalization and classification

use crate::domain::{normalize_comments, ClassifiedRecord, DomainError, Post};
use crate::ports::{AiPort, ExportPort, ForumGateway};
use crate::shared::config::PipelineSettings;
use crate::usecases::aggregator::FeedbackAggregator;
use crate::usecases::classifier::BatchClassifier;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Feedback service. Runs every configured source sequentially.
pub struct FeedbackService {
    forum: Arc<dyn ForumGateway>,
    exporter: Arc<dyn ExportPort>,
    classifier: BatchClassifier,
    aggregator: FeedbackAggregator,
    sources: Vec<String>,
    posts_per_source: u32,
}

impl FeedbackService {
    pub fn new(
        forum: Arc<dyn ForumGateway>,
        ai: Arc<dyn AiPort>,
        exporter: Arc<dyn ExportPort>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            forum,
            exporter,
            classifier: BatchClassifier::new(ai, settings.classifier),
            aggregator: FeedbackAggregator::new(settings.summary),
            sources: settings.sources,
            posts_per_source: settings.posts_per_source,
        }
    }

    /// Run the whole pipeline. Writes the export and summary even when some batches failed.
    pub async fn run(&self) -> Result<RunStats, DomainError> {
        let mut stats = RunStats::default();
        let mut records = Vec::new();

        for source in &self.sources {
            info!(source = %source, "fetching comments from r/{}", source);
            let posts = self.forum.hot_posts(source, self.posts_per_source).await?;
            if posts.is_empty() {
                warn!(source = %source, "no posts returned");
            }

            for post in &posts {
                stats.posts += 1;
                let post_records = self.process_post(post, &mut stats).await;
                records.extend(post_records);
            }
        }

        stats.records = records.len();
        if records.is_empty() {
            warn!("no comments were classified; writing empty export and summary");
        }

        stats.export_path = Some(self.exporter.write_records(&records).await?);
        let summary = self.aggregator.report(&records);
        stats.summary_path = Some(self.exporter.write_summary(&summary).await?);

        info!(
            posts = stats.posts,
            comments = stats.comments,
            records = stats.records,
            failed_batches = stats.failed_batches,
            rejected = stats.rejected,
            "feedback run complete"
        );
        Ok(stats)
    }

    /// Clean, classify and join one post's comments. Never fails; gaps are logged and counted.
    pub async fn process_post(&self, post: &Post, stats: &mut RunStats) -> Vec<ClassifiedRecord> {
        info!(post = %post.id, comments = post.comments.len(), "Post: {}", post.title);
        stats.comments += post.comments.len();

        let cleaned = normalize_comments(post.comments.iter().map(|c| c.body.as_str()));
        stats.dropped_empty += post.comments.len() - cleaned.len();
        if cleaned.is_empty() {
            return Vec::new();
        }

        let report = self.classifier.classify(&cleaned).await;
        stats.failed_batches += report.failed_batches.len();
        stats.rejected += report.rejected;

        if report.classified.len() < cleaned.len() {
            warn!(
                post = %post.id,
                expected = cleaned.len(),
                classified = report.classified.len(),
                "some comments were not classified"
            );
        }

        let mut out = Vec::with_capacity(report.classified.len());
        for c in report.classified {
            let Some(raw) = post.comments.get(c.source_index) else {
                continue;
            };
            let record = ClassifiedRecord::new(raw, c.category);
            info!(
                "- [{}] {}",
                record.category,
                record.original_comment.chars().take(100).collect::<String>()
            );
            out.push(record);
        }
        out
    }
}

/// Counters for one run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub posts: usize,
    pub comments: usize,
    /// Comments that were empty after cleaning.
    pub dropped_empty: usize,
    pub failed_batches: usize,
    pub rejected: usize,
    pub records: usize,
    pub export_path: Option<PathBuf>,
    pub summary_path: Option<PathBuf>,
}
