//! Application use cases. Orchestrate domain logic via ports.

pub mod aggregator;
pub mod classifier;
pub mod feedback_service;

pub use aggregator::FeedbackAggregator;
pub use classifier::{BatchClassifier, BatchFailure, ClassificationReport};
pub use feedback_service::{FeedbackService, RunStats};
