//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod normalize;

pub use entities::{
    Category, CategorySummary, Classification, ClassifiedRecord, CleanedComment, Post,
    RawComment, UnknownCategory,
};
pub use errors::DomainError;
pub use normalize::{normalize_comments, normalize_text};
