//! Domain entities. Pure data structures for the core business.
//!
//! No Reddit/HTTP types here — these are mapped from adapters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single comment as fetched from a forum. Never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComment {
    pub body: String,
    /// Creation time, seconds since the Unix epoch (UTC).
    pub created_utc: i64,
    /// Subreddit (or other community) the comment was fetched from.
    pub source_group: String,
}

/// A post with its comment tree already flattened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub comments: Vec<RawComment>,
}

/// Cleaned comment text. `source_index` points back at the RawComment it was derived from,
/// so joins stay correct when the normalizer drops empty entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedComment {
    pub source_index: usize,
    pub text: String,
}

/// Closed feedback vocabulary. Anything else returned by the model is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Bug,
    FeatureRequest,
    Positive,
    Negative,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Bug,
        Category::FeatureRequest,
        Category::Positive,
        Category::Negative,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "Bug",
            Category::FeatureRequest => "Feature Request",
            Category::Positive => "Positive",
            Category::Negative => "Negative",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label outside the closed vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Case-insensitive match on the display name; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// One validated classifier result, tied to its source comment by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub source_index: usize,
    /// Cleaned text the model echoed back (after validation, equal to the batch entry).
    pub comment: String,
    pub category: Category,
}

/// A raw comment joined with its category. Unit of export and aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRecord {
    pub original_comment: String,
    pub created_utc: i64,
    pub source_group: String,
    pub category: Category,
}

impl ClassifiedRecord {
    pub fn new(raw: &RawComment, category: Category) -> Self {
        Self {
            original_comment: raw.body.clone(),
            created_utc: raw.created_utc,
            source_group: raw.source_group.clone(),
            category,
        }
    }
}

/// Per-category roll-up. Recomputed on every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub category: Category,
    pub count: usize,
    /// Most frequent words, descending by count; ties keep first-occurrence order.
    pub top_words: Vec<(String, usize)>,
    /// First few original comments, untruncated.
    pub examples: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!("bug".parse::<Category>(), Ok(Category::Bug));
        assert_eq!(
            " feature request ".parse::<Category>(),
            Ok(Category::FeatureRequest)
        );
        assert_eq!("NEGATIVE".parse::<Category>(), Ok(Category::Negative));
    }

    #[test]
    fn test_category_parse_rejects_unknown() {
        let err = "Praise".parse::<Category>().unwrap_err();
        assert_eq!(err, UnknownCategory("Praise".to_string()));
        assert_eq!(err.to_string(), "unknown category 'Praise'");
        assert!("FeatureRequest".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_round_trips() {
        for c in Category::ALL {
            assert_eq!(c.to_string().parse::<Category>(), Ok(c));
        }
    }
}
