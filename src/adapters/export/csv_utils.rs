//! CSV utilities for the categorized export. Uses the `csv` crate for safe serialization.

use crate::domain::ClassifiedRecord;
use chrono::{DateTime, Utc};

pub const EXPORT_HEADER: [&str; 4] = ["original_comment", "timestamp", "source_group", "category"];

/// Human-readable UTC timestamp, e.g. `2024-01-01 00:00:00`.
/// Out-of-range values fall back to the raw seconds.
pub fn format_timestamp(created_utc: i64) -> String {
    DateTime::<Utc>::from_timestamp(created_utc, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| created_utc.to_string())
}

/// Convert records to a CSV string with header row.
///
/// Comment bodies are written verbatim; the csv crate quotes commas, quotes and newlines.
pub fn records_to_csv(records: &[ClassifiedRecord]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(EXPORT_HEADER)?;

    for record in records {
        let timestamp = format_timestamp(record.created_utc);
        wtr.write_record([
            record.original_comment.as_str(),
            timestamp.as_str(),
            record.source_group.as_str(),
            record.category.as_str(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}
