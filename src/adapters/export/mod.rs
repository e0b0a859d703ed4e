//! Export adapter. CSV + plain-text report on the local filesystem.

pub mod csv_utils;
pub mod fs_exporter;

pub use csv_utils::{format_timestamp, records_to_csv};
pub use fs_exporter::FsExporter;
