//! Export functionality for compute responses.
//!
//! Provides CSV time-series export and JSON response snapshots.

mod csv_export;
mod json_export;

pub use csv_export::{clock_label, CsvExporter};
pub use json_export::{export_response_json, export_response_json_to, ResponseExport};
