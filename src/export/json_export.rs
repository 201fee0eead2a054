//! JSON snapshot export of a compute response.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::compute::ComputeResponse;
use crate::config::ExportConfig;

/// Full response export structure
#[derive(Debug, Clone, Serialize)]
pub struct ResponseExport<'a> {
    /// Export timestamp
    pub exported_at: String,
    /// Export version for compatibility
    pub version: &'static str,
    pub response: &'a ComputeResponse,
}

impl<'a> ResponseExport<'a> {
    pub fn new(response: &'a ComputeResponse) -> Self {
        Self {
            exported_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
            response,
        }
    }
}

/// Export a response to a timestamped JSON file in the export directory
///
/// Filename: `response_YYYYMMDD_HHMMSS.json`. Returns the path written.
pub fn export_response_json(response: &ComputeResponse, config: &ExportConfig) -> Result<PathBuf> {
    std::fs::create_dir_all(&config.directory)?;
    let filename = format!("response_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
    let path = config.directory.join(filename);
    export_response_json_to(response, &path, config.pretty_json)?;
    Ok(path)
}

/// Export a response to a specific file
pub fn export_response_json_to(response: &ComputeResponse, path: &Path, pretty: bool) -> Result<()> {
    let export = ResponseExport::new(response);
    let file = std::fs::File::create(path)?;
    if pretty {
        serde_json::to_writer_pretty(file, &export)?;
    } else {
        serde_json::to_writer(file, &export)?;
    }
    log::info!("JSON response exported: {}", path.display());
    Ok(())
}
