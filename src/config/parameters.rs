//! Parameter structures loaded from JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::homeostasis::HomeostasisConfig;
use crate::integrator::IntegratorConfig;

/// Default location of the run parameters file
pub const DEFAULT_PARAMETERS_PATH: &str = "data/parameters/simulation.json";

/// Top-level parameters container
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Sub-step bound and stepping method
    pub integrator: IntegratorConfig,
    /// Supervisory controller constants
    pub homeostasis: HomeostasisConfig,
    /// Output locations
    pub export: ExportConfig,
}

impl SimulationParameters {
    /// Load parameters from a JSON file, or use defaults if it doesn't exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => {
                    log::info!("Loaded simulation parameters from {:?}", path.as_ref());
                    params
                }
                Err(e) => {
                    log::warn!("Failed to parse simulation parameters: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Simulation parameters file not found, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `DEFAULT_PARAMETERS_PATH`
    pub fn load() -> Self {
        Self::load_or_default(DEFAULT_PARAMETERS_PATH)
    }
}

/// Where exports are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output directory, created on first export
    pub directory: PathBuf,
    /// Pretty-print JSON snapshots
    pub pretty_json: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("exports"),
            pretty_json: true,
        }
    }
}
