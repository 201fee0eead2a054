//! ADHD overlay.
//!
//! Modelled as elevated catecholamine reuptake with a flattened tonic
//! dopamine rhythm and mildly reduced D2 availability.
//!
//! | Parameter | Severity 1.0 | Source |
//! |-----------|--------------|--------|
//! | DAT activity | +30% | Volkow 2009 (striatal DAT) |
//! | NET activity | +20% | estimated |
//! | D2 density | -10% | Volkow 2009 |
//! | Dopamine rhythm amplitude | x0.8 | estimated |
//!
//! References:
//! - Volkow ND et al. JAMA. 2009;302:1084-1091
//! - Arnsten AFT. Biol Psychiatry. 2011;69:e89-e99

use super::{ConditionDiagnostics, ConditionModel, ProfileAdjustments};
use crate::compute::ComputeResponse;
use crate::signals::Signal;

/// Configuration at full severity
#[derive(Debug, Clone)]
pub struct AdhdConfig {
    pub dat_activity_delta: f64,
    pub net_activity_delta: f64,
    pub d2_density_delta: f64,
    pub dopamine_amplitude_loss: f64,
    /// Dopamine below this fraction of reference counts as hypodopaminergic
    pub low_dopamine_fraction: f64,
}

impl Default for AdhdConfig {
    fn default() -> Self {
        Self {
            dat_activity_delta: 0.3,
            net_activity_delta: 0.2,
            d2_density_delta: -0.1,
            dopamine_amplitude_loss: 0.2,
            low_dopamine_fraction: 0.8,
        }
    }
}

pub struct AdhdModel {
    pub severity: f64,
    pub config: AdhdConfig,
}

impl AdhdModel {
    pub fn new(severity: f64) -> Self {
        Self::with_config(severity, AdhdConfig::default())
    }

    pub fn with_config(severity: f64, config: AdhdConfig) -> Self {
        Self {
            severity: severity.clamp(0.0, 1.0),
            config,
        }
    }
}

impl ConditionModel for AdhdModel {
    fn name(&self) -> &'static str {
        "adhd"
    }

    fn description(&self) -> String {
        format!("ADHD (severity {:.2})", self.severity)
    }

    fn severity(&self) -> f64 {
        self.severity
    }

    fn adjustments(&self) -> ProfileAdjustments {
        let s = self.severity;
        let c = &self.config;
        ProfileAdjustments::default()
            .transporter("DAT", c.dat_activity_delta * s)
            .transporter("NET", c.net_activity_delta * s)
            .density("D2", c.d2_density_delta * s)
            .shift(Signal::Dopamine, 1.0 - c.dopamine_amplitude_loss * s, 0.0)
    }

    fn diagnostics(&self, response: &ComputeResponse) -> ConditionDiagnostics {
        let mut diag = ConditionDiagnostics::new(self.name(), self.severity);
        let reference = Signal::Dopamine.spec().reference;
        let mean = response.mean(Signal::Dopamine).unwrap_or(0.0);
        let low = response
            .fraction_below(Signal::Dopamine, self.config.low_dopamine_fraction * reference)
            .unwrap_or(0.0);

        diag.add_metric("mean_dopamine_nM", mean);
        diag.add_metric("dopamine_vs_reference", mean / reference);
        diag.add_metric("time_hypodopaminergic_fraction", low);
        if let Some(ne) = response.mean(Signal::Norepinephrine) {
            diag.add_metric("mean_norepinephrine_pg_mL", ne);
        }

        if low > 0.5 {
            diag.add_warning("Dopamine below 80% of reference for most of the run");
        } else if low > 0.2 {
            diag.add_status("Intermittent hypodopaminergic periods");
        } else {
            diag.add_status("Dopamine mostly within nominal range");
        }
        diag
    }
}
