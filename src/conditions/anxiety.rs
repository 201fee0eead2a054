//! Anxiety overlay.
//!
//! Reduced GABA-A sensitivity and 5-HT1A density, with amplified cortisol
//! and noradrenergic rhythms and slightly faster serotonin reuptake.
//!
//! References:
//! - Nuss P. Neuropsychiatr Dis Treat. 2015;11:165-175
//! - Akimova E et al. Biol Psychiatry. 2009;66:627-635 (5-HT1A binding)

use super::{ConditionDiagnostics, ConditionModel, ProfileAdjustments};
use crate::compute::ComputeResponse;
use crate::signals::Signal;

#[derive(Debug, Clone)]
pub struct AnxietyConfig {
    pub gaba_a_sensitivity_delta: f64,
    pub ht1a_density_delta: f64,
    pub sert_activity_delta: f64,
    pub cortisol_amplitude_gain: f64,
    pub norepinephrine_amplitude_gain: f64,
}

impl Default for AnxietyConfig {
    fn default() -> Self {
        Self {
            gaba_a_sensitivity_delta: -0.25,
            ht1a_density_delta: -0.2,
            sert_activity_delta: 0.15,
            cortisol_amplitude_gain: 0.4,
            norepinephrine_amplitude_gain: 0.3,
        }
    }
}

pub struct AnxietyModel {
    pub severity: f64,
    pub config: AnxietyConfig,
}

impl AnxietyModel {
    pub fn new(severity: f64) -> Self {
        Self {
            severity: severity.clamp(0.0, 1.0),
            config: AnxietyConfig::default(),
        }
    }
}

impl ConditionModel for AnxietyModel {
    fn name(&self) -> &'static str {
        "anxiety"
    }

    fn description(&self) -> String {
        format!("Anxiety (severity {:.2})", self.severity)
    }

    fn severity(&self) -> f64 {
        self.severity
    }

    fn adjustments(&self) -> ProfileAdjustments {
        let s = self.severity;
        let c = &self.config;
        ProfileAdjustments::default()
            .sensitivity("GABA_A", c.gaba_a_sensitivity_delta * s)
            .density("5HT1A", c.ht1a_density_delta * s)
            .transporter("SERT", c.sert_activity_delta * s)
            .shift(Signal::Cortisol, 1.0 + c.cortisol_amplitude_gain * s, 0.0)
            .shift(Signal::Norepinephrine, 1.0 + c.norepinephrine_amplitude_gain * s, 0.0)
    }

    fn diagnostics(&self, response: &ComputeResponse) -> ConditionDiagnostics {
        let mut diag = ConditionDiagnostics::new(self.name(), self.severity);
        if let Some((minute, peak)) = response.peak(Signal::Cortisol) {
            diag.add_metric("cortisol_peak_ug_dL", peak);
            diag.add_metric("cortisol_peak_minute", minute);
            if peak > 25.0 {
                diag.add_warning("Cortisol peak above 25 ug/dL");
            }
        }
        if let Some(ne) = response.mean(Signal::Norepinephrine) {
            diag.add_metric("mean_norepinephrine_pg_mL", ne);
        }
        if let Some(stress) = response.final_homeostasis_state.map(|h| h.stress_load) {
            diag.add_metric("final_stress_load", stress);
            if stress > 0.5 {
                diag.add_status("Accumulated stress load is elevated");
            }
        }
        diag
    }
}
