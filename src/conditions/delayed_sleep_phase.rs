//! Delayed sleep phase overlay.
//!
//! Shifts the melatonin, cortisol and arousal rhythms later by up to three
//! hours and blunts the melatonin amplitude (Micic 2016: DLMO ~3 h later than
//! controls).

use super::{ConditionDiagnostics, ConditionModel, ProfileAdjustments};
use crate::baseline::minute_of_day;
use crate::compute::ComputeResponse;
use crate::signals::Signal;

const MAX_DELAY_MIN: f64 = 180.0;

/// Rhythms carried along with the delayed clock
const SHIFTED: [Signal; 6] = [
    Signal::Melatonin,
    Signal::Cortisol,
    Signal::Orexin,
    Signal::Histamine,
    Signal::Acetylcholine,
    Signal::Norepinephrine,
];

pub struct DelayedSleepPhaseModel {
    pub severity: f64,
}

impl DelayedSleepPhaseModel {
    pub fn new(severity: f64) -> Self {
        Self {
            severity: severity.clamp(0.0, 1.0),
        }
    }

    pub fn delay_min(&self) -> f64 {
        MAX_DELAY_MIN * self.severity
    }
}

impl ConditionModel for DelayedSleepPhaseModel {
    fn name(&self) -> &'static str {
        "delayed_sleep_phase"
    }

    fn description(&self) -> String {
        format!("Delayed sleep phase ({:.0} min delay)", self.delay_min())
    }

    fn severity(&self) -> f64 {
        self.severity
    }

    fn adjustments(&self) -> ProfileAdjustments {
        let delay = self.delay_min();
        let mut adj = ProfileAdjustments::default();
        for signal in SHIFTED {
            let amplitude = if signal == Signal::Melatonin {
                1.0 - 0.2 * self.severity
            } else {
                1.0
            };
            adj = adj.shift(signal, amplitude, delay);
        }
        adj
    }

    fn diagnostics(&self, response: &ComputeResponse) -> ConditionDiagnostics {
        let mut diag = ConditionDiagnostics::new(self.name(), self.severity);
        diag.add_metric("rhythm_delay_min", self.delay_min());
        if let Some((minute, peak)) = response.peak(Signal::Melatonin) {
            let clock = minute_of_day(minute);
            diag.add_metric("melatonin_peak_pg_mL", peak);
            diag.add_metric("melatonin_peak_clock_min", clock);
            // Nominal peak sits around 03:00
            if clock > 300.0 && clock < 720.0 {
                diag.add_status("Melatonin peak falls in the early morning");
            }
        }
        diag
    }
}
