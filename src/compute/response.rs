//! Compute response: sampled series and run summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::homeostasis::HomeostasisState;
use crate::signals::{AuxPool, Signal};
use crate::state::{Compartment, InstanceKey};

/// One compartment of one instance sampled on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentSeries {
    pub instance: InstanceKey,
    pub intervention_key: String,
    /// Central (mg/L) for substances, Effect (index) for activities
    pub compartment: Compartment,
    pub values: Vec<f64>,
}

/// Result of one compute call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputeResponse {
    pub minutes: Vec<f64>,
    pub series: BTreeMap<Signal, Vec<f64>>,
    pub auxiliary_series: BTreeMap<AuxPool, Vec<f64>>,
    pub compartment_series: Vec<CompartmentSeries>,
    /// One controller state per grid point
    pub homeostasis_series: Vec<HomeostasisState>,
    pub final_homeostasis_state: Option<HomeostasisState>,
    pub compute_time_ms: f64,
    /// Non-finite values replaced during integration
    pub repaired_values: u64,
}

impl ComputeResponse {
    /// Series of `signal`, empty if absent
    pub fn signal(&self, signal: Signal) -> &[f64] {
        self.series.get(&signal).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn pool(&self, pool: AuxPool) -> &[f64] {
        self.auxiliary_series.get(&pool).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Value of `signal` at the grid point nearest `minute`
    pub fn value_at(&self, signal: Signal, minute: f64) -> Option<f64> {
        let index = self
            .minutes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - minute).abs().total_cmp(&(*b - minute).abs()))
            .map(|(i, _)| i)?;
        self.signal(signal).get(index).copied()
    }

    pub fn mean(&self, signal: Signal) -> Option<f64> {
        let values = self.signal(signal);
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Minute and value of the maximum
    pub fn peak(&self, signal: Signal) -> Option<(f64, f64)> {
        self.signal(signal)
            .iter()
            .zip(&self.minutes)
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(&v, &m)| (m, v))
    }

    /// Fraction of grid points where `signal` is below `threshold`
    pub fn fraction_below(&self, signal: Signal, threshold: f64) -> Option<f64> {
        let values = self.signal(signal);
        if values.is_empty() {
            return None;
        }
        let below = values.iter().filter(|&&v| v < threshold).count();
        Some(below as f64 / values.len() as f64)
    }

    /// Compartment series of the instance `(id, start_minute)`
    pub fn compartment(&self, id: &str, start_minute: f64) -> Option<&CompartmentSeries> {
        let key = InstanceKey::new(id, start_minute);
        self.compartment_series.iter().find(|c| c.instance == key)
    }

    pub fn print_summary(&self) {
        println!("\n=== Simulation Summary ===");
        if let (Some(first), Some(last)) = (self.minutes.first(), self.minutes.last()) {
            println!(
                "Grid: {} points, minute {:.0} to {:.0}",
                self.minutes.len(),
                first,
                last
            );
        }
        println!("Compute time: {:.1} ms", self.compute_time_ms);
        println!("\n{:<16} {:>10} {:>10} {:>10} {:>8}", "Signal", "Mean", "Peak", "At (min)", "Unit");
        for signal in Signal::ALL {
            if let (Some(mean), Some((minute, peak))) = (self.mean(signal), self.peak(signal)) {
                println!(
                    "{:<16} {:>10.2} {:>10.2} {:>10.0} {:>8}",
                    signal.key(),
                    mean,
                    peak,
                    minute,
                    signal.spec().unit.symbol()
                );
            }
        }
        if !self.compartment_series.is_empty() {
            println!("\nInterventions:");
            for c in &self.compartment_series {
                let max = c.values.iter().copied().fold(0.0, f64::max);
                println!("  {:<20} {:<16} peak {:.4}", c.instance.to_string(), c.intervention_key, max);
            }
        }
        if let Some(h) = self.final_homeostasis_state {
            println!(
                "\nHomeostasis: stress load {:.3}, glycogen {:.1} g, sleep pressure {:.2}",
                h.stress_load, h.glycogen_g, h.sleep_pressure
            );
        }
        if self.repaired_values > 0 {
            println!("\n⚠ {} non-finite values were repaired", self.repaired_values);
        }
    }
}
