//! Homeostasis controller: slow supervisory corrections.
//!
//! Runs once per grid step (not per sub-step) on a snapshot of effective
//! signal levels and produces additive derivative corrections that apply
//! during the following grid interval:
//! - stress load: leaky integral of cortisol excess, damping cortisol
//! - glycogen buffer: hepatic storage/release smoothing glucose excursions
//! - sleep pressure: process S, rising while awake and discharging in sleep,
//!   feeding adenosine
//!
//! References:
//! - McEwen BS. N Engl J Med. 1998;338:171-179 (allostatic load)
//! - Rothman DL et al. Science. 1991;254:573-576 (hepatic glycogen flux)
//! - Daan S, Beersma DG, Borbely AA. Am J Physiol. 1984;246:R161-R183 (two-process model)

use log::warn;
use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalValues};

/// Controller constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeostasisConfig {
    /// Smoothing time of the stress load (minutes)
    pub stress_tau_min: f64,
    /// Fraction of the stress load fed back against cortisol
    pub stress_gain: f64,
    /// Hepatic glycogen capacity (g)
    /// Rothman 1991: ~100 g in a fed adult liver
    pub glycogen_capacity_g: f64,
    pub glycogen_initial_g: f64,
    /// Storage flux per mg/dL of glucose above setpoint (g/min)
    pub glycogen_store_g_per_min_per_mg_dl: f64,
    /// Release flux per mg/dL of glucose below setpoint (g/min)
    pub glycogen_release_g_per_min_per_mg_dl: f64,
    /// Plasma glucose change per gram moved (mg/dL per g)
    pub glucose_mg_dl_per_g: f64,
    /// Process S rise time constant while awake (Daan 1984: 18.2 h)
    pub sleep_rise_tau_min: f64,
    /// Process S decay time constant while asleep (Daan 1984: 4.2 h)
    pub sleep_fall_tau_min: f64,
    pub sleep_pressure_initial: f64,
    /// Adenosine offset at full sleep pressure relative to neutral (nM)
    pub adenosine_gain_nm: f64,
}

impl Default for HomeostasisConfig {
    fn default() -> Self {
        Self {
            stress_tau_min: 720.0,
            stress_gain: 0.5,
            glycogen_capacity_g: 100.0,
            glycogen_initial_g: 70.0,
            glycogen_store_g_per_min_per_mg_dl: 0.002,
            glycogen_release_g_per_min_per_mg_dl: 0.003,
            glucose_mg_dl_per_g: 7.0,
            sleep_rise_tau_min: 1092.0,
            sleep_fall_tau_min: 252.0,
            sleep_pressure_initial: 0.3,
            adenosine_gain_nm: 150.0,
        }
    }
}

/// Slow state carried across grid steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomeostasisState {
    /// Smoothed relative cortisol excess (dimensionless, >= 0)
    pub stress_load: f64,
    pub glycogen_g: f64,
    /// Process S in [0, 1]
    pub sleep_pressure: f64,
}

impl HomeostasisState {
    pub fn initial(config: &HomeostasisConfig) -> Self {
        let capacity = config.glycogen_capacity_g.max(0.0);
        Self {
            stress_load: 0.0,
            glycogen_g: config.glycogen_initial_g.max(0.0).min(capacity),
            sleep_pressure: config.sleep_pressure_initial.clamp(0.0, 1.0),
        }
    }
}

/// Signal levels as seen by the controller
///
/// A signal cleared by a transporter is divided by that transporter's
/// activity: blocked reuptake counts as a higher effective level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveLevels {
    pub values: SignalValues,
}

impl EffectiveLevels {
    /// # Arguments
    /// * `signals` - Raw signal values
    /// * `transporter_activity` - Activity of the transporter clearing each signal (1.0 if none)
    pub fn new<F: Fn(Signal) -> f64>(signals: &SignalValues, transporter_activity: F) -> Self {
        let values = SignalValues::from_fn(|s| {
            let activity = transporter_activity(s);
            if activity > 0.0 {
                signals.get(s) / activity
            } else {
                signals.get(s)
            }
        });
        Self { values }
    }

    #[inline]
    pub fn get(&self, signal: Signal) -> f64 {
        self.values.get(signal)
    }
}

/// Supervisory controller
#[derive(Debug, Clone)]
pub struct HomeostasisController {
    pub config: HomeostasisConfig,
    state: HomeostasisState,
}

impl HomeostasisController {
    pub fn new(mut config: HomeostasisConfig) -> Self {
        if !(config.glycogen_capacity_g >= 0.0) {
            warn!("Glycogen capacity {} is invalid, using 0", config.glycogen_capacity_g);
            config.glycogen_capacity_g = 0.0;
        }
        let state = HomeostasisState::initial(&config);
        Self { config, state }
    }

    pub fn state(&self) -> HomeostasisState {
        self.state
    }

    /// Advance the slow state over one grid interval and return the
    /// derivative corrections to apply during it
    ///
    /// # Arguments
    /// * `effective` - Effective levels at the start of the interval
    /// * `setpoints` - Circadian setpoints at the start of the interval
    /// * `asleep` - Sleep state at the start of the interval
    /// * `dt_min` - Interval length
    pub fn update(&mut self, effective: &EffectiveLevels, setpoints: &SignalValues, asleep: bool, dt_min: f64) -> SignalValues {
        let c = &self.config;
        let mut corrections = SignalValues::default();
        if !(dt_min > 0.0) {
            return corrections;
        }

        // === Stress load ===
        let cortisol_ref = Signal::Cortisol.spec().reference;
        let excess = ((effective.get(Signal::Cortisol) - setpoints.get(Signal::Cortisol)) / cortisol_ref).max(0.0);
        if c.stress_tau_min > 0.0 {
            let decay = (-dt_min / c.stress_tau_min).exp();
            self.state.stress_load = excess + (self.state.stress_load - excess) * decay;
        }
        corrections.set(
            Signal::Cortisol,
            -c.stress_gain * self.state.stress_load * cortisol_ref / Signal::Cortisol.spec().tau_min,
        );

        // === Glycogen buffer ===
        let glucose_excess = effective.get(Signal::Glucose) - setpoints.get(Signal::Glucose);
        let flux_g_per_min = if glucose_excess > 0.0 {
            let room = (c.glycogen_capacity_g - self.state.glycogen_g).max(0.0) / dt_min;
            (c.glycogen_store_g_per_min_per_mg_dl * glucose_excess).min(room)
        } else {
            let available = self.state.glycogen_g.max(0.0) / dt_min;
            -(c.glycogen_release_g_per_min_per_mg_dl * -glucose_excess).min(available)
        };
        self.state.glycogen_g = (self.state.glycogen_g + flux_g_per_min * dt_min)
            .max(0.0)
            .min(c.glycogen_capacity_g.max(0.0));
        corrections.set(Signal::Glucose, -flux_g_per_min * c.glucose_mg_dl_per_g);

        // === Sleep pressure (process S) ===
        let p = self.state.sleep_pressure;
        self.state.sleep_pressure = if asleep {
            if c.sleep_fall_tau_min > 0.0 {
                p * (-dt_min / c.sleep_fall_tau_min).exp()
            } else {
                p
            }
        } else if c.sleep_rise_tau_min > 0.0 {
            1.0 - (1.0 - p) * (-dt_min / c.sleep_rise_tau_min).exp()
        } else {
            p
        };
        corrections.set(
            Signal::Adenosine,
            c.adenosine_gain_nm * (self.state.sleep_pressure - 0.5) / Signal::Adenosine.spec().tau_min,
        );

        for signal in [Signal::Cortisol, Signal::Glucose, Signal::Adenosine] {
            if !corrections.get(signal).is_finite() {
                corrections.set(signal, 0.0);
            }
        }
        corrections
    }
}
