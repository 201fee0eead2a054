//! ODE integration of the physiology state.
//!
//! Each grid interval is split into `ceil(dt / max_substep_min)` equal
//! sub-steps. Within a sub-step, signal coupling reads the signals and
//! setpoints frozen at the sub-step start for every stage, while baseline
//! relaxation, sleep state and dosing windows are evaluated at each stage's
//! own time. Boluses falling
//! inside a sub-step are placed in their depot before it is integrated.
//! Non-finite values are repaired after every sub-step.
//!
//! Reference: Press et al., Numerical Recipes, 3rd ed., Cambridge University Press 2007

mod model;
mod terms;

pub use model::{LaggedSnapshot, ModelInputs, SimulationModel, ACTIVITY_FLOOR};
pub use terms::DerivativeTerms;

use serde::{Deserialize, Serialize};

use crate::signals::SignalValues;
use crate::state::{SimulationState, StateDerivative};

/// Upper bound on the sub-step length (minutes)
pub const MAX_SUBSTEP_MIN: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// Forward Euler
    #[default]
    Euler,
    /// Classic 4th-order Runge-Kutta
    RungeKutta4,
}

/// Configuration for the ODE integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Longest sub-step in minutes; values above 1 are capped at 1
    pub max_substep_min: f64,
    pub method: IntegrationMethod,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            max_substep_min: MAX_SUBSTEP_MIN,
            method: IntegrationMethod::Euler,
        }
    }
}

impl IntegratorConfig {
    /// Effective sub-step bound in (0, 1]
    pub fn substep_bound(&self) -> f64 {
        if self.max_substep_min.is_finite() && self.max_substep_min > 0.0 {
            self.max_substep_min.min(MAX_SUBSTEP_MIN)
        } else {
            MAX_SUBSTEP_MIN
        }
    }
}

/// Fixed-step integrator over a prepared model
pub struct Integrator {
    pub config: IntegratorConfig,
    model: SimulationModel,
    /// Number of sub-steps taken
    pub substep_count: u64,
    /// Non-finite values replaced by sanitisation
    pub repaired_count: u64,
}

impl Integrator {
    pub fn new(model: SimulationModel, config: IntegratorConfig) -> Self {
        Self {
            config,
            model,
            substep_count: 0,
            repaired_count: 0,
        }
    }

    pub fn model(&self) -> &SimulationModel {
        &self.model
    }

    #[inline]
    fn derivative(
        &self,
        state: &SimulationState,
        minute: f64,
        lagged: &LaggedSnapshot,
        corrections: &SignalValues,
    ) -> StateDerivative {
        self.model.evaluate(state, minute, lagged, corrections).0
    }

    /// Signal derivative breakdown at `state`, with coupling read from the
    /// state itself
    pub fn derivative_terms(&self, state: &SimulationState, corrections: &SignalValues) -> DerivativeTerms {
        self.model
            .evaluate(state, state.minute, &self.model.lagged_snapshot(state), corrections)
            .1
    }

    /// Integrate one sub-step from `state.minute` to `to_minute`
    ///
    /// # RK4 Algorithm
    /// k1 = f(t, y)
    /// k2 = f(t + h/2, y + h/2 * k1)
    /// k3 = f(t + h/2, y + h/2 * k2)
    /// k4 = f(t + h, y + h * k3)
    /// y_new = y + h/6 * (k1 + 2*k2 + 2*k3 + k4)
    pub fn substep(&mut self, state: &SimulationState, to_minute: f64, corrections: &SignalValues) -> SimulationState {
        let t = state.minute;
        let h = to_minute - t;
        let mut start = state.clone();
        if !(h > 0.0) {
            return start;
        }
        self.model.inject_boluses(&mut start, t, to_minute);
        let lagged = self.model.lagged_snapshot(&start);

        let mut next = match self.config.method {
            IntegrationMethod::Euler => {
                let k1 = self.derivative(&start, t, &lagged, corrections);
                start.advanced_by(&k1, h)
            }
            IntegrationMethod::RungeKutta4 => {
                let half = 0.5 * h;
                let k1 = self.derivative(&start, t, &lagged, corrections);
                let k2 = self.derivative(&start.advanced_by(&k1, half), t + half, &lagged, corrections);
                let k3 = self.derivative(&start.advanced_by(&k2, half), t + half, &lagged, corrections);
                let k4 = self.derivative(&start.advanced_by(&k3, h), to_minute, &lagged, corrections);
                start.advanced_by(&StateDerivative::rk4_combine(&k1, &k2, &k3, &k4), h)
            }
        };
        next.minute = to_minute;
        let repaired = next.sanitize();
        if repaired > 0 {
            log::warn!("Repaired {} non-finite values at minute {:.1}", repaired, to_minute);
            self.repaired_count += repaired as u64;
        }
        self.substep_count += 1;
        next
    }

    /// Integrate from `state.minute` to `to_minute` in equal sub-steps
    ///
    /// The last sub-step ends exactly on `to_minute`, so consecutive grid
    /// intervals partition time without gaps and each bolus lands once.
    pub fn advance(&mut self, state: &SimulationState, to_minute: f64, corrections: &SignalValues) -> SimulationState {
        let from = state.minute;
        let dt = to_minute - from;
        if !(dt > 0.0) {
            return state.clone();
        }
        let n = (dt / self.config.substep_bound()).ceil().max(1.0) as usize;
        let mut current = state.clone();
        for j in 1..=n {
            let t = if j == n {
                to_minute
            } else {
                from + dt * j as f64 / n as f64
            };
            current = self.substep(&current, t, corrections);
        }
        current
    }

    /// Reset step counters
    pub fn reset(&mut self) {
        self.substep_count = 0;
        self.repaired_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::InterventionInstance;
    use crate::conditions::ProfileAdjustments;
    use crate::gate::DebugFlags;
    use crate::pharmacology::InterventionLibrary;
    use crate::signals::Signal;
    use crate::state::Compartment;
    use crate::subject::{Physiology, Subject};

    fn integrator(instances: &[InterventionInstance], config: IntegratorConfig) -> Integrator {
        let subject = Subject::default();
        let profile = ProfileAdjustments::default();
        let model = SimulationModel::build(&ModelInputs {
            instances,
            subject: &subject,
            physiology: Physiology::derive(&subject),
            profile: &profile,
            flags: DebugFlags::all(),
        });
        Integrator::new(model, config)
    }

    #[test]
    fn test_substep_count_follows_bound() {
        let mut it = integrator(
            &[],
            IntegratorConfig {
                max_substep_min: 0.5,
                method: IntegrationMethod::Euler,
            },
        );
        let s = it.model().initial_state(0.0);
        let next = it.advance(&s, 5.0, &SignalValues::default());
        assert_eq!(it.substep_count, 10);
        assert_eq!(next.minute, 5.0);
    }

    #[test]
    fn test_oversized_substep_is_capped() {
        let config = IntegratorConfig {
            max_substep_min: 30.0,
            method: IntegrationMethod::RungeKutta4,
        };
        assert_eq!(config.substep_bound(), 1.0);
        let mut it = integrator(&[], config);
        let s = it.model().initial_state(0.0);
        it.advance(&s, 5.0, &SignalValues::default());
        assert_eq!(it.substep_count, 5);
    }

    #[test]
    fn test_backwards_interval_is_a_no_op() {
        let mut it = integrator(&[], IntegratorConfig::default());
        let s = it.model().initial_state(100.0);
        let next = it.advance(&s, 50.0, &SignalValues::default());
        assert_eq!(next, s);
        assert_eq!(it.substep_count, 0);
    }

    #[test]
    fn test_bolus_lands_once_on_grid_boundary() {
        let library = InterventionLibrary::builtin();
        let mut inst = InterventionInstance::new("coffee", "caffeine", 10.0, 0.0);
        inst.pharmacology = library.resolve("caffeine", &inst.params);
        let mut it = integrator(&[inst], IntegratorConfig::default());
        let s0 = it.model().initial_state(0.0);
        let s1 = it.advance(&s0, 10.0, &SignalValues::default());
        assert_eq!(s1.compartment(0, Compartment::Depot), 0.0);
        let s2 = it.advance(&s1, 11.0, &SignalValues::default());
        let after_first = s2.compartment(0, Compartment::Depot) + s2.compartment(0, Compartment::Central);
        assert!(after_first > 0.0);
        let s3 = it.advance(&s2, 12.0, &SignalValues::default());
        // No second injection: depot only drains from here on
        assert!(s3.compartment(0, Compartment::Depot) < s2.compartment(0, Compartment::Depot));
    }

    #[test]
    fn test_resting_day_stays_near_setpoints() {
        let mut it = integrator(&[], IntegratorConfig::default());
        let mut s = it.model().initial_state(0.0);
        for k in 1..=288 {
            s = it.advance(&s, 5.0 * k as f64, &SignalValues::default());
        }
        for signal in Signal::ALL {
            let v = s.signals.get(signal);
            let spec = signal.spec();
            assert!(v.is_finite());
            assert!(v >= spec.min && v <= spec.max, "{} = {}", signal, v);
        }
        assert_eq!(it.repaired_count, 0);
    }
}
