//! Compute boundary: one request in, sampled series out.
//!
//! `compute` is synchronous and deterministic. Per grid interval it
//! 1. runs the homeostasis controller on the state at the interval start
//! 2. integrates the interval in sub-steps with those corrections held fixed
//! 3. records signals, pools, compartments and controller state
//!
//! `SimulationWorker` runs the same function on a background thread.

mod request;
mod response;
mod worker;

pub use request::{ComputeRequest, InterventionInstance, RequestBuilder, TimeGrid};
pub use response::{CompartmentSeries, ComputeResponse};
pub use worker::{BoundaryError, SimulationWorker, WorkerResponse};

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::homeostasis::HomeostasisController;
use crate::integrator::{Integrator, ModelInputs, SimulationModel};
use crate::signals::{AuxPool, Signal, SignalValues};
use crate::state::{Compartment, SimulationState};
use crate::subject::Physiology;

/// Grid-aligned recording of one run
struct Recorder {
    series: Vec<Vec<f64>>,
    pools: Vec<Vec<f64>>,
    compartments: Vec<(usize, Compartment, Vec<f64>)>,
}

impl Recorder {
    fn new(model: &SimulationModel, capacity: usize) -> Self {
        let compartments = (0..model.layout().instance_count())
            .map(|i| {
                let compartment = if model.is_activity(i) {
                    Compartment::Effect
                } else {
                    Compartment::Central
                };
                (i, compartment, Vec::with_capacity(capacity))
            })
            .collect();
        Self {
            series: vec![Vec::with_capacity(capacity); Signal::COUNT],
            pools: vec![Vec::with_capacity(capacity); AuxPool::COUNT],
            compartments,
        }
    }

    fn record(&mut self, state: &SimulationState) {
        for signal in Signal::ALL {
            self.series[signal.index()].push(state.signals.get(signal));
        }
        for pool in AuxPool::ALL {
            self.pools[pool.index()].push(state.pools.get(pool));
        }
        for (i, compartment, values) in self.compartments.iter_mut() {
            values.push(state.compartment(*i, *compartment));
        }
    }
}

/// Run one simulation
pub fn compute(request: &ComputeRequest) -> ComputeResponse {
    let started = Instant::now();
    let physiology = Physiology::derive(&request.subject).with_overrides(&request.physiology);
    let profile = request.effective_profile();
    let model = SimulationModel::build(&ModelInputs {
        instances: &request.interventions,
        subject: &request.subject,
        physiology,
        profile: &profile,
        flags: request.flags,
    });
    let minutes = &request.grid.minutes;
    if minutes.is_empty() {
        warn!("Empty time grid, nothing to compute");
        return ComputeResponse::default();
    }
    if !request.grid.is_ordered() {
        warn!("Time grid is not strictly increasing; backward intervals are held");
    }
    debug!(
        "Computing {} grid points with {} instances ({:?})",
        minutes.len(),
        model.layout().instance_count(),
        request.integrator.method
    );

    let mut recorder = Recorder::new(&model, minutes.len());
    let mut integrator = Integrator::new(model, request.integrator);
    let mut controller = HomeostasisController::new(request.homeostasis.clone());
    let mut homeostasis_series = Vec::with_capacity(minutes.len());

    let mut state = integrator.model().initial_state(minutes[0]);
    recorder.record(&state);
    homeostasis_series.push(controller.state());

    for window in minutes.windows(2) {
        let (from, to) = (window[0], window[1]);
        let corrections = if request.flags.homeostasis {
            let model = integrator.model();
            let effective = model.effective_levels(&state);
            let setpoints = model.setpoints(from);
            controller.update(&effective, &setpoints, model.is_asleep(from), to - from)
        } else {
            SignalValues::default()
        };
        state = integrator.advance(&state, to, &corrections);
        recorder.record(&state);
        homeostasis_series.push(controller.state());
    }

    let model = integrator.model();
    let compartment_series = recorder
        .compartments
        .into_iter()
        .filter_map(|(i, compartment, values)| {
            let instance = model.layout().instances().get(i)?.clone();
            Some(CompartmentSeries {
                instance,
                intervention_key: model.intervention_key(i).unwrap_or_default().to_string(),
                compartment,
                values,
            })
        })
        .collect();
    let series: BTreeMap<Signal, Vec<f64>> = Signal::ALL.iter().copied().zip(recorder.series).collect();
    let auxiliary_series: BTreeMap<AuxPool, Vec<f64>> = AuxPool::ALL.iter().copied().zip(recorder.pools).collect();

    let compute_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    info!(
        "Computed {} grid points ({} sub-steps) in {:.1} ms",
        minutes.len(),
        integrator.substep_count,
        compute_time_ms
    );

    ComputeResponse {
        minutes: minutes.clone(),
        series,
        auxiliary_series,
        compartment_series,
        final_homeostasis_state: homeostasis_series.last().copied(),
        homeostasis_series,
        compute_time_ms,
        repaired_values: integrator.repaired_count,
    }
}
