//! Physio Sim - circadian PK/PD simulation of neurotransmitters, hormones
//! and metabolic markers
//!
//! This library integrates circadian baselines, signal couplings,
//! intervention pharmacology and slow homeostatic control into one ODE
//! system sampled on a caller-supplied time grid.

// Allow non-snake-case for unit suffixes in field names (mg_dL, pg_mL, etc.)
// This follows the project convention of including units in names.
#![allow(non_snake_case)]

pub mod baseline;
pub mod compute;
pub mod conditions;
pub mod config;
pub mod coupling;
pub mod export;
pub mod gate;
pub mod homeostasis;
pub mod integrator;
pub mod pharmacology;
pub mod signals;
pub mod state;
pub mod subject;
pub mod targets;

pub use compute::{
    compute, BoundaryError, ComputeRequest, ComputeResponse, InterventionInstance, RequestBuilder,
    SimulationWorker, TimeGrid,
};
pub use conditions::{ConditionRegistry, ConditionSpec, ProfileAdjustments};
pub use config::SimulationParameters;
pub use gate::DebugFlags;
pub use homeostasis::{HomeostasisConfig, HomeostasisState};
pub use integrator::{IntegrationMethod, IntegratorConfig};
pub use pharmacology::{validate_library, InterventionLibrary, Pharmacology, ValidationIssue};
pub use signals::{AuxPool, Signal, SignalValues, Unit};
pub use subject::{Physiology, Sex, Subject};
