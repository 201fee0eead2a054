//! Coupling graph: signed, weighted influences between signals.
//!
//! Each edge reads the source signal's deviation from its own setpoint
//! (normalised by its reference level) and pushes the target signal by the
//! same relative amount of its reference, scaled by `strength`, through the
//! target's time constant:
//!
//! ```text
//! contribution[target] += sign * strength
//!                         * (prev[source] - setpoint[source]) / ref[source]
//!                         * ref[target] / tau[target]
//! ```
//!
//! The graph is evaluated on the *previous* sub-step's values only. Within a
//! sub-step every signal's coupling term is independent of the others, so the
//! evaluation is order-free and each signal can be probed in isolation.
//!
//! References:
//! - Saper CB et al. Nature. 2005;437:1257-1263 (flip-flop sleep/arousal circuitry)
//! - Aston-Jones G, Cohen JD. Annu Rev Neurosci. 2005;28:403-450 (LC-NE interactions)

use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalValues};

/// Direction of influence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingEffect {
    Stimulate,
    Inhibit,
}

impl CouplingEffect {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            CouplingEffect::Stimulate => 1.0,
            CouplingEffect::Inhibit => -1.0,
        }
    }
}

/// One directed edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingEdge {
    pub source: Signal,
    pub target: Signal,
    pub effect: CouplingEffect,
    /// Dimensionless gain (relative deviation in, relative push out)
    pub strength: f64,
}

/// Directed weighted graph over signals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouplingGraph {
    edges: Vec<CouplingEdge>,
}

impl CouplingGraph {
    /// Graph with no edges
    pub fn empty() -> Self {
        Self::default()
    }

    /// The fixed physiological coupling set
    pub fn default_graph() -> Self {
        use CouplingEffect::{Inhibit, Stimulate};
        use Signal::*;

        let edges = [
            // Arousal network (Saper 2005)
            (Orexin, Norepinephrine, Stimulate, 0.30),
            (Orexin, Histamine, Stimulate, 0.30),
            (Orexin, Dopamine, Stimulate, 0.15),
            (Orexin, Acetylcholine, Stimulate, 0.15),
            (Melatonin, Orexin, Inhibit, 0.10),
            (Adenosine, Acetylcholine, Inhibit, 0.20),
            (Adenosine, Orexin, Inhibit, 0.15),
            (Adenosine, Dopamine, Inhibit, 0.10),
            (Gaba, Orexin, Inhibit, 0.20),
            (Gaba, Glutamate, Inhibit, 0.30),
            (Glutamate, Dopamine, Stimulate, 0.15),
            (Glutamate, Gaba, Stimulate, 0.10),
            // Monoamine cross-talk (Aston-Jones 2005)
            (Serotonin, Dopamine, Inhibit, 0.15),
            (Dopamine, Norepinephrine, Stimulate, 0.10),
            (Norepinephrine, Adrenaline, Stimulate, 0.20),
            (Norepinephrine, Cortisol, Stimulate, 0.10),
            (Histamine, Acetylcholine, Stimulate, 0.10),
            // HPA and glucose regulation
            (Cortisol, Glucose, Stimulate, 0.15),
            (Adrenaline, Glucose, Stimulate, 0.10),
            (Glucagon, Glucose, Stimulate, 0.20),
            (Insulin, Glucose, Inhibit, 0.25),
            (Glucose, Insulin, Stimulate, 0.60),
            (Glucose, Glucagon, Inhibit, 0.30),
            (Insulin, Ghrelin, Inhibit, 0.15),
            (Ghrelin, Dopamine, Stimulate, 0.05),
            (Ghrelin, Orexin, Stimulate, 0.10),
        ];

        Self {
            edges: edges
                .iter()
                .map(|&(source, target, effect, strength)| CouplingEdge {
                    source,
                    target,
                    effect,
                    strength,
                })
                .collect(),
        }
    }

    /// Add an edge
    pub fn add_edge(&mut self, source: Signal, target: Signal, effect: CouplingEffect, strength: f64) {
        self.edges.push(CouplingEdge {
            source,
            target,
            effect,
            strength,
        });
    }

    pub fn edges(&self) -> &[CouplingEdge] {
        &self.edges
    }

    /// Incoming edges of one signal
    pub fn incoming(&self, target: Signal) -> impl Iterator<Item = &CouplingEdge> {
        self.edges.iter().filter(move |e| e.target == target)
    }

    /// Derivative contribution of one edge given lagged values and setpoints
    #[inline]
    fn edge_term(edge: &CouplingEdge, previous: &SignalValues, setpoints: &SignalValues) -> f64 {
        let source_ref = edge.source.spec().reference;
        let target_spec = edge.target.spec();
        if source_ref <= 0.0 || target_spec.tau_min <= 0.0 {
            return 0.0;
        }
        let deviation = (previous.get(edge.source) - setpoints.get(edge.source)) / source_ref;
        edge.effect.sign() * edge.strength * deviation * target_spec.reference / target_spec.tau_min
    }

    /// Coupling contribution to one signal's derivative
    pub fn contribution(&self, target: Signal, previous: &SignalValues, setpoints: &SignalValues) -> f64 {
        self.incoming(target)
            .map(|e| Self::edge_term(e, previous, setpoints))
            .sum()
    }

    /// Coupling contributions to every signal's derivative
    ///
    /// # Arguments
    /// * `previous` - Signal values at the start of the current sub-step
    /// * `setpoints` - Circadian setpoints at that instant
    pub fn contributions(&self, previous: &SignalValues, setpoints: &SignalValues) -> SignalValues {
        let mut out = SignalValues::default();
        for edge in &self.edges {
            out.add(edge.target, Self::edge_term(edge, previous, setpoints));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_deviation_no_contribution() {
        let graph = CouplingGraph::default_graph();
        let values = SignalValues::references();
        let out = graph.contributions(&values, &values);
        for (signal, v) in out.iter() {
            assert_eq!(v, 0.0, "{} should have zero coupling at setpoint", signal);
        }
    }

    #[test]
    fn test_inhibit_sign() {
        let mut graph = CouplingGraph::empty();
        graph.add_edge(Signal::Insulin, Signal::Glucose, CouplingEffect::Inhibit, 0.5);
        let setpoints = SignalValues::references();
        let mut previous = setpoints;
        previous.set(Signal::Insulin, 16.0); // 2x reference
        let c = graph.contribution(Signal::Glucose, &previous, &setpoints);
        assert!(c < 0.0, "elevated insulin should push glucose down, got {}", c);
        // 0.5 * (8/8) * 90/45 = 1.0 mg/dL/min
        assert!((c + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_contributions_match_per_signal() {
        let graph = CouplingGraph::default_graph();
        let setpoints = SignalValues::references();
        let mut previous = setpoints;
        previous.set(Signal::Orexin, 400.0);
        previous.set(Signal::Glucose, 150.0);
        let all = graph.contributions(&previous, &setpoints);
        for signal in Signal::ALL {
            let single = graph.contribution(signal, &previous, &setpoints);
            assert!((all.get(signal) - single).abs() < 1e-12);
        }
        assert!(all.get(Signal::Insulin) > 0.0);
        assert!(all.get(Signal::Histamine) > 0.0);
    }
}
