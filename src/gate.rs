//! Debug/feature gate.
//!
//! Orthogonal switches selecting which subsystems contribute to the
//! derivative. A disabled switch zeroes its term for every signal; nothing is
//! partially applied.

use serde::{Deserialize, Serialize};

/// Named on/off switches, all enabled by default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugFlags {
    /// Relaxation toward the circadian setpoint
    pub baselines: bool,
    /// Every PD contribution of intervention instances
    pub interventions: bool,
    /// Lagged cross-signal couplings
    pub couplings: bool,
    /// Slow supervisory corrections
    pub homeostasis: bool,
    /// Receptor-routed effects (drug-driven and adaptation-driven)
    pub receptors: bool,
    /// Reuptake clearance scaling
    pub transporters: bool,
    /// Catabolic clearance scaling
    pub enzymes: bool,
    /// Subject profile and condition overlays
    pub profiles: bool,
    /// Vesicle-limited production and pool dynamics
    pub auxiliary: bool,
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl DebugFlags {
    /// Everything on
    pub fn all() -> Self {
        Self {
            baselines: true,
            interventions: true,
            couplings: true,
            homeostasis: true,
            receptors: true,
            transporters: true,
            enzymes: true,
            profiles: true,
            auxiliary: true,
        }
    }

    /// Everything off
    pub fn none() -> Self {
        Self {
            baselines: false,
            interventions: false,
            couplings: false,
            homeostasis: false,
            receptors: false,
            transporters: false,
            enzymes: false,
            profiles: false,
            auxiliary: false,
        }
    }

    /// Names of all switches, in declaration order
    pub const NAMES: [&'static str; 9] = [
        "baselines",
        "interventions",
        "couplings",
        "homeostasis",
        "receptors",
        "transporters",
        "enzymes",
        "profiles",
        "auxiliary",
    ];

    /// Set a switch by name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, enabled: bool) -> bool {
        let slot = match name {
            "baselines" => &mut self.baselines,
            "interventions" => &mut self.interventions,
            "couplings" => &mut self.couplings,
            "homeostasis" => &mut self.homeostasis,
            "receptors" => &mut self.receptors,
            "transporters" => &mut self.transporters,
            "enzymes" => &mut self.enzymes,
            "profiles" => &mut self.profiles,
            "auxiliary" => &mut self.auxiliary,
            _ => return false,
        };
        *slot = enabled;
        true
    }

    /// Copy with one switch changed
    pub fn with(mut self, name: &str, enabled: bool) -> Self {
        if !self.set(name, enabled) {
            log::warn!("Unknown debug flag '{}'", name);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_all_enabled() {
        let flags = DebugFlags::default();
        assert_eq!(flags, DebugFlags::all());
    }

    #[test]
    fn test_set_by_name() {
        let mut flags = DebugFlags::all();
        for name in DebugFlags::NAMES {
            assert!(flags.set(name, false), "{} should be a known flag", name);
        }
        assert_eq!(flags, DebugFlags::none());
        assert!(!flags.set("rendering", true));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let flags: DebugFlags = serde_json::from_str(r#"{"couplings": false}"#).unwrap();
        assert!(!flags.couplings);
        assert!(flags.baselines && flags.homeostasis);
    }
}
