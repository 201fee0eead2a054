//! Subject parameters and derived physiology scalars.
//!
//! Body composition drives PK volumes; age and size drive elimination rate
//! and metabolic capacity. Cycle data adds a luteal-phase overlay on GABA-A
//! sensitivity (neurosteroid potentiation).
//!
//! References:
//! - Boer P. Am J Physiol. 1984;247:F632-F636 (lean body mass)
//! - Watson PE et al. Am J Clin Nutr. 1980;33:27-39 (total body water)
//! - Anderson BJ, Holford NHG. Annu Rev Pharmacol Toxicol. 2008;48:303-332 (allometric clearance)
//! - Backstrom T et al. Neuroscience. 2011;191:46-54 (allopregnanolone and GABA-A)

use serde::{Deserialize, Serialize};

use crate::baseline::phase::{minute_of_day, MINUTES_PER_DAY};

/// Lightest body weight accepted for PK scaling
const MIN_WEIGHT_KG: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Menstrual cycle position at the start of the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleData {
    pub cycle_length_days: f64,
    /// Day of cycle at minute 0 (day 0 = first day of menses)
    pub day_of_cycle: f64,
}

impl CycleData {
    /// Luteal phase occupies the last 14 days of the cycle
    const LUTEAL_DAYS: f64 = 14.0;

    /// Progesterone-linked factor in [0, 1], peaking mid-luteal
    pub fn luteal_factor(&self) -> f64 {
        let length = self.cycle_length_days.max(Self::LUTEAL_DAYS + 1.0);
        let day = self.day_of_cycle.rem_euclid(length);
        let ovulation = length - Self::LUTEAL_DAYS;
        if day < ovulation {
            return 0.0;
        }
        (std::f64::consts::PI * (day - ovulation) / Self::LUTEAL_DAYS).sin().max(0.0)
    }
}

/// Usual sleep window, used when a request carries no sleep intervention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitualSleep {
    /// Lights-out, minute of day
    pub onset_min: f64,
    /// Wake time, minute of day
    pub wake_min: f64,
}

impl Default for HabitualSleep {
    fn default() -> Self {
        Self {
            onset_min: 1380.0,
            wake_min: 420.0,
        }
    }
}

impl HabitualSleep {
    /// Is `minute` inside the habitual window? Handles windows crossing midnight.
    pub fn is_asleep(&self, minute: f64) -> bool {
        let t = minute_of_day(minute);
        let on = minute_of_day(self.onset_min);
        let off = minute_of_day(self.wake_min);
        if on <= off {
            t >= on && t < off
        } else {
            t >= on || t < off
        }
    }

    /// Window length in minutes
    pub fn duration_min(&self) -> f64 {
        (self.wake_min - self.onset_min).rem_euclid(MINUTES_PER_DAY)
    }
}

/// Subject parameters as supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subject {
    pub age_years: f64,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub sex: Sex,
    pub cycle: Option<CycleData>,
    /// Positive values delay every circadian rhythm (evening chronotype)
    pub chronotype_shift_min: f64,
    pub habitual_sleep: HabitualSleep,
}

impl Default for Subject {
    fn default() -> Self {
        Self {
            age_years: 35.0,
            weight_kg: 70.0,
            height_cm: 175.0,
            sex: Sex::Male,
            cycle: None,
            chronotype_shift_min: 0.0,
            habitual_sleep: HabitualSleep::default(),
        }
    }
}

impl Subject {
    /// Copy with body scalars forced into physiological ranges
    ///
    /// Non-finite values fall back to the defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Subject::default();
        let bounded = |v: f64, fallback: f64, min: f64, max: f64| {
            if v.is_finite() {
                v.clamp(min, max)
            } else {
                fallback
            }
        };
        Self {
            age_years: bounded(self.age_years, defaults.age_years, 0.0, 120.0),
            weight_kg: bounded(self.weight_kg, defaults.weight_kg, MIN_WEIGHT_KG, 400.0),
            height_cm: bounded(self.height_cm, defaults.height_cm, 50.0, 250.0),
            chronotype_shift_min: bounded(self.chronotype_shift_min, 0.0, -720.0, 720.0),
            ..self.clone()
        }
    }

    /// Lean body mass in kg (Boer 1984)
    pub fn lean_body_mass_kg(&self) -> f64 {
        let s = self.sanitized();
        let lbm = match s.sex {
            Sex::Male => 0.407 * s.weight_kg + 0.267 * s.height_cm - 19.2,
            Sex::Female => 0.252 * s.weight_kg + 0.473 * s.height_cm - 48.3,
        };
        lbm.clamp(0.3 * s.weight_kg, s.weight_kg)
    }

    /// Total body water in litres (Watson 1980)
    pub fn total_body_water_l(&self) -> f64 {
        let s = self.sanitized();
        let tbw = match s.sex {
            Sex::Male => 2.447 - 0.09516 * s.age_years + 0.1074 * s.height_cm + 0.3362 * s.weight_kg,
            Sex::Female => -2.097 + 0.1069 * s.height_cm + 0.2466 * s.weight_kg,
        };
        tbw.clamp(0.3 * s.weight_kg, 0.75 * s.weight_kg)
    }

    /// Luteal GABA-A sensitivity delta (0 without cycle data)
    pub fn gaba_a_sensitivity_delta(&self) -> f64 {
        match (self.sex, self.cycle) {
            (Sex::Female, Some(cycle)) => 0.15 * cycle.luteal_factor(),
            _ => 0.0,
        }
    }
}

/// Derived scalars consumed by PK resolution and the integrator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Physiology {
    pub weight_kg: f64,
    pub lean_body_mass_kg: f64,
    pub total_body_water_l: f64,
    /// Multiplier on saturable (enzymatic) elimination capacity
    pub metabolic_capacity: f64,
    /// Multiplier on first-order elimination rate constants
    pub drug_clearance_scalar: f64,
}

impl Default for Physiology {
    fn default() -> Self {
        Self::derive(&Subject::default())
    }
}

impl Physiology {
    /// Derive scalars from subject parameters
    pub fn derive(subject: &Subject) -> Self {
        let subject = subject.sanitized();
        let weight = subject.weight_kg;
        let lbm = subject.lean_body_mass_kg();

        // Hepatic capacity declines ~0.5%/year after 30 and tracks lean mass
        let age_factor = (1.0 - 0.005 * (subject.age_years - 30.0).max(0.0)).clamp(0.5, 1.2);
        let metabolic_capacity = (age_factor * (lbm / 55.0).powf(0.25)).clamp(0.3, 2.0);

        // Allometric: CL ~ W^0.75, V ~ W, so k = CL/V ~ W^-0.25 (Anderson & Holford 2008)
        let size_factor = (weight / 70.0).powf(-0.25);
        let renal_age = (1.0 - 0.01 * (subject.age_years - 40.0).max(0.0)).max(0.5);
        let drug_clearance_scalar = (size_factor * renal_age).clamp(0.3, 2.0);

        Self {
            weight_kg: weight,
            lean_body_mass_kg: lbm,
            total_body_water_l: subject.total_body_water_l(),
            metabolic_capacity,
            drug_clearance_scalar,
        }
    }

    /// Apply host-supplied overrides
    pub fn with_overrides(mut self, overrides: &PhysiologyOverrides) -> Self {
        if let Some(v) = overrides.metabolic_capacity {
            self.metabolic_capacity = v;
        }
        if let Some(v) = overrides.drug_clearance_scalar {
            self.drug_clearance_scalar = v;
        }
        self
    }
}

/// Optional host overrides of derived scalars
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysiologyOverrides {
    pub metabolic_capacity: Option<f64>,
    pub drug_clearance_scalar: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_subject() {
        let p = Physiology::default();
        // 70 kg, 175 cm male: Boer LBM ~ 56.0 kg, Watson TBW ~ 41.4 L
        assert!((p.lean_body_mass_kg - 56.0).abs() < 0.5, "LBM {}", p.lean_body_mass_kg);
        assert!((p.total_body_water_l - 41.4).abs() < 0.5, "TBW {}", p.total_body_water_l);
        assert!((p.drug_clearance_scalar - 1.0).abs() < 1e-9);
        assert!(p.metabolic_capacity > 0.9 && p.metabolic_capacity < 1.05);
    }

    #[test]
    fn test_habitual_sleep_wraps_midnight() {
        let sleep = HabitualSleep::default();
        assert!(sleep.is_asleep(0.0));
        assert!(sleep.is_asleep(1400.0));
        assert!(!sleep.is_asleep(720.0));
        assert!(sleep.is_asleep(1440.0 + 60.0));
        assert!((sleep.duration_min() - 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_luteal_factor() {
        let follicular = CycleData {
            cycle_length_days: 28.0,
            day_of_cycle: 5.0,
        };
        let mid_luteal = CycleData {
            cycle_length_days: 28.0,
            day_of_cycle: 21.0,
        };
        assert_eq!(follicular.luteal_factor(), 0.0);
        assert!((mid_luteal.luteal_factor() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overrides() {
        let p = Physiology::default().with_overrides(&PhysiologyOverrides {
            metabolic_capacity: Some(0.5),
            drug_clearance_scalar: None,
        });
        assert_eq!(p.metabolic_capacity, 0.5);
        assert!((p.drug_clearance_scalar - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_subject_is_sanitized() {
        let subject = Subject {
            weight_kg: -70.0,
            height_cm: f64::NAN,
            age_years: f64::INFINITY,
            chronotype_shift_min: f64::NAN,
            ..Default::default()
        };
        let clean = subject.sanitized();
        assert_eq!(clean.weight_kg, MIN_WEIGHT_KG);
        assert_eq!(clean.height_cm, 175.0);
        assert_eq!(clean.age_years, 35.0);
        assert_eq!(clean.chronotype_shift_min, 0.0);

        let p = Physiology::derive(&subject);
        assert_eq!(p.weight_kg, MIN_WEIGHT_KG);
        assert!(p.lean_body_mass_kg.is_finite() && p.lean_body_mass_kg > 0.0);
        assert!(p.total_body_water_l.is_finite() && p.total_body_water_l > 0.0);
        assert!(p.drug_clearance_scalar.is_finite());
        assert!(p.metabolic_capacity.is_finite());
    }
}
