//! Fixed-size value containers indexed by signal or pool.
//!
//! Stored as plain arrays so a full snapshot is `Copy` and integration stages
//! can combine states without allocation.

use super::{AuxPool, Signal};

/// One value per signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalValues {
    values: [f64; Signal::COUNT],
}

impl SignalValues {
    /// All signals at the same value
    pub fn filled(value: f64) -> Self {
        Self {
            values: [value; Signal::COUNT],
        }
    }

    /// Every signal at its reference level
    pub fn references() -> Self {
        Self::from_fn(|s| s.spec().reference)
    }

    /// Build from a per-signal function
    pub fn from_fn<F: FnMut(Signal) -> f64>(mut f: F) -> Self {
        let mut values = [0.0; Signal::COUNT];
        for signal in Signal::ALL {
            values[signal.index()] = f(signal);
        }
        Self { values }
    }

    #[inline]
    pub fn get(&self, signal: Signal) -> f64 {
        self.values[signal.index()]
    }

    #[inline]
    pub fn set(&mut self, signal: Signal, value: f64) {
        self.values[signal.index()] = value;
    }

    #[inline]
    pub fn add(&mut self, signal: Signal, delta: f64) {
        self.values[signal.index()] += delta;
    }

    /// Iterate `(signal, value)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (Signal, f64)> + '_ {
        Signal::ALL.iter().map(move |&s| (s, self.values[s.index()]))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl Default for SignalValues {
    fn default() -> Self {
        Self::filled(0.0)
    }
}

/// One value per auxiliary pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxValues {
    values: [f64; AuxPool::COUNT],
}

impl AuxValues {
    pub fn filled(value: f64) -> Self {
        Self {
            values: [value; AuxPool::COUNT],
        }
    }

    /// All pools at nominal capacity
    pub fn nominal() -> Self {
        Self::filled(1.0)
    }

    pub fn from_fn<F: FnMut(AuxPool) -> f64>(mut f: F) -> Self {
        let mut values = [0.0; AuxPool::COUNT];
        for pool in AuxPool::ALL {
            values[pool.index()] = f(pool);
        }
        Self { values }
    }

    #[inline]
    pub fn get(&self, pool: AuxPool) -> f64 {
        self.values[pool.index()]
    }

    #[inline]
    pub fn set(&mut self, pool: AuxPool, value: f64) {
        self.values[pool.index()] = value;
    }

    #[inline]
    pub fn add(&mut self, pool: AuxPool, delta: f64) {
        self.values[pool.index()] += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (AuxPool, f64)> + '_ {
        AuxPool::ALL.iter().map(move |&p| (p, self.values[p.index()]))
    }
}

impl Default for AuxValues {
    fn default() -> Self {
        Self::filled(0.0)
    }
}
