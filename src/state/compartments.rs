//! PK compartment keys and slot layout.
//!
//! A compartment belongs to one intervention *instance*, identified by
//! `(id, start_minute)`. An id may recur (a daily dose across a multi-day
//! grid); each occurrence owns its own slots, so non-overlapping instances
//! never share or overwrite a derivative.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of one intervention instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceKey {
    pub id: String,
    pub start_minute: f64,
}

impl InstanceKey {
    pub fn new(id: &str, start_minute: f64) -> Self {
        Self {
            id: id.to_string(),
            start_minute,
        }
    }
}

impl PartialEq for InstanceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for InstanceKey {}

impl PartialOrd for InstanceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InstanceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id
            .cmp(&other.id)
            .then_with(|| self.start_minute.total_cmp(&other.start_minute))
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.start_minute)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compartment {
    /// Unabsorbed amount (mg)
    Depot,
    /// Plasma concentration (mg/L)
    Central,
    /// Tissue concentration (mg/L)
    Peripheral,
    /// Activity engagement (index)
    Effect,
}

impl Compartment {
    pub const ALL: [Compartment; 4] = [
        Compartment::Depot,
        Compartment::Central,
        Compartment::Peripheral,
        Compartment::Effect,
    ];

    #[inline]
    fn offset(self) -> usize {
        self as usize
    }
}

/// Full key of one compartment scalar
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompartmentKey {
    pub instance: InstanceKey,
    pub compartment: Compartment,
}

/// Maps compartment keys to slots of the flat compartment vector
///
/// Every instance owns `Compartment::ALL.len()` contiguous slots.
#[derive(Debug, Clone, Default)]
pub struct CompartmentLayout {
    instances: Vec<InstanceKey>,
    index: BTreeMap<InstanceKey, usize>,
}

impl CompartmentLayout {
    const SLOTS: usize = 4;

    /// Register an instance. Returns `None` (and keeps the first) if the
    /// key is already present.
    pub fn insert(&mut self, key: InstanceKey) -> Option<usize> {
        if self.index.contains_key(&key) {
            return None;
        }
        let i = self.instances.len();
        self.index.insert(key.clone(), i);
        self.instances.push(key);
        Some(i)
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Length of the flat compartment vector
    pub fn slot_count(&self) -> usize {
        self.instances.len() * Self::SLOTS
    }

    pub fn instances(&self) -> &[InstanceKey] {
        &self.instances
    }

    pub fn instance_index(&self, key: &InstanceKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Slot of a compartment of the instance at `instance_index`
    #[inline]
    pub fn slot(instance_index: usize, compartment: Compartment) -> usize {
        instance_index * Self::SLOTS + compartment.offset()
    }

    /// Slot of a full compartment key
    pub fn slot_of(&self, key: &CompartmentKey) -> Option<usize> {
        self.instance_index(&key.instance)
            .map(|i| Self::slot(i, key.compartment))
    }

    /// All keys in slot order
    pub fn keys(&self) -> impl Iterator<Item = CompartmentKey> + '_ {
        self.instances.iter().flat_map(|instance| {
            Compartment::ALL.iter().map(move |&compartment| CompartmentKey {
                instance: instance.clone(),
                compartment,
            })
        })
    }
}
