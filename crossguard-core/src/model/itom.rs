//! Itoms: Timestamped Measurement Samples
//!
//! An itom ("information atom") is the unit exchanged between components: a
//! named value sample of a variable, optionally stamped with the window in which
//! it was valid.
//!
//! ## Value/Timestamp Coupling
//!
//! Setting a new value resets the timestamp to absent. A stale timestamp must
//! never describe a fresh value, so always set the value first, then the
//! timestamp:
//!
//! ```rust
//! use crossguard_core::Itom;
//!
//! let mut speed = Itom::new("speed1", 3.0, "speed").with_timestamp(10.0);
//! speed.set_value(3.2);
//! assert_eq!(speed.timestamp(), None);
//! speed.set_timestamp(11.0);
//! ```
//!
//! ## Collections
//!
//! [`Itoms`] is an insertion-ordered collection keyed by itom name. Its
//! availability view groups the itoms per measured variable (one variable may be
//! measured by many itoms) and is computed on demand, never cached.

use alloc::collections::BTreeMap;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::interval::Interval;
use crate::model::Variable;
use crate::time::Timestamp;

/// Timestamped, variable-tagged measurement sample
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Itom {
    name: String,
    value: Interval,
    timestamp: Option<Timestamp>,
    variable: Variable,
}

impl Itom {
    /// Create an untimed itom
    pub fn new(
        name: impl Into<String>,
        value: impl Into<Interval>,
        variable: impl Into<Variable>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp: None,
            variable: variable.into(),
        }
    }

    /// Builder: stamp the itom
    pub fn with_timestamp(mut self, timestamp: impl Into<Timestamp>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Unique sample name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Measured value
    pub fn value(&self) -> Interval {
        self.value
    }

    /// Validity window, `None` if always comparable
    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    /// Measured variable
    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Replace the value; the timestamp is reset to absent
    pub fn set_value(&mut self, value: impl Into<Interval>) {
        self.value = value.into();
        self.timestamp = None;
    }

    /// Set the validity window
    pub fn set_timestamp(&mut self, timestamp: impl Into<Timestamp>) {
        self.timestamp = Some(timestamp.into());
    }

    /// Remove the validity window
    pub fn clear_timestamp(&mut self) {
        self.timestamp = None;
    }
}

impl fmt::Display for Itom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Ordered collection of itoms keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Itoms {
    items: Vec<Itom>,
}

impl Itoms {
    /// Create an empty collection
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert an itom, replacing (in place) one with the same name
    ///
    /// Returns the replaced itom.
    pub fn insert(&mut self, itom: Itom) -> Option<Itom> {
        match self.position(itom.name()) {
            Some(idx) => Some(core::mem::replace(&mut self.items[idx], itom)),
            None => {
                self.items.push(itom);
                None
            }
        }
    }

    /// Get an itom by name
    pub fn get(&self, name: &str) -> Option<&Itom> {
        self.items.iter().find(|itom| itom.name == name)
    }

    /// Get an itom by name for modification
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Itom> {
        self.items.iter_mut().find(|itom| itom.name == name)
    }

    /// Find the itom bound to a variable: exact name first, then codename
    pub fn find(&self, variable: &Variable) -> Option<&Itom> {
        self.get(variable.name()).or_else(|| {
            self.items
                .iter()
                .find(|itom| Variable::to_identifier(&itom.name) == variable.codename())
        })
    }

    /// Whether an itom with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Remove an itom by name
    pub fn remove(&mut self, name: &str) -> Option<Itom> {
        self.position(name).map(|idx| self.items.remove(idx))
    }

    /// Number of itoms
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> core::slice::Iter<'_, Itom> {
        self.items.iter()
    }

    /// Itom names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|itom| itom.name())
    }

    /// Set of itom names (identifies availability changes)
    pub fn name_set(&self) -> BTreeSet<String> {
        self.items.iter().map(|itom| itom.name.clone()).collect()
    }

    /// Variable -> itoms measuring it
    pub fn availability(&self) -> BTreeMap<Variable, Vec<&Itom>> {
        let mut availability: BTreeMap<Variable, Vec<&Itom>> = BTreeMap::new();
        for itom in &self.items {
            availability
                .entry(itom.variable.clone())
                .or_default()
                .push(itom);
        }
        availability
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|itom| itom.name == name)
    }
}

impl Index<&str> for Itoms {
    type Output = Itom;

    fn index(&self, name: &str) -> &Itom {
        match self.get(name) {
            Some(itom) => itom,
            None => panic!("no itom named '{}'", name),
        }
    }
}

impl FromIterator<Itom> for Itoms {
    fn from_iter<I: IntoIterator<Item = Itom>>(iter: I) -> Self {
        let mut itoms = Self::new();
        itoms.extend(iter);
        itoms
    }
}

impl Extend<Itom> for Itoms {
    fn extend<I: IntoIterator<Item = Itom>>(&mut self, iter: I) {
        for itom in iter {
            self.insert(itom);
        }
    }
}

impl IntoIterator for Itoms {
    type Item = Itom;
    type IntoIter = alloc::vec::IntoIter<Itom>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Itoms {
    type Item = &'a Itom;
    type IntoIter = core::slice::Iter<'a, Itom>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
