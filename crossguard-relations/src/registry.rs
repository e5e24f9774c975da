//! Relation Registry
//!
//! Maps relation names to executable bodies. A name may collect several bodies
//! when models are appended; lookups then fail as ambiguous instead of picking
//! one.

use std::collections::HashMap;

use crossguard_core::{MonitorError, MonitorResult, Relation};

/// Relation bodies indexed by relation name
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    bodies: HashMap<String, Vec<Relation>>,
}

impl RelationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body for `name`
    pub fn register(&mut self, name: impl Into<String>, relation: Relation) {
        self.bodies.entry(name.into()).or_default().push(relation);
    }

    /// The single body of `name`
    pub fn get(&self, name: &str) -> MonitorResult<Relation> {
        match self.bodies.get(name).map(Vec::as_slice) {
            Some([relation]) => Ok(relation.clone()),
            None | Some([]) => Err(MonitorError::NoImplementation {
                relation: name.to_string(),
            }),
            Some(bodies) => Err(MonitorError::AmbiguousImplementation {
                relation: name.to_string(),
                count: bodies.len(),
            }),
        }
    }

    /// Number of bodies registered for `name`
    pub fn count(&self, name: &str) -> usize {
        self.bodies.get(name).map_or(0, Vec::len)
    }

    /// Whether `name` has any body
    pub fn contains(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Number of distinct relation names
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Forget every body
    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Append all bodies of `other`
    pub fn extend(&mut self, other: RelationRegistry) {
        for (name, relations) in other.bodies {
            self.bodies.entry(name).or_default().extend(relations);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RelationSpec;

    #[test]
    fn lookup_counts_bodies() {
        let mut registry = RelationRegistry::new();
        assert!(matches!(
            registry.get("r1"),
            Err(MonitorError::NoImplementation { .. })
        ));

        registry.register("r1", RelationSpec::Scale { factor: 2.0 }.to_relation());
        assert_eq!(registry.get("r1").unwrap().code(), "2 * v0");

        registry.register("r1", RelationSpec::Identity.to_relation());
        assert_eq!(
            registry.get("r1").unwrap_err(),
            MonitorError::AmbiguousImplementation {
                relation: "r1".to_string(),
                count: 2,
            }
        );
    }

    #[test]
    fn extend_appends() {
        let mut first = RelationRegistry::new();
        first.register("r1", RelationSpec::Identity.to_relation());
        let mut second = RelationRegistry::new();
        second.register("r1", RelationSpec::Sum.to_relation());
        second.register("r2", RelationSpec::Sum.to_relation());

        first.extend(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.count("r1"), 2);
        assert!(first.contains("r2"));

        first.clear();
        assert!(first.is_empty());
    }
}
