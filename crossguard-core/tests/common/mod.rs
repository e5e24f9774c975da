//! Common fixtures for integration tests
//!
//! This module provides:
//! - A table-driven relation resolver that counts its `resolve` calls
//! - Chain builders for direct and scaled redundant paths
//! - Batch builders for scalar and timestamped itoms

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use crossguard_core::{
    Bindings, Chain, ChainStep, Interval, Itom, Itoms, MonitorError, MonitorResult, Relation,
    RelationError, RelationResolver, Scope, Variable,
};

/// Resolver answering from fixed chains
///
/// The call counter is shared, so tests keep a handle after moving the
/// resolver into a monitor.
#[derive(Clone, Default)]
pub struct TableResolver {
    chains: Vec<Chain>,
    relations: Vec<(String, Relation)>,
    calls: Rc<Cell<usize>>,
}

impl TableResolver {
    /// Register `relation` as `output = factor * input`
    pub fn with_scale(mut self, relation: &str, factor: f64) -> Self {
        let body = Relation::new(
            format!("{} * v", factor),
            move |inputs: &Bindings<'_>, _: &mut Scope| {
                inputs
                    .get(0)
                    .map(|value| value * factor)
                    .ok_or(RelationError::Unbound { name: "0".to_string() })
            },
        );
        self.relations.push((relation.to_string(), body));
        self
    }

    /// Register a body that always fails
    pub fn with_failing(mut self, relation: &str) -> Self {
        let body = Relation::new("fail", |_: &Bindings<'_>, _: &mut Scope| {
            Err(RelationError::Undefined { reason: "broken sensor model" })
        });
        self.relations.push((relation.to_string(), body));
        self
    }

    /// Add a chain to every answer
    pub fn with_chain(mut self, chain: Chain) -> Self {
        self.chains.push(chain);
        self
    }

    /// Handle on the number of `resolve` calls
    pub fn calls(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.calls)
    }
}

impl RelationResolver for TableResolver {
    /// Answers only with chains whose leaf itoms are all available
    fn resolve(&self, _domain: &Variable, itoms: &Itoms) -> MonitorResult<Vec<Chain>> {
        self.calls.set(self.calls.get() + 1);
        if self.chains.is_empty() {
            return Err(MonitorError::RelationResolution {
                reason: "empty relation table".to_string(),
            });
        }
        Ok(self
            .chains
            .iter()
            .filter(|chain| {
                chain.iter().all(|step| match step {
                    ChainStep::Itom { itom, .. } => itoms.contains(itom),
                    ChainStep::Relation { .. } => true,
                })
            })
            .cloned()
            .collect())
    }

    fn relation(&self, name: &str) -> MonitorResult<Relation> {
        let bodies: Vec<&Relation> = self
            .relations
            .iter()
            .filter(|(relation, _)| relation == name)
            .map(|(_, body)| body)
            .collect();
        match bodies.as_slice() {
            [body] => Ok((*body).clone()),
            [] => Err(MonitorError::NoImplementation {
                relation: name.to_string(),
            }),
            _ => Err(MonitorError::AmbiguousImplementation {
                relation: name.to_string(),
                count: bodies.len(),
            }),
        }
    }
}

/// `domain <- itom`
pub fn direct(domain: &str, itom: &str) -> Chain {
    vec![ChainStep::Itom {
        variable: Variable::new(domain),
        itom: itom.to_string(),
    }]
}

/// `domain = relation(variable <- itom)`
pub fn via(domain: &str, relation: &str, variable: &str, itom: &str) -> Chain {
    vec![
        ChainStep::Itom {
            variable: Variable::new(variable),
            itom: itom.to_string(),
        },
        ChainStep::Relation {
            output: Variable::new(domain),
            relation: relation.to_string(),
            inputs: vec![Variable::new(variable)],
        },
    ]
}

/// Relations and chains of the six-path `x` model:
/// `x = 2a` (a1, b1, c1 measure a) and `x = d / 2`
pub fn six_path_model() -> TableResolver {
    TableResolver::default()
        .with_scale("r_double", 2.0)
        .with_scale("r_half", 0.5)
        .with_chain(direct("x", "x1"))
        .with_chain(direct("x", "x2"))
        .with_chain(via("x", "r_double", "a", "a1"))
        .with_chain(via("x", "r_double", "a", "b1"))
        .with_chain(via("x", "r_double", "a", "c1"))
        .with_chain(via("x", "r_half", "d", "d1"))
}

/// Batch of untimed itoms `(name, value, variable)`
pub fn batch<V: Into<Interval> + Copy>(items: &[(&str, V, &str)]) -> Itoms {
    items
        .iter()
        .map(|(name, value, variable)| Itom::new(*name, *value, *variable))
        .collect()
}

/// Batch of itoms stamped with `timestamp`
pub fn stamped<V: Into<Interval> + Copy>(items: &[(&str, V, &str, f64)]) -> Itoms {
    items
        .iter()
        .map(|(name, value, variable, timestamp)| {
            Itom::new(*name, *value, *variable).with_timestamp(*timestamp)
        })
        .collect()
}
