//! Relation Resolver Interface
//!
//! The monitor does not know any relations itself. A resolver answers two
//! questions about its knowledge base:
//!
//! 1. Which chains compute `domain` from the itoms available now?
//! 2. Which executable body implements a relation name?
//!
//! Chains are postfix programs: every step's inputs are produced by earlier
//! steps or bound directly to an itom.
//!
//! ## Implementation Guidelines
//!
//! - Return `MonitorError::RelationResolution` while the knowledge base cannot
//!   answer; the monitor stays cold and asks again on the next tick.
//! - Return `NoImplementation` / `AmbiguousImplementation` from
//!   [`RelationResolver::relation`] for zero or several bodies; never pick one.
//! - Keep the chain order stable for identical input: it decides tie-breaking
//!   between equally suspicious substitutions.

use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::MonitorResult;
use crate::model::{Itoms, Relation, Variable};

/// One step of a substitution chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStep {
    /// Bind `variable` to the measured itom named `itom`
    Itom {
        /// Variable the itom measures
        variable: Variable,
        /// Name of the itom
        itom: String,
    },
    /// Apply `relation` to previously bound inputs
    Relation {
        /// Variable produced by the step
        output: Variable,
        /// Relation name, looked up through [`RelationResolver::relation`]
        relation: String,
        /// Inputs in declaration order
        inputs: Vec<Variable>,
    },
}

/// Postfix sequence of steps computing one domain value
pub type Chain = Vec<ChainStep>;

/// Source of substitution chains and relation bodies
pub trait RelationResolver {
    /// Enumerate chains computing `domain` from the available itoms
    fn resolve(&self, domain: &Variable, itoms: &Itoms) -> MonitorResult<Vec<Chain>>;

    /// Executable body of a relation
    fn relation(&self, name: &str) -> MonitorResult<Relation>;
}

impl<R: RelationResolver + ?Sized> RelationResolver for &R {
    fn resolve(&self, domain: &Variable, itoms: &Itoms) -> MonitorResult<Vec<Chain>> {
        (**self).resolve(domain, itoms)
    }

    fn relation(&self, name: &str) -> MonitorResult<Relation> {
        (**self).relation(name)
    }
}
