//! Knowledge Base of Function Facts
//!
//! ## Facts
//!
//! A fact `function(x, r1, [a])` states that variable `x` can be computed from
//! variable `a` with relation `r1`. Facts say nothing about itoms: which
//! variables are *measured* is only known per tick, from the itoms at hand.
//!
//! ## Resolution Order
//!
//! Substituting a variable `v` yields, in this order:
//!
//! 1. one leaf per itom measuring `v`, in the order of the itoms
//! 2. for every fact producing `v`, in declaration order, one chain per
//!    combination of the substitutions of its inputs (first input varies
//!    slowest)
//!
//! Facts whose inputs revisit a variable on the current path are skipped, which
//! breaks cycles such as `a = r(b)`, `b = r'(a)`. The search stops expanding
//! facts after [`KnowledgeBase::max_depth`] nested relations.
//!
//! ```text
//!   facts: x = r1(a)   a = r2(b)   x = r3(d)
//!   itoms: x1:x  a1:a  b1:b  d1:d
//!
//!   x ─┬─ x1
//!      ├─ r1 ─ a ─┬─ a1
//!      │          └─ r2 ─ b ── b1
//!      └─ r3 ─ d ── d1
//!
//!   chains: [x←x1] [a←a1, x=r1(a)] [b←b1, a=r2(b), x=r1(a)] [d←d1, x=r3(d)]
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crossguard_core::constants::monitor::DEFAULT_MAX_CHAIN_DEPTH;
use crossguard_core::{
    Chain, ChainStep, Itoms, MonitorError, MonitorResult, Relation, RelationResolver, Variable,
};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::registry::RelationRegistry;
use crate::relations::Implementation;
use crate::{KnowledgeError, KnowledgeResult};

/// `output = relation(inputs)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionFact {
    /// Variable produced
    pub output: String,
    /// Relation name
    pub relation: String,
    /// Input variables in declaration order
    pub inputs: Vec<String>,
}

impl FunctionFact {
    /// Create a fact
    pub fn new(
        output: impl Into<String>,
        relation: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            output: output.into(),
            relation: relation.into(),
            inputs: inputs.into_iter().map(Into::into).collect(),
        }
    }

    fn validate(&self) -> KnowledgeResult<()> {
        if self.output.is_empty() || self.relation.is_empty() {
            return Err(KnowledgeError::InvalidFact(format!(
                "empty output or relation name in {}",
                self
            )));
        }
        if self.inputs.is_empty() {
            return Err(KnowledgeError::InvalidFact(format!("{} has no inputs", self)));
        }
        if self.inputs.contains(&self.output) {
            return Err(KnowledgeError::InvalidFact(format!(
                "{} consumes its own output",
                self
            )));
        }
        Ok(())
    }

    fn step(&self) -> ChainStep {
        ChainStep::Relation {
            output: Variable::new(self.output.as_str()),
            relation: self.relation.clone(),
            inputs: self.inputs.iter().map(|input| Variable::new(input.as_str())).collect(),
        }
    }
}

impl std::fmt::Display for FunctionFact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function({}, {}, [{}])", self.output, self.relation, self.inputs.join(", "))
    }
}

/// Serialized model: function facts plus built-in implementations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDocument {
    /// Function facts in declaration order
    pub functions: Vec<FunctionFact>,
    /// Relation bodies
    pub implementations: Vec<Implementation>,
}

/// Function facts and relation bodies answering the monitor's questions
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    facts: Vec<FunctionFact>,
    registry: RelationRegistry,
    max_depth: usize,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            facts: Vec::new(),
            registry: RelationRegistry::new(),
            max_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl KnowledgeBase {
    /// Create an empty knowledge base
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON model document
    pub fn from_json(json: &str) -> KnowledgeResult<Self> {
        let mut knowledge = Self::new();
        knowledge.append_json(json)?;
        Ok(knowledge)
    }

    /// Builder: limit the number of nested relations per chain
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nested relations followed during resolution
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Append the model stored at `path`
    pub fn load(&mut self, path: impl AsRef<Path>) -> KnowledgeResult<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        debug!("Loading model from {}", path.display());
        self.append_json(&json)
    }

    /// Append a JSON model document
    pub fn append_json(&mut self, json: &str) -> KnowledgeResult<()> {
        let document: ModelDocument = serde_json::from_str(json)?;
        self.append(document)
    }

    /// Append a parsed model document
    ///
    /// Nothing is added if any fact is invalid.
    pub fn append(&mut self, document: ModelDocument) -> KnowledgeResult<()> {
        for fact in &document.functions {
            fact.validate()?;
        }
        debug!(
            "Appending {} function facts and {} implementations",
            document.functions.len(),
            document.implementations.len()
        );

        self.facts.extend(document.functions);
        for implementation in document.implementations {
            self.registry
                .register(implementation.relation, implementation.spec.to_relation());
        }
        Ok(())
    }

    /// Add one function fact
    pub fn add_function(
        &mut self,
        output: impl Into<String>,
        relation: impl Into<String>,
        inputs: impl IntoIterator<Item = impl Into<String>>,
    ) -> KnowledgeResult<()> {
        let fact = FunctionFact::new(output, relation, inputs);
        fact.validate()?;
        self.facts.push(fact);
        Ok(())
    }

    /// Add a body for `relation`
    pub fn register(&mut self, relation: impl Into<String>, body: Relation) {
        self.registry.register(relation, body);
    }

    /// Append every fact and body of `other`
    pub fn merge(&mut self, other: KnowledgeBase) {
        self.facts.extend(other.facts);
        self.registry.extend(other.registry);
    }

    /// Forget all facts and bodies
    pub fn reset(&mut self) {
        self.facts.clear();
        self.registry.clear();
    }

    /// Function facts in declaration order
    pub fn facts(&self) -> &[FunctionFact] {
        &self.facts
    }

    /// Relation bodies
    pub fn registry(&self) -> &RelationRegistry {
        &self.registry
    }

    /// All chains substituting `variable`; `path` holds the variables above it
    fn substitute(&self, variable: &Variable, itoms: &Itoms, path: &mut Vec<String>) -> Vec<Chain> {
        let mut chains: Vec<Chain> = itoms
            .iter()
            .filter(|itom| itom.variable() == variable)
            .map(|itom| {
                vec![ChainStep::Itom {
                    variable: variable.clone(),
                    itom: itom.name().to_string(),
                }]
            })
            .collect();

        if path.len() >= self.max_depth {
            return chains;
        }

        path.push(variable.name().to_string());
        for fact in self.facts.iter().filter(|fact| fact.output == variable.name()) {
            if fact.inputs.iter().any(|input| path.contains(input)) {
                continue;
            }

            let mut combinations: Vec<Chain> = vec![Vec::new()];
            for input in &fact.inputs {
                let alternatives = self.substitute(&Variable::new(input.as_str()), itoms, path);
                combinations = combinations
                    .iter()
                    .flat_map(|prefix| {
                        alternatives
                            .iter()
                            .filter(move |alternative| !conflicts(prefix, alternative))
                            .map(move |alternative| {
                                let mut chain = prefix.clone();
                                chain.extend(alternative.iter().cloned());
                                chain
                            })
                    })
                    .collect();
                if combinations.is_empty() {
                    break;
                }
            }

            for mut chain in combinations {
                chain.push(fact.step());
                chains.push(chain);
            }
        }
        path.pop();

        chains
    }
}

/// Variable bound by a chain step
fn produced(step: &ChainStep) -> &Variable {
    match step {
        ChainStep::Itom { variable, .. } => variable,
        ChainStep::Relation { output, .. } => output,
    }
}

/// Whether `alternative` rebinds a variable of `prefix` differently
fn conflicts(prefix: &[ChainStep], alternative: &[ChainStep]) -> bool {
    alternative.iter().any(|step| {
        prefix
            .iter()
            .rev()
            .find(|earlier| produced(earlier) == produced(step))
            .is_some_and(|earlier| earlier != step)
    })
}

impl RelationResolver for KnowledgeBase {
    fn resolve(&self, domain: &Variable, itoms: &Itoms) -> MonitorResult<Vec<Chain>> {
        if self.facts.is_empty() {
            return Err(MonitorError::RelationResolution {
                reason: "knowledge base holds no function facts".to_string(),
            });
        }

        let produced = self.facts.iter().any(|fact| fact.output == domain.name());
        let measured = itoms.iter().any(|itom| itom.variable() == domain);
        if !produced && !measured {
            return Err(MonitorError::RelationResolution {
                reason: format!("nothing produces or measures '{}'", domain),
            });
        }

        let chains = self.substitute(domain, itoms, &mut Vec::new());
        let relations: HashSet<&str> = chains
            .iter()
            .flatten()
            .filter_map(|step| match step {
                ChainStep::Relation { relation, .. } => Some(relation.as_str()),
                ChainStep::Itom { .. } => None,
            })
            .collect();
        debug!(
            "Resolved {} chains of '{}' over {} relations from {} itoms",
            chains.len(),
            domain,
            relations.len(),
            itoms.len()
        );
        Ok(chains)
    }

    fn relation(&self, name: &str) -> MonitorResult<Relation> {
        self.registry.get(name)
    }
}
