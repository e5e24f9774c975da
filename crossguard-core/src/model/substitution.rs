//! Substitutions: Executable Chains of Functions
//!
//! A substitution computes one target variable from leaf inputs by applying
//! functions in postfix order. The relation resolver produces them from
//! expression trees by visiting inputs before the function that consumes them,
//! which guarantees every intermediate variable exists before it is read:
//!
//! ```text
//! x = r2(v, t)          chain (postfix):
//!   ├── v = r1(a1)        v <- identity(a1)  ... leaf binding
//!   │     └── a1          v = r1(a)
//!   └── t <- t1           t <- identity(t1)
//!                         x = r2(v, t)
//! input variables: {a1, t1}
//! ```
//!
//! Leaf bindings copy a measured itom (value and timestamp) into the variable of
//! the chain, so the input variables of a substitution are itom names.
//!
//! Substitutions compare and hash by their canonical statement list, so two
//! chains built from different resolver answers but computing the same thing
//! are equal.

use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::errors::{MonitorError, MonitorResult};
use crate::model::{Function, Itoms, Relation, Scope, Variable};
use crate::traits::{Chain, ChainStep, RelationResolver};

/// Ordered composition of functions computing one variable
#[derive(Debug, Clone)]
pub struct Substitution {
    output: Variable,
    functions: Vec<Function>,
    inputs: Vec<Variable>,
    scope: Scope,
}

impl Substitution {
    /// Create a substitution for `output` from functions in execution order
    ///
    /// An empty function list means the output is measured directly.
    pub fn new(output: impl Into<Variable>, functions: Vec<Function>) -> MonitorResult<Self> {
        let output = output.into();
        if let Some(last) = functions.last() {
            if last.output_variable() != &output {
                return Err(MonitorError::InvalidFunction {
                    reason: alloc::format!(
                        "chain ends in '{}' instead of '{}'",
                        last.output_variable(),
                        output
                    ),
                });
            }
        }

        let inputs = collect_inputs(&output, &functions);
        Ok(Self {
            output,
            functions,
            inputs,
            scope: Scope::new(),
        })
    }

    /// Assemble a resolver chain into a substitution of `domain`
    pub fn from_chain<R>(domain: &Variable, chain: &Chain, resolver: &R) -> MonitorResult<Self>
    where
        R: RelationResolver + ?Sized,
    {
        let mut functions = Vec::with_capacity(chain.len());
        for step in chain {
            match step {
                ChainStep::Itom { variable, itom } => {
                    // An itom named like its variable needs no copy
                    if variable.name() == itom {
                        continue;
                    }
                    let function = Function::new(variable.clone(), [itom.as_str()], Relation::identity())?
                        .with_name("equals");
                    functions.push(function);
                }
                ChainStep::Relation { output, relation, inputs } => {
                    let body = resolver.relation(relation)?;
                    let function = Function::new(output.clone(), inputs.iter().cloned(), body)?
                        .with_name(relation.as_str());
                    functions.push(function);
                }
            }
        }
        Self::new(domain.clone(), functions)
    }

    /// Variable computed by the last function
    pub fn output_variable(&self) -> &Variable {
        &self.output
    }

    /// Leaf variables: consumed but never produced earlier in the chain
    pub fn input_variables(&self) -> &[Variable] {
        &self.inputs
    }

    /// Functions in execution order
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Number of functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True if the output is measured directly
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Verify inputs, then apply every function in order
    ///
    /// Returns the grown itom collection; read the result at
    /// `output_variable()`.
    pub fn execute(&mut self, itoms: Itoms) -> MonitorResult<Itoms> {
        let missing: Vec<String> = self
            .inputs
            .iter()
            .filter(|variable| itoms.find(variable).is_none())
            .map(|variable| variable.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(MonitorError::MissingInputs {
                function: self.to_string(),
                missing,
            });
        }

        let mut itoms = itoms;
        for function in &self.functions {
            itoms = function.execute_in(itoms, &mut self.scope)?;
        }
        Ok(itoms)
    }

    /// Sum over `others` of this substitution's inputs not used by each other one
    pub fn diversity(&self, others: &[Substitution]) -> usize {
        others
            .iter()
            .map(|other| {
                let shared: BTreeSet<&Variable> = other.inputs.iter().collect();
                self.inputs.iter().filter(|input| !shared.contains(input)).count()
            })
            .sum()
    }

    /// Canonical statement list used for equality and hashing
    pub fn canonical(&self) -> String {
        if self.functions.is_empty() {
            return alloc::format!("{} = {}", self.output, self.output);
        }
        self.functions
            .iter()
            .map(Function::canonical)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn collect_inputs(output: &Variable, functions: &[Function]) -> Vec<Variable> {
    if functions.is_empty() {
        return alloc::vec![output.clone()];
    }

    let mut produced: BTreeSet<&Variable> = BTreeSet::new();
    let mut inputs: Vec<Variable> = Vec::new();
    for function in functions {
        for input in function.input_variables() {
            if !produced.contains(input) && !inputs.contains(input) {
                inputs.push(input.clone());
            }
        }
        produced.insert(function.output_variable());
    }
    inputs
}

impl PartialEq for Substitution {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Substitution {}

impl Hash for Substitution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.functions.is_empty() {
            return write!(f, "{}", self.output);
        }
        for (i, function) in self.functions.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;
    use crate::model::{Bindings, Itom};
    use alloc::vec;

    fn add() -> Function {
        let body = Relation::new("a = b + c", |inputs: &Bindings<'_>, _: &mut Scope| {
            Ok(inputs.value("b")? + inputs.value("c")?)
        });
        Function::new("a", ["b", "c"], body).unwrap().with_name("add")
    }

    fn mult() -> Function {
        let body = Relation::new("d = 2 * a", |inputs: &Bindings<'_>, _: &mut Scope| {
            Ok(inputs.value("a")? * 2.0)
        });
        Function::new("d", ["a"], body).unwrap().with_name("mult")
    }

    fn names(variables: &[Variable]) -> BTreeSet<&str> {
        variables.iter().map(Variable::name).collect()
    }

    #[test]
    fn input_variables_are_leaves() {
        let s = Substitution::new("a", vec![add()]).unwrap();
        assert_eq!(names(s.input_variables()), ["b", "c"].into_iter().collect());

        let s = Substitution::new("d", vec![add(), mult()]).unwrap();
        assert_eq!(names(s.input_variables()), ["b", "c"].into_iter().collect());

        // Bad order: 'a' is consumed before it is produced
        let s = Substitution::new("a", vec![mult(), add()]).unwrap();
        assert_eq!(names(s.input_variables()), ["a", "b", "c"].into_iter().collect());
    }

    #[test]
    fn chain_must_end_in_output() {
        assert!(Substitution::new("x", vec![add()]).is_err());
    }

    #[test]
    fn execute_threads_itoms() {
        let mut s = Substitution::new("d", vec![add(), mult()]).unwrap();
        let itoms: Itoms = vec![Itom::new("b", 1.0, "b"), Itom::new("c", 2.0, "c")]
            .into_iter()
            .collect();

        let result = s.execute(itoms).unwrap();
        assert_eq!(result["d"].value(), Interval::point(6.0));
        assert_eq!(result["a"].value(), Interval::point(3.0));
    }

    #[test]
    fn inline_bodies_see_their_output_in_the_shared_scope() {
        let counter = Relation::stateful("n = n + 1", |inputs: &Bindings<'_>, scope: &mut Scope| {
            let key = inputs.output().map(Variable::name).unwrap_or("n");
            let next = scope.get(key).unwrap_or_default() + 1.0;
            scope.set(key, next);
            Ok(next)
        });
        let mut s = Substitution::new(
            "m",
            vec![
                Function::new("n", ["b"], counter.clone()).unwrap(),
                Function::new("m", ["n"], counter).unwrap(),
            ],
        )
        .unwrap();

        for expected in [1.0, 2.0, 3.0] {
            let itoms: Itoms = vec![Itom::new("b", 0.0, "b")].into_iter().collect();
            let result = s.execute(itoms).unwrap();
            assert_eq!(result["n"].value(), Interval::point(expected));
            assert_eq!(result["m"].value(), Interval::point(expected));
        }
    }

    #[test]
    fn execute_requires_all_leaves() {
        let mut s = Substitution::new("d", vec![add(), mult()]).unwrap();
        let itoms: Itoms = vec![Itom::new("b", 1.0, "b")].into_iter().collect();
        match s.execute(itoms) {
            Err(MonitorError::MissingInputs { missing, .. }) => assert_eq!(missing, vec!["c".to_string()]),
            other => panic!("expected missing inputs, got {:?}", other),
        }
    }

    #[test]
    fn directly_measured_output() {
        let mut s = Substitution::new("x", Vec::new()).unwrap();
        assert!(s.is_empty());
        assert_eq!(names(s.input_variables()), ["x"].into_iter().collect());

        let itoms: Itoms = vec![Itom::new("x", 4.0, "x")].into_iter().collect();
        assert_eq!(s.execute(itoms).unwrap()["x"].value(), Interval::point(4.0));
    }

    #[test]
    fn diversity_counts_unshared_inputs() {
        let s1 = Substitution::new("a", vec![add()]).unwrap();
        let other_add = Function::new("a", ["b", "e"], Relation::new("a = b + e", |inputs: &Bindings<'_>, _: &mut Scope| {
            Ok(inputs.value("b")? + inputs.value("e")?)
        }))
        .unwrap();
        let s2 = Substitution::new("a", vec![other_add]).unwrap();
        let s3 = Substitution::new("a", Vec::new()).unwrap();

        // vs s2: 'c' unshared; vs s3: 'b' and 'c' unshared
        assert_eq!(s1.diversity(&[s2.clone(), s3]), 3);
        assert_eq!(s1.diversity(&[s1.clone()]), 0);
    }

    #[test]
    fn equal_chains_compare_equal() {
        let s1 = Substitution::new("d", vec![add(), mult()]).unwrap();
        let renamed = add().with_name("plus");
        let s2 = Substitution::new("d", vec![renamed, mult()]).unwrap();
        assert_eq!(s1, s2);
        assert_ne!(s1, Substitution::new("a", vec![add()]).unwrap());
        assert_eq!(s1.to_string(), "a = add(b, c); d = mult(a)");
    }
}
