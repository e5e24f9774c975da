//! Functions: Named Transforms Between Variables
//!
//! A function maps a set of input variables to one output variable using a
//! relation body, e.g. `x = 2 * a`. Relation bodies are plain Rust closures
//! registered by name; the code text stored alongside identifies the body for
//! equality and diagnostics.
//!
//! ## Execution
//!
//! ```text
//! itoms ──bind inputs──→ Bindings ──body──→ value ──→ output itom ──→ itoms'
//!                                    ↕
//!                                  Scope
//! ```
//!
//! The output itom is named after the output variable and stamped with the joint
//! validity window of the inputs, so results carry both value and time.
//!
//! ## Wrapped vs. Inline Bodies
//!
//! A *wrapped* body runs in a fresh [`Scope`] on every call. An *inline* body
//! (`wrap = false`) runs in a scope that outlives the call: the function's own
//! scope when executed alone, the substitution's shared scope when executed as
//! part of a chain. Stateful relations (e.g. exponential smoothing that reads its
//! previous output) must be inline. Several functions of one chain share that
//! scope, so a stateful body keys its locals by [`Bindings::output`].

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::errors::{MonitorError, MonitorResult, RelationError};
use crate::interval::Interval;
use crate::model::{Itom, Itoms, Variable};
use crate::time;

/// Signature of a relation body
pub type RelationFn =
    dyn Fn(&Bindings<'_>, &mut Scope) -> Result<Interval, RelationError> + Send + Sync;

/// Executable relation body with its identifying code text
#[derive(Clone)]
pub struct Relation {
    code: String,
    wrap: bool,
    body: Arc<RelationFn>,
}

impl Relation {
    /// Create a wrapped (stateless) relation
    pub fn new<F>(code: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Bindings<'_>, &mut Scope) -> Result<Interval, RelationError> + Send + Sync + 'static,
    {
        Self {
            code: code.into(),
            wrap: true,
            body: Arc::new(body),
        }
    }

    /// Create an inline relation whose scope persists across calls
    pub fn stateful<F>(code: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Bindings<'_>, &mut Scope) -> Result<Interval, RelationError> + Send + Sync + 'static,
    {
        Self {
            wrap: false,
            ..Self::new(code, body)
        }
    }

    /// Copy the single input unchanged
    pub fn identity() -> Self {
        Self::stateful("identity", |inputs: &Bindings<'_>, _: &mut Scope| {
            inputs.get(0).ok_or(RelationError::Unbound {
                name: "0".to_string(),
            })
        })
    }

    /// Code text identifying the body
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Default wrap flag for functions using this relation
    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Run the body
    pub fn apply(&self, inputs: &Bindings<'_>, scope: &mut Scope) -> Result<Interval, RelationError> {
        (self.body)(inputs, scope)
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("code", &self.code)
            .field("wrap", &self.wrap)
            .finish_non_exhaustive()
    }
}

/// Local variables of relation bodies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    locals: BTreeMap<String, Interval>,
}

impl Scope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a local
    pub fn get(&self, name: &str) -> Option<Interval> {
        self.locals.get(name).copied()
    }

    /// Write a local, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Interval>) -> Option<Interval> {
        self.locals.insert(name.into(), value.into())
    }

    /// Remove a local
    pub fn remove(&mut self, name: &str) -> Option<Interval> {
        self.locals.remove(name)
    }

    /// Drop all locals
    pub fn clear(&mut self) {
        self.locals.clear();
    }

    /// Number of locals
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }
}

/// Input itoms of one function call, in declaration order
#[derive(Debug)]
pub struct Bindings<'a> {
    inputs: Vec<(&'a Variable, &'a Itom)>,
    output: Option<&'a Variable>,
}

impl<'a> Bindings<'a> {
    /// Bind declared inputs to itoms
    pub fn new(inputs: Vec<(&'a Variable, &'a Itom)>) -> Self {
        Self { inputs, output: None }
    }

    /// Builder: variable the call produces
    pub fn with_output(mut self, output: &'a Variable) -> Self {
        self.output = Some(output);
        self
    }

    /// Variable the call produces, if known
    pub fn output(&self) -> Option<&'a Variable> {
        self.output
    }

    /// Value bound to an input variable (by name or codename)
    pub fn value(&self, name: &str) -> Result<Interval, RelationError> {
        self.itom(name)
            .map(Itom::value)
            .ok_or_else(|| RelationError::Unbound {
                name: name.to_string(),
            })
    }

    /// Itom bound to an input variable
    pub fn itom(&self, name: &str) -> Option<&'a Itom> {
        self.inputs
            .iter()
            .find(|(variable, _)| variable.matches(name))
            .map(|(_, itom)| *itom)
    }

    /// Value of the input at `index`
    pub fn get(&self, index: usize) -> Option<Interval> {
        self.inputs.get(index).map(|(_, itom)| itom.value())
    }

    /// All input values in declaration order
    pub fn values(&self) -> impl Iterator<Item = Interval> + '_ {
        self.inputs.iter().map(|(_, itom)| itom.value())
    }

    /// Number of bound inputs
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Check if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Named transform from input variables to one output variable
#[derive(Debug, Clone)]
pub struct Function {
    output: Variable,
    inputs: Vec<Variable>,
    relation: Relation,
    name: String,
    wrap: bool,
    scope: Scope,
}

impl Function {
    /// Create a function; its name defaults to the relation code
    ///
    /// Fails if the output variable is also an input.
    pub fn new(
        output: impl Into<Variable>,
        inputs: impl IntoIterator<Item = impl Into<Variable>>,
        relation: Relation,
    ) -> MonitorResult<Self> {
        let output = output.into();
        let inputs: Vec<Variable> = inputs.into_iter().map(Into::into).collect();

        if inputs.contains(&output) {
            return Err(MonitorError::InvalidFunction {
                reason: alloc::format!("output '{}' is also an input", output),
            });
        }

        Ok(Self {
            output,
            inputs,
            name: relation.code().to_string(),
            wrap: relation.wraps(),
            relation,
            scope: Scope::new(),
        })
    }

    /// Builder: diagnostic name (e.g. the relation name)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: override the wrap flag of the relation
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Output variable
    pub fn output_variable(&self) -> &Variable {
        &self.output
    }

    /// Input variables in declaration order
    pub fn input_variables(&self) -> &[Variable] {
        &self.inputs
    }

    /// Diagnostic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Code text of the relation body
    pub fn code(&self) -> &str {
        self.relation.code()
    }

    /// Whether the body runs isolated
    pub fn wrap(&self) -> bool {
        self.wrap
    }

    /// Locals kept by an inline body between standalone calls
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Declared inputs without a matching itom
    pub fn missing_inputs(&self, itoms: &Itoms) -> Vec<String> {
        self.inputs
            .iter()
            .filter(|variable| itoms.find(variable).is_none())
            .map(|variable| variable.name().to_string())
            .collect()
    }

    /// Execute standalone; inline bodies keep their locals in this function
    pub fn execute(&mut self, itoms: Itoms) -> MonitorResult<Itoms> {
        let mut scope = core::mem::take(&mut self.scope);
        let result = self.execute_in(itoms, &mut scope);
        self.scope = scope;
        result
    }

    /// Execute with a caller-owned scope for inline bodies
    pub fn execute_in(&self, mut itoms: Itoms, scope: &mut Scope) -> MonitorResult<Itoms> {
        let missing = self.missing_inputs(&itoms);
        if !missing.is_empty() {
            return Err(MonitorError::MissingInputs {
                function: self.name.clone(),
                missing,
            });
        }

        let output = {
            let bound: Vec<(&Variable, &Itom)> = self
                .inputs
                .iter()
                .filter_map(|variable| itoms.find(variable).map(|itom| (variable, itom)))
                .collect();
            let bindings = Bindings::new(bound).with_output(&self.output);

            let value = if self.wrap {
                self.relation.apply(&bindings, &mut Scope::new())
            } else {
                self.relation.apply(&bindings, scope)
            }
            .map_err(|source| MonitorError::Execution {
                function: self.name.clone(),
                source,
            })?;

            let timestamp = time::derived(bindings.inputs.iter().map(|(_, itom)| itom.timestamp()));
            let mut output = Itom::new(self.output.name(), value, self.output.clone());
            if let Some(timestamp) = timestamp {
                output.set_timestamp(timestamp);
            }
            output
        };

        itoms.insert(output);
        Ok(itoms)
    }

    /// Canonical statement used for equality: `out = code(sorted inputs)`
    pub fn canonical(&self) -> String {
        let mut inputs: Vec<&str> = self.inputs.iter().map(Variable::name).collect();
        inputs.sort_unstable();
        inputs.dedup();
        alloc::format!("{} = {{{}}}({})", self.output, self.relation.code(), inputs.join(", "))
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Function {}

impl Hash for Function {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}(", self.output, self.name)?;
        for (i, input) in self.inputs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", input)?;
        }
        f.write_str(")")
    }
}
