//! Data Model of the Comparison Engine
//!
//! Leaves first:
//! - [`Variable`]: the physical quantity an estimate belongs to
//! - [`Itom`] / [`Itoms`]: timestamped samples of a variable
//! - [`Function`]: a relation applied to named inputs
//! - [`Substitution`]: a chain of functions computing one domain value
//!
//! Substitutions are cached by the monitor across ticks; everything else is
//! rebuilt per batch.

mod function;
mod itom;
mod substitution;
mod variable;

pub use function::{Bindings, Function, Relation, RelationFn, Scope};
pub use itom::{Itom, Itoms};
pub use substitution::Substitution;
pub use variable::Variable;
