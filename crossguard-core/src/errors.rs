//! Error Types for Redundancy Monitoring
//!
//! ## Design Philosophy
//!
//! Errors in CrossGuard separate *caller mistakes* from *knowledge gaps*:
//!
//! 1. **Caller Errors**: Executing a Function or Substitution without all of its
//!    bindings (`MissingInputs`) or building an invalid Function. These are never
//!    retried and surface immediately.
//!
//! 2. **Recoverable Knowledge Gaps**: The relation resolver cannot answer yet
//!    (`RelationResolution`). The Monitor stays *cold* and retries on the next tick,
//!    since itom availability typically stabilises after start-up.
//!
//! 3. **Model Defects**: A relation has no body (`NoImplementation`) or more than
//!    one (`AmbiguousImplementation`). Fatal for that resolution attempt.
//!
//! 4. **Relation Failures**: A relation body could not produce a value
//!    (`Execution`). The affected substitution drops out of the current tick;
//!    the failure is logged and handed to the debug hook.
//!
//! Names and reasons are owned strings: itom names arrive at runtime and the
//! monitor already depends on `alloc`.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use crossguard_core::MonitorError;
//!
//! fn on_tick_error(err: MonitorError) -> bool {
//!     match err {
//!         MonitorError::RelationResolution { .. } => {
//!             // Knowledge base not ready - try again next tick
//!             true
//!         }
//!         MonitorError::NoImplementation { .. }
//!         | MonitorError::AmbiguousImplementation { .. } => {
//!             // Fix the model before monitoring again
//!             false
//!         }
//!         _ => false,
//!     }
//! }
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use thiserror_no_std::Error;

/// Result type for monitoring operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors raised while resolving, assembling or executing substitutions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// A Function or Substitution was executed without all required itoms
    #[error("Missing inputs for '{function}': {missing:?}")]
    MissingInputs {
        /// Function (or substitution) that was executed
        function: String,
        /// Input variable names that had no matching itom
        missing: Vec<String>,
    },

    /// A Function or Substitution violates its structural rules
    #[error("Invalid function: {reason}")]
    InvalidFunction {
        /// What is wrong with it
        reason: String,
    },

    /// The relation resolver cannot answer (yet)
    #[error("Relation resolution failed: {reason}")]
    RelationResolution {
        /// Reason reported by the resolver
        reason: String,
    },

    /// A relation has no executable body
    #[error("No implementation for relation '{relation}'")]
    NoImplementation {
        /// Relation name
        relation: String,
    },

    /// A relation has more than one executable body
    #[error("Ambiguous implementation for relation '{relation}' ({count} bodies)")]
    AmbiguousImplementation {
        /// Relation name
        relation: String,
        /// Number of bodies found
        count: usize,
    },

    /// A relation body failed to produce a value
    #[error("Execution of '{function}' failed: {source}")]
    Execution {
        /// Function whose body failed
        function: String,
        /// Failure reported by the body
        source: RelationError,
    },

    /// Monitor configuration out of range
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Offending setting
        reason: &'static str,
    },
}

impl MonitorError {
    /// Whether retrying on a later tick can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RelationResolution { .. } | Self::Execution { .. })
    }
}

/// Failures raised inside a relation body
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelationError {
    /// The body asked for an input it is not bound to
    #[error("Unbound input '{name}'")]
    Unbound {
        /// Requested variable name
        name: String,
    },

    /// The body cannot produce a value for these inputs
    #[error("Undefined result: {reason}")]
    Undefined {
        /// Why no value exists
        reason: &'static str,
    },
}
