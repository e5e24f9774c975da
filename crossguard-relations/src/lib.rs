//! Declarative Relation Models for CrossGuard
//!
//! ## Overview
//!
//! The monitor in `crossguard-core` never knows how variables relate; it asks a
//! [`RelationResolver`](crossguard_core::RelationResolver). This crate provides
//! the standard one: a knowledge base of *function facts* plus a registry of
//! executable relation bodies.
//!
//! ```text
//!   model.json ──parse──→ KnowledgeBase ──resolve(domain, itoms)──→ chains
//!                            │                                        │
//!                            └── RelationRegistry ──relation(name)──→ Substitution
//! ```
//!
//! ## Model Documents
//!
//! A model is a JSON document with two tables:
//!
//! ```json
//! {
//!   "functions": [
//!     { "output": "x", "relation": "r_double", "inputs": ["a"] },
//!     { "output": "a", "relation": "r_same", "inputs": ["b"] }
//!   ],
//!   "implementations": [
//!     { "relation": "r_double", "kind": "scale", "factor": 2.0 },
//!     { "relation": "r_same", "kind": "identity" }
//!   ]
//! }
//! ```
//!
//! A function fact reads "`output` can be computed by `relation` from
//! `inputs`". Implementations bind relation names to built-in bodies (see
//! [`RelationSpec`]). Bodies that need real code are registered from Rust with
//! [`KnowledgeBase::register`].
//!
//! ## Loading Semantics
//!
//! Loading appends: facts from every document stay in declaration order, and a
//! relation implemented twice is *ambiguous* rather than overridden. This keeps
//! model mistakes visible instead of silently picking one body.
//!
//! ## Resolution
//!
//! Resolution is a bounded depth-first search from the domain variable. Every
//! itom measuring a variable is one alternative; every fact producing it whose
//! inputs can all be substituted is more. Inputs multiply out into one chain per
//! combination. See [`KnowledgeBase`] for the exact order.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod knowledge;
pub mod registry;
pub mod relations;

pub use knowledge::{FunctionFact, KnowledgeBase, ModelDocument};
pub use registry::RelationRegistry;
pub use relations::{Implementation, RelationSpec};

/// Result type for knowledge base operations
pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

/// Knowledge-base errors
#[derive(Debug, thiserror_no_std::Error)]
pub enum KnowledgeError {
    /// The model document is not valid JSON or does not match the format
    #[error("Failed to parse model: {0}")]
    Parse(#[from] serde_json::Error),

    /// The model file could not be read
    #[error("Failed to read model: {0}")]
    Io(#[from] std::io::Error),

    /// A function fact breaks a structural rule
    #[error("Invalid function fact: {0}")]
    InvalidFact(String),
}
