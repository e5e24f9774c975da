//! Common fixtures for knowledge-base integration tests
//!
//! This module provides:
//! - The redundant speed model as a JSON document
//! - Batch builders for scalar and interval itoms

#![allow(dead_code)]

use crossguard_core::{Interval, Itom, Itoms};
use crossguard_relations::KnowledgeBase;

/// `x` measured directly, as `2a`, and as `d / 2`; `a` also via `b` and `c`
pub const SIMPLE_MODEL: &str = r#"{
    "functions": [
        { "output": "x", "relation": "r1", "inputs": ["a"] },
        { "output": "a", "relation": "r2", "inputs": ["b"] },
        { "output": "a", "relation": "r3", "inputs": ["c"] },
        { "output": "x", "relation": "r4", "inputs": ["d"] }
    ],
    "implementations": [
        { "relation": "r1", "kind": "scale", "factor": 2.0 },
        { "relation": "r2", "kind": "identity" },
        { "relation": "r3", "kind": "identity" },
        { "relation": "r4", "kind": "scale", "factor": 0.5 }
    ]
}"#;

/// Electrical power `p = u * i`, with `u` also derived from two cell voltages
pub const POWER_MODEL: &str = r#"{
    "functions": [
        { "output": "p", "relation": "power", "inputs": ["u", "i"] },
        { "output": "u", "relation": "series", "inputs": ["u_cell1", "u_cell2"] }
    ],
    "implementations": [
        { "relation": "power", "kind": "product" },
        { "relation": "series", "kind": "sum" }
    ]
}"#;

/// Knowledge base of [`SIMPLE_MODEL`]
pub fn simple_model() -> KnowledgeBase {
    KnowledgeBase::from_json(SIMPLE_MODEL).expect("valid model")
}

/// Batch of untimed itoms `(name, value, variable)`
pub fn batch<V: Into<Interval> + Copy>(items: &[(&str, V, &str)]) -> Itoms {
    items
        .iter()
        .map(|(name, value, variable)| Itom::new(*name, *value, *variable))
        .collect()
}

/// Scalar readings of x (twice), a, b, c and a bad d
pub fn scalar_readings() -> Itoms {
    batch(&[
        ("x1", 10.0, "x"),
        ("x2", 10.01, "x"),
        ("a1", 5.0, "a"),
        ("b1", 5.1, "b"),
        ("c1", 4.95, "c"),
        ("d1", 19.0, "d"),
    ])
}
