//! Variables: Identifiers of Physical Quantities
//!
//! A variable names the quantity (domain) an itom measures, e.g. `"speed"` or
//! `"/p2os/pose"`. Display names come from sensor descriptions and may hold any
//! character, so every variable also carries a *codename*: a normalised,
//! code-safe identifier used to bind itoms to relation inputs.
//!
//! ## Normalisation
//!
//! Names that already are identifiers are kept as they are. Others are:
//! 1. lower-cased and trimmed
//! 2. runs of whitespace or `/` become a single `_`
//! 3. all other characters outside `[0-9a-zA-Z_]` are dropped
//! 4. leading characters are dropped until a letter or `_`
//!
//! ```rust
//! use crossguard_core::Variable;
//!
//! assert_eq!(Variable::to_identifier("/p2os/pose"), "_p2os_pose");
//! assert_eq!(Variable::to_identifier("3D Scan (left)"), "d_scan_left");
//! assert_eq!(Variable::to_identifier("speed_x"), "speed_x");
//! ```

use alloc::string::{String, ToString};
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Canonical identifier of a physical quantity
///
/// Two variables are equal iff their display names are equal.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "String", into = "String")
)]
pub struct Variable {
    name: String,
    codename: String,
}

impl Variable {
    /// Create a variable from its display name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let codename = Self::to_identifier(&name);
        Self { name, codename }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Code-safe identifier derived from the name
    pub fn codename(&self) -> &str {
        &self.codename
    }

    /// Rename, recomputing the codename
    pub fn rename(&mut self, name: impl Into<String>) {
        *self = Self::new(name);
    }

    /// Whether `name` refers to this variable (by name or by codename)
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.codename == Self::to_identifier(name)
    }

    /// Convert an arbitrary string to a valid identifier
    pub fn to_identifier(name: &str) -> String {
        if is_identifier(name) {
            return name.to_string();
        }

        let lowered = name.to_lowercase();
        let mut out = String::with_capacity(lowered.len());
        let mut in_separator = false;
        for c in lowered.trim().chars() {
            if c.is_whitespace() || c == '/' {
                if !in_separator {
                    out.push('_');
                    in_separator = true;
                }
                continue;
            }
            in_separator = false;
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
            }
        }

        out.trim_start_matches(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
            .to_string()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl PartialEq<str> for Variable {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Variable {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl Borrow<str> for Variable {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Variable {
    fn from(name: &String) -> Self {
        Self::new(name.as_str())
    }
}

impl From<Variable> for String {
    fn from(variable: Variable) -> Self {
        variable.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
