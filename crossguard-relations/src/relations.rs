//! Built-in Relation Bodies
//!
//! Most sensor models are affine: a unit conversion, a calibration offset, a
//! sum of partial flows. These are available by name in model documents so a
//! model can be written without Rust code:
//!
//! | kind         | body                                      | inputs |
//! |--------------|-------------------------------------------|--------|
//! | `identity`   | `v0`                                      | 1      |
//! | `scale`      | `factor * v0`                             | 1      |
//! | `offset`     | `v0 + offset`                             | 1      |
//! | `linear`     | `factor * v0 + offset`                    | 1      |
//! | `sum`        | `v0 + v1 + ...`                           | ≥ 1    |
//! | `difference` | `v0 - v1 - ...`                           | ≥ 1    |
//! | `product`    | `v0 * v1 * ...`                           | ≥ 1    |
//! | `quotient`   | `v0 / v1 / ...`                           | ≥ 1    |
//! | `mean`       | `(v0 + v1 + ...) / n`                     | ≥ 1    |
//! | `ema`        | `alpha * v0 + (1 - alpha) * previous`     | 1      |
//!
//! All bodies use interval arithmetic, so uncertainty propagates through every
//! chain. `ema` is the only stateful body: it keeps its previous output in the
//! scope under `"ema:<output>"` and therefore runs unwrapped. Keying by the
//! output variable keeps two smoothing steps of one chain apart.

use crossguard_core::{Bindings, Interval, Relation, RelationError, Scope};
use serde::{Deserialize, Serialize};

/// Scope key prefix of the smoothed value kept by `ema`
const EMA_STATE: &str = "ema";

/// Built-in relation body, tagged by `kind` in model documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationSpec {
    /// Copy the input
    Identity,
    /// Multiply by a constant
    Scale {
        /// Multiplier
        factor: f64,
    },
    /// Add a constant
    Offset {
        /// Summand
        offset: f64,
    },
    /// Affine map
    Linear {
        /// Multiplier
        factor: f64,
        /// Summand applied after scaling
        offset: f64,
    },
    /// Sum of all inputs
    Sum,
    /// First input minus all others
    Difference,
    /// Product of all inputs
    Product,
    /// First input divided by all others
    Quotient,
    /// Arithmetic mean of all inputs
    Mean,
    /// Exponential moving average of the single input
    Ema {
        /// Weight of the newest sample, in (0, 1]
        alpha: f64,
    },
}

/// One row of the implementation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// Relation name used by function facts
    pub relation: String,
    /// Body implementing it
    #[serde(flatten)]
    pub spec: RelationSpec,
}

impl RelationSpec {
    /// Code text identifying the body
    ///
    /// Two relations with the same code are interchangeable, which lets the
    /// monitor drop duplicate substitutions.
    pub fn code(&self) -> String {
        match self {
            Self::Identity => "v0".to_string(),
            Self::Scale { factor } => format!("{} * v0", factor),
            Self::Offset { offset } => format!("v0 + {}", offset),
            Self::Linear { factor, offset } => format!("{} * v0 + {}", factor, offset),
            Self::Sum => "sum(v)".to_string(),
            Self::Difference => "v0 - sum(v[1..])".to_string(),
            Self::Product => "product(v)".to_string(),
            Self::Quotient => "v0 / product(v[1..])".to_string(),
            Self::Mean => "mean(v)".to_string(),
            Self::Ema { alpha } => format!("ema({}, v0)", alpha),
        }
    }

    /// Build the executable body
    pub fn to_relation(&self) -> Relation {
        let code = self.code();
        match *self {
            Self::Identity => Relation::new(code, |inputs: &Bindings<'_>, _: &mut Scope| first(inputs)),
            Self::Scale { factor } => Relation::new(code, move |inputs: &Bindings<'_>, _: &mut Scope| {
                Ok(first(inputs)? * factor)
            }),
            Self::Offset { offset } => Relation::new(code, move |inputs: &Bindings<'_>, _: &mut Scope| {
                Ok(first(inputs)? + offset)
            }),
            Self::Linear { factor, offset } => {
                Relation::new(code, move |inputs: &Bindings<'_>, _: &mut Scope| {
                    Ok(first(inputs)? * factor + offset)
                })
            }
            Self::Sum => Relation::new(code, |inputs: &Bindings<'_>, _: &mut Scope| {
                fold(inputs, |acc, value| Ok(acc + value))
            }),
            Self::Difference => Relation::new(code, |inputs: &Bindings<'_>, _: &mut Scope| {
                fold(inputs, |acc, value| Ok(acc - value))
            }),
            Self::Product => Relation::new(code, |inputs: &Bindings<'_>, _: &mut Scope| {
                fold(inputs, |acc, value| Ok(acc * value))
            }),
            Self::Quotient => Relation::new(code, |inputs: &Bindings<'_>, _: &mut Scope| {
                fold(inputs, |acc, value| {
                    if value.contains(0.0) {
                        return Err(RelationError::Undefined {
                            reason: "divisor interval contains zero",
                        });
                    }
                    Ok(acc / value)
                })
            }),
            Self::Mean => Relation::new(code, |inputs: &Bindings<'_>, _: &mut Scope| {
                let total = fold(inputs, |acc, value| Ok(acc + value))?;
                Ok(total / inputs.len() as f64)
            }),
            Self::Ema { alpha } => Relation::stateful(code, move |inputs: &Bindings<'_>, scope: &mut Scope| {
                let sample = first(inputs)?;
                let key = match inputs.output() {
                    Some(output) => format!("{}:{}", EMA_STATE, output.name()),
                    None => EMA_STATE.to_string(),
                };
                let smoothed = match scope.get(&key) {
                    Some(previous) => alpha * sample + (1.0 - alpha) * previous,
                    None => sample,
                };
                scope.set(key, smoothed);
                Ok(smoothed)
            }),
        }
    }
}

fn first(inputs: &Bindings<'_>) -> Result<Interval, RelationError> {
    inputs.get(0).ok_or(RelationError::Undefined {
        reason: "relation needs at least one input",
    })
}

/// Left fold over all inputs, starting at the first
fn fold<F>(inputs: &Bindings<'_>, mut step: F) -> Result<Interval, RelationError>
where
    F: FnMut(Interval, Interval) -> Result<Interval, RelationError>,
{
    let mut values = inputs.values();
    let mut acc = values.next().ok_or(RelationError::Undefined {
        reason: "relation needs at least one input",
    })?;
    for value in values {
        acc = step(acc, value)?;
    }
    Ok(acc)
}
