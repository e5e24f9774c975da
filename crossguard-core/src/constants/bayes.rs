//! Probabilistic Vote Parameters
//!
//! The vote converts pairwise interval agreement into match probabilities and
//! feeds them through a fixed three-node consistency table.

/// Match probability of a pair without evidence.
///
/// Also the value encoding "undecidable" between two candidates.
pub const UNDECIDED_PROBABILITY: f64 = 0.5;

/// Weight of scaled error and scaled overlap in a soft match.
///
/// Used as: `p = 0.5 - 0.4 * error + 0.4 * overlap`, which keeps a single
/// piece of evidence within [0.1, 0.9].
pub const SOFT_MATCH_GAIN: f64 = 0.4;

/// Failure probability a substitution must exceed to be reported.
///
/// Just below 0.5 so that a two-way tie between suspects still reports
/// the first of them.
pub const FAULT_PROBABILITY_THRESHOLD: f64 = 0.49;

/// Number of substitutions taking part in one vote.
pub const VOTE_SIZE: usize = 3;
