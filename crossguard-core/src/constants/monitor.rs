//! Monitor Defaults
//!
//! Capacities of the bounded buffers owned by a monitor. All of them are
//! configuration values, never derived from incoming data.

/// Default capacity of the delay-compensation buffer (in ticks).
///
/// One tick means "compare only what arrived together". Raise it to the
/// largest input latency (in ticks) of any redundant path.
pub const DEFAULT_BUFFER_SIZE: usize = 1;

/// Smallest usable smoothing window.
///
/// A window of one sample passes scores through unchanged.
pub const MIN_FILTER_WINDOW: usize = 1;

/// Default maximum depth of a resolved substitution chain.
///
/// Bounds the depth-first search of relation resolvers over cyclic
/// relation graphs.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// Aggregate error at or below which a substitution counts as agreeing.
pub const AGREEMENT_SCORE: f64 = 0.0;
