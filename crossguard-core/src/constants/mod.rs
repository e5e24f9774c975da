//! Constants for CrossGuard Core
//!
//! Numeric defaults and thresholds used by the monitor, grouped by concern:
//! - **Monitor**: buffer capacities and resolution limits
//! - **Bayes**: parameters of the probabilistic vote
//!
//! Always use these constants instead of magic numbers.

/// Buffer capacities and resolution limits.
pub mod monitor;

/// Parameters of the three-way consistency vote.
pub mod bayes;
