//! Core comparison engine for CrossGuard
//!
//! Detects faulty measurements by transforming redundant observations into a
//! common domain and checking whether the independently derived estimates agree.
//!
//! Key constraints:
//! - Single-threaded, call-and-return per monitoring tick
//! - Bounded memory (history buffers sized by configuration)
//! - Works without `std` (needs `alloc`)
//!
//! ```no_run
//! use crossguard_core::{Itom, Itoms, Monitor, RelationResolver, Variable};
//!
//! fn check<R: RelationResolver>(model: R) -> crossguard_core::MonitorResult<()> {
//!     let itoms: Itoms = vec![
//!         Itom::new("x1", 10.0, "x"),
//!         Itom::new("a1", 5.0, "a"),
//!     ]
//!     .into_iter()
//!     .collect();
//!
//!     let mut monitor = Monitor::new(model, Variable::new("x"), &itoms)?;
//!     match monitor.monitor(&itoms)? {
//!         None => {}                // redundant estimates agree
//!         Some(_fault) => {}        // inspect `fault.failed_itoms()`
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

// Optional logging; without the `log` feature the arguments are only type-checked
#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ let _ = core::format_args!($($arg)*); }};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ let _ = core::format_args!($($arg)*); }};
}

#[cfg(feature = "log")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{ let _ = core::format_args!($($arg)*); }};
}

pub mod bayes;
pub mod buffer;
pub mod compare;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filter;
pub mod interval;
pub mod model;
pub mod monitor;
pub mod time;
pub mod traits;

// Public API
pub use compare::{Comparison, ExecutionFailure, IntervalComparator, Matrix, Output, PairComparison};
pub use config::{BayesMode, DecisionRule, MonitorConfig};
pub use filter::{MovingAverage, MovingMedian, ScoreFilter};
pub use errors::{MonitorError, MonitorResult, RelationError};
pub use interval::Interval;
pub use model::{Bindings, Function, Itom, Itoms, Relation, Scope, Substitution, Variable};
pub use monitor::{DebugRecord, Fault, Monitor};
pub use time::{Timestamp, Validity};
pub use traits::{Chain, ChainStep, RelationResolver};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
