//! Validity Windows of Itoms
//!
//! A timestamp states when an itom's value was valid. It can be:
//! - a single instant (degenerate interval)
//! - a window, e.g. the sampling period of an averaged value
//! - absent, meaning the value is always comparable
//!
//! Itoms are only combined or compared when their windows share at least one
//! instant. Timestamps are in seconds (for instance Unix epoch time).

use crate::interval::Interval;

/// Validity window in seconds
pub type Timestamp = Interval;

/// Joint validity of a set of timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Validity {
    /// No timestamp present: always comparable
    Always,
    /// All present timestamps share this window
    Window(Timestamp),
    /// Some present timestamps never overlap
    Never,
}

impl Validity {
    /// Whether the stamps can be combined
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Never)
    }

    /// Timestamp of a value derived under this validity
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Window(window) => Some(*window),
            _ => None,
        }
    }
}

/// Intersect all present timestamps; absent ones are ignored
pub fn validity<'a, I>(stamps: I) -> Validity
where
    I: IntoIterator<Item = Option<&'a Timestamp>>,
{
    let mut joint = Validity::Always;
    for stamp in stamps.into_iter().flatten() {
        joint = match joint {
            Validity::Always => Validity::Window(*stamp),
            Validity::Window(window) => match window.intersection(stamp) {
                Some(common) => Validity::Window(common),
                None => return Validity::Never,
            },
            Validity::Never => return Validity::Never,
        };
    }
    joint
}

/// Whether two (possibly absent) timestamps overlap
pub fn comparable(a: Option<&Timestamp>, b: Option<&Timestamp>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.intersects(b),
        _ => true,
    }
}

/// Timestamp for a value derived from itoms with these stamps
///
/// The joint window when the stamps overlap, absent when none is set, and the
/// hull of all stamps when they never overlapped.
pub fn derived<'a, I>(stamps: I) -> Option<Timestamp>
where
    I: IntoIterator<Item = Option<&'a Timestamp>> + Clone,
{
    match validity(stamps.clone()) {
        Validity::Always => None,
        Validity::Window(window) => Some(window),
        Validity::Never => stamps
            .into_iter()
            .flatten()
            .copied()
            .reduce(|acc, stamp| acc.hull(&stamp)),
    }
}
