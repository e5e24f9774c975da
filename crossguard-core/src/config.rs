//! Monitor Configuration
//!
//! All buffer and window sizes of a monitor come from here; nothing is sized
//! from incoming data.
//!
//! ```rust
//! use crossguard_core::{BayesMode, DecisionRule, MonitorConfig};
//!
//! let config = MonitorConfig::default()
//!     .with_buffer_size(2)
//!     .with_median_window(3)
//!     .with_decision(DecisionRule::TotalScore)
//!     .with_bayes(BayesMode::Soft);
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::monitor::{AGREEMENT_SCORE, DEFAULT_BUFFER_SIZE, MIN_FILTER_WINDOW};
use crate::errors::{MonitorError, MonitorResult};

/// When aggregate scores indicate a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum DecisionRule {
    /// Fault iff the sum of all scores exceeds the agreement score
    #[default]
    TotalScore,
    /// Fault iff every score exceeds the agreement score
    ///
    /// Tolerates small disagreements that only some paths show.
    MinimumScore,
}

impl DecisionRule {
    /// Whether `scores` indicate a fault
    pub fn is_fault(&self, scores: &[f64]) -> bool {
        if scores.is_empty() {
            return false;
        }
        match self {
            Self::TotalScore => scores.iter().sum::<f64>() > AGREEMENT_SCORE,
            Self::MinimumScore => scores.iter().copied().fold(f64::INFINITY, f64::min) > AGREEMENT_SCORE,
        }
    }

    /// Index of the highest score, first on ties
    pub fn select(&self, scores: &[f64]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (index, score) in scores.iter().enumerate() {
            match best {
                Some(current) if scores[current] >= *score => {}
                _ => best = Some(index),
            }
        }
        best
    }
}

/// Evidence model of the probabilistic vote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum BayesMode {
    /// A pair matches iff its error is zero
    Boolean,
    /// Match probability grows with overlap and falls with error
    Soft,
}

/// Monitor settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct MonitorConfig {
    /// Delay-compensation buffer capacity in ticks
    pub buffer_size: usize,
    /// Moving-average window, if any
    pub average_window: Option<usize>,
    /// Moving-median window, if any (applied after the average)
    pub median_window: Option<usize>,
    /// Fault decision on the filtered scores
    pub decision: DecisionRule,
    /// Probabilistic vote overriding the decision
    pub bayes: Option<BayesMode>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            average_window: None,
            median_window: None,
            decision: DecisionRule::default(),
            bayes: None,
        }
    }
}

impl MonitorConfig {
    /// Set the delay-compensation buffer capacity
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Enable the moving average
    pub fn with_average_window(mut self, window: usize) -> Self {
        self.average_window = Some(window);
        self
    }

    /// Enable the moving median
    pub fn with_median_window(mut self, window: usize) -> Self {
        self.median_window = Some(window);
        self
    }

    /// Set the decision rule
    pub fn with_decision(mut self, decision: DecisionRule) -> Self {
        self.decision = decision;
        self
    }

    /// Enable the probabilistic vote
    pub fn with_bayes(mut self, mode: BayesMode) -> Self {
        self.bayes = Some(mode);
        self
    }

    /// Check all sizes
    pub fn validate(&self) -> MonitorResult<()> {
        if self.buffer_size == 0 {
            return Err(MonitorError::InvalidConfig {
                reason: "buffer_size must be at least 1",
            });
        }
        if self.average_window.is_some_and(|window| window < MIN_FILTER_WINDOW) {
            return Err(MonitorError::InvalidConfig {
                reason: "average_window must be at least 1",
            });
        }
        if self.median_window.is_some_and(|window| window < MIN_FILTER_WINDOW) {
            return Err(MonitorError::InvalidConfig {
                reason: "median_window must be at least 1",
            });
        }
        Ok(())
    }
}
