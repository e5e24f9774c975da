//! Redundancy Monitor
//!
//! ## Overview
//!
//! A monitor watches one domain variable. Each tick it receives a batch of
//! itoms, computes the domain value along every substitution the relation
//! resolver knows, and reports the substitution whose estimate disagrees most.
//!
//! ```text
//!   Itoms ──→ [resolve?] ──→ IntervalComparator ──→ scores
//!                                                     │
//!                            average ──→ median ──→ decision ──→ [vote] ──→ Option<Fault>
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//!            resolve ok
//!   ┌──────┐ ─────────→ ┌───────┐
//!   │ Cold │            │ Armed │ ──┐ same itom names: compare
//!   └──────┘ ←───────── └───────┘ ←─┘
//!       ↑  ↺ resolve    itom names changed / update() / set_config()
//!       │    failed
//! ```
//!
//! Every transition to cold clears the delay buffer and the filter windows:
//! scores computed under different substitution sets are never mixed.
//!
//! ## Error Handling
//!
//! - `RelationResolution` during construction leaves the monitor cold;
//!   during `monitor()` it is returned and the next tick retries
//! - `NoImplementation` / `AmbiguousImplementation` are returned as-is
//! - Failing relation bodies only drop their substitution from the tick

use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::bayes;
use crate::compare::{ExecutionFailure, IntervalComparator, Output};
use crate::config::MonitorConfig;
use crate::errors::{MonitorError, MonitorResult};
use crate::filter::{MovingAverage, MovingMedian, ScoreFilter};
use crate::model::{Itoms, Substitution, Variable};
use crate::traits::RelationResolver;

/// Substitution reported as faulty
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    /// Index in resolution order
    pub index: usize,
    /// The suspicious substitution
    pub substitution: Substitution,
    /// Its leaf inputs (itom names)
    pub input_variables: Vec<Variable>,
    /// Filtered aggregate error
    pub score: f64,
    /// Failure probability, if the vote decided
    pub probability: Option<f64>,
}

impl Fault {
    fn new(index: usize, substitution: &Substitution, score: f64, probability: Option<f64>) -> Self {
        Self {
            index,
            substitution: substitution.clone(),
            input_variables: substitution.input_variables().to_vec(),
            score,
            probability,
        }
    }

    /// Names of the itoms the suspicious substitution was computed from
    pub fn failed_itoms(&self) -> Vec<&str> {
        self.input_variables.iter().map(Variable::name).collect()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fault in [{}] (score {})", self.substitution, self.score)?;
        if let Some(probability) = self.probability {
            write!(f, " p={:.2}", probability)?;
        }
        Ok(())
    }
}

/// Per-tick diagnostics handed to the debug callback
#[derive(Debug)]
pub struct DebugRecord<'a> {
    /// Input batch
    pub itoms: &'a Itoms,
    /// Every executed combination
    pub outputs: &'a [Output],
    /// Aggregate error per substitution
    pub scores: &'a [f64],
    /// Scores after smoothing
    pub filtered: &'a [f64],
    /// Decision of this tick
    pub fault: Option<&'a Fault>,
    /// Substitutions that dropped out
    pub failures: &'a [ExecutionFailure],
}

type DebugCallback = Box<dyn FnMut(&DebugRecord<'_>)>;

/// Fault detector for one domain variable
pub struct Monitor<R: RelationResolver> {
    model: R,
    domain: Variable,
    config: MonitorConfig,
    substitutions: Option<Vec<Substitution>>,
    last_itoms: BTreeSet<String>,
    comparator: IntervalComparator,
    average: Option<MovingAverage>,
    median: Option<MovingMedian>,
    debug_callback: Option<DebugCallback>,
}

impl<R: RelationResolver> Monitor<R> {
    /// Create a monitor with default configuration
    pub fn new(model: R, domain: impl Into<Variable>, itoms: &Itoms) -> MonitorResult<Self> {
        Self::new_with_config(model, domain, itoms, MonitorConfig::default())
    }

    /// Create a monitor, resolving substitutions if `itoms` is non-empty
    pub fn new_with_config(
        model: R,
        domain: impl Into<Variable>,
        itoms: &Itoms,
        config: MonitorConfig,
    ) -> MonitorResult<Self> {
        config.validate()?;

        let mut monitor = Self {
            model,
            domain: domain.into(),
            comparator: IntervalComparator::new(config.buffer_size),
            average: config.average_window.map(MovingAverage::new),
            median: config.median_window.map(MovingMedian::new),
            config,
            substitutions: None,
            last_itoms: BTreeSet::new(),
            debug_callback: None,
        };

        if !itoms.is_empty() {
            match monitor.rearm(itoms) {
                Ok(()) => {}
                Err(MonitorError::RelationResolution { reason }) => {
                    log_warn!("Monitor of '{}' starts cold: {}", monitor.domain, reason);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(monitor)
    }

    /// Replace knowledge base and domain; the monitor goes cold
    pub fn update(&mut self, model: R, domain: impl Into<Variable>) {
        self.model = model;
        self.domain = domain.into();
        self.go_cold();
    }

    /// Replace the configuration; the monitor goes cold
    pub fn set_config(&mut self, config: MonitorConfig) -> MonitorResult<()> {
        config.validate()?;
        self.average = config.average_window.map(MovingAverage::new);
        self.median = config.median_window.map(MovingMedian::new);
        self.config = config;
        self.go_cold();
        Ok(())
    }

    /// Install a per-tick diagnostics hook
    pub fn set_debug_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&DebugRecord<'_>) + 'static,
    {
        self.debug_callback = Some(Box::new(callback));
    }

    /// Remove the diagnostics hook
    pub fn clear_debug_callback(&mut self) {
        self.debug_callback = None;
    }

    /// Cached substitutions; `None` while cold
    pub fn substitutions(&self) -> Option<&[Substitution]> {
        self.substitutions.as_deref()
    }

    /// Monitored variable
    pub fn domain(&self) -> &Variable {
        &self.domain
    }

    /// Relation knowledge base
    pub fn model(&self) -> &R {
        &self.model
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Batches in the delay-compensation buffer
    pub fn buffered(&self) -> usize {
        self.comparator.buffered()
    }

    /// Whether substitutions are cached
    pub fn is_armed(&self) -> bool {
        self.substitutions.is_some()
    }

    /// Check one batch of itoms
    ///
    /// Returns the most suspicious substitution, or `None` if all redundant
    /// estimates agree.
    pub fn monitor(&mut self, itoms: &Itoms) -> MonitorResult<Option<Fault>> {
        if !self.is_armed() || itoms.name_set() != self.last_itoms {
            if let Err(err) = self.rearm(itoms) {
                if let MonitorError::RelationResolution { reason } = &err {
                    log_warn!("No substitutions for '{}' yet: {}", self.domain, reason);
                }
                return Err(err);
            }
        }

        let substitutions = match self.substitutions.as_mut() {
            Some(substitutions) => substitutions,
            None => return Ok(None),
        };

        let comparison = self.comparator.compare(itoms, substitutions);
        let scores = comparison.scores();

        let mut filtered = scores.clone();
        if let Some(average) = self.average.as_mut() {
            filtered = average.apply(&filtered);
        }
        if let Some(median) = self.median.as_mut() {
            filtered = median.apply(&filtered);
        }

        let decision = self.config.decision;
        let mut fault = if decision.is_fault(&filtered) {
            decision
                .select(&filtered)
                .map(|index| Fault::new(index, &substitutions[index], filtered[index], None))
        } else {
            None
        };

        if let Some(mode) = self.config.bayes {
            if let Some(probabilities) = bayes::vote(&comparison, mode) {
                fault = bayes::select(&probabilities).map(|index| {
                    Fault::new(
                        index,
                        &substitutions[index],
                        filtered.get(index).copied().unwrap_or_default(),
                        Some(probabilities[index]),
                    )
                });
            }
        }

        log_trace!(
            "Tick of '{}': scores {:?}, filtered {:?}, fault {:?}",
            self.domain,
            scores,
            filtered,
            fault.as_ref().map(|fault| fault.index)
        );

        if let Some(callback) = self.debug_callback.as_mut() {
            callback(&DebugRecord {
                itoms,
                outputs: &comparison.outputs,
                scores: &scores,
                filtered: &filtered,
                fault: fault.as_ref(),
                failures: &comparison.failures,
            });
        }

        Ok(fault)
    }

    /// Drop cached substitutions and all history
    fn go_cold(&mut self) {
        self.substitutions = None;
        self.last_itoms.clear();
        self.comparator.reset(self.config.buffer_size);
        self.reset_filters();
    }

    fn reset_filters(&mut self) {
        if let Some(average) = self.average.as_mut() {
            average.reset();
        }
        if let Some(median) = self.median.as_mut() {
            median.reset();
        }
    }

    /// Resolve substitutions for the available itoms
    fn rearm(&mut self, itoms: &Itoms) -> MonitorResult<()> {
        self.go_cold();
        self.last_itoms = itoms.name_set();

        let chains = self.model.resolve(&self.domain, itoms)?;
        let mut substitutions: Vec<Substitution> = Vec::with_capacity(chains.len());
        for chain in &chains {
            let substitution = Substitution::from_chain(&self.domain, chain, &self.model)?;
            if !substitutions.contains(&substitution) {
                substitutions.push(substitution);
            }
        }

        log_debug!(
            "Resolved {} substitutions of '{}' from {} itoms",
            substitutions.len(),
            self.domain,
            itoms.len()
        );
        self.substitutions = Some(substitutions);
        Ok(())
    }
}

impl<R: RelationResolver + fmt::Debug> fmt::Debug for Monitor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("model", &self.model)
            .field("domain", &self.domain)
            .field("config", &self.config)
            .field("substitutions", &self.substitutions.as_ref().map(Vec::len))
            .field("buffered", &self.comparator.buffered())
            .finish_non_exhaustive()
    }
}
