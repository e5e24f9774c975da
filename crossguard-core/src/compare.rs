//! Interval Comparator
//!
//! ## Overview
//!
//! The comparator evaluates every substitution of the domain against the
//! buffered itom batches and measures how far the resulting estimates are apart.
//! Values are intervals, so "agreement" is intersection rather than equality:
//!
//! ```text
//!   s0: x1            [9.0 ──────── 11.0]
//!   s1: 2 * a1              [9.8 ── 10.2]          error 0, overlap 0.4
//!   s2: d1 / 2                                [12.0 ── 12.5]
//!                                   gap = 1.0 ─┘               error 1.0 vs s0
//! ```
//!
//! ## Algorithm per Tick
//!
//! 1. Push the batch into the delay-compensation buffer
//! 2. For each substitution, group buffered itoms by input variable and
//!    enumerate the Cartesian product (one itom per input)
//! 3. Keep combinations holding at least one itom of the newest batch whose
//!    timestamps share an instant
//! 4. Execute the substitution on every remaining combination
//! 5. Compare these fresh outputs with each other and with the outputs cached
//!    from the buffered batches, where timestamps overlap
//! 6. Fill the N×N error/overlap matrices with the best agreement reached
//!
//! Each combination therefore runs exactly once while it stays buffered, so
//! stateful bodies advance once per tick whatever the buffer size. Pairs of two
//! cached outputs were judged on an earlier tick and are not repeated, so an
//! old agreement cannot mask a fresh disagreement.
//!
//! Outputs of one substitution are never compared with each other.
//!
//! ## Failures
//!
//! A substitution whose body fails drops out of the tick. The failure is logged
//! and reported in [`Comparison::failures`]; the other substitutions are still
//! compared.

use alloc::vec;
use alloc::vec::Vec;

use crate::buffer::HistoryBuffer;
use crate::errors::MonitorError;
use crate::model::{Itom, Itoms, Substitution};
use crate::time;

/// Square matrix indexed by substitution
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    size: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create an `size × size` matrix of zeros
    pub fn zeros(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entry at (row, column); 0 outside the matrix
    pub fn get(&self, row: usize, column: usize) -> f64 {
        if row < self.size && column < self.size {
            self.data[row * self.size + column]
        } else {
            0.0
        }
    }

    /// Set entry at (row, column); ignored outside the matrix
    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        if row < self.size && column < self.size {
            self.data[row * self.size + column] = value;
        }
    }

    /// Sum of one row
    pub fn row_sum(&self, row: usize) -> f64 {
        if row >= self.size {
            return 0.0;
        }
        self.data[row * self.size..(row + 1) * self.size].iter().sum()
    }

    /// Sums of all rows
    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.size).map(|row| self.row_sum(row)).collect()
    }
}

/// Result of one substitution executed on one input combination
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    /// Index of the substitution in resolution order
    pub substitution: usize,
    /// Computed domain itom (value and derived timestamp)
    pub itom: Itom,
}

/// Comparison of two outputs of different substitutions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairComparison {
    /// Substitution of the first output
    pub first: usize,
    /// Substitution of the second output
    pub second: usize,
    /// Gap between the values
    pub error: f64,
    /// Width of the common part of the values
    pub overlap: f64,
    /// Sum of both half-widths
    pub uncertainty: f64,
}

/// Substitution that could not be executed this tick
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionFailure {
    /// Index of the substitution in resolution order
    pub substitution: usize,
    /// Cause
    pub error: MonitorError,
}

/// Everything the comparator learned in one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Outputs executed this tick, in substitution order
    pub outputs: Vec<Output>,
    /// Comparable output pairs involving at least one fresh output
    pub pairs: Vec<PairComparison>,
    /// Minimum error per substitution pair
    pub error: Matrix,
    /// Maximum overlap per substitution pair
    pub overlap: Matrix,
    /// Substitutions that dropped out
    pub failures: Vec<ExecutionFailure>,
}

impl Comparison {
    /// Aggregate error per substitution (row sums of the error matrix)
    pub fn scores(&self) -> Vec<f64> {
        self.error.row_sums()
    }

    /// Number of compared substitutions
    pub fn len(&self) -> usize {
        self.error.size()
    }

    /// True if there was nothing to compare
    pub fn is_empty(&self) -> bool {
        self.error.size() == 0
    }
}

/// Pairwise interval comparison with delay compensation
#[derive(Debug, Clone, Default)]
pub struct IntervalComparator {
    history: HistoryBuffer<Itoms>,
    // Outputs computed on each tick, aligned with `history`
    outputs: HistoryBuffer<Vec<Output>>,
}

/// Buffered itom, flagged if it arrived with the newest batch
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    itom: &'a Itom,
    fresh: bool,
}

impl IntervalComparator {
    /// Create a comparator remembering `buffer_size` batches
    pub fn new(buffer_size: usize) -> Self {
        Self {
            history: HistoryBuffer::new(buffer_size),
            outputs: HistoryBuffer::new(buffer_size),
        }
    }

    /// Drop the history and resize the buffer
    pub fn reset(&mut self, buffer_size: usize) {
        self.history.resize(buffer_size);
        self.outputs.resize(buffer_size);
    }

    /// Number of buffered batches
    pub fn buffered(&self) -> usize {
        self.history.len()
    }

    /// Buffer capacity in batches
    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Buffer `itoms` and compare all substitutions
    pub fn compare(&mut self, itoms: &Itoms, substitutions: &mut [Substitution]) -> Comparison {
        self.history.push(itoms.clone());
        let newest = self.history.len().saturating_sub(1);
        let candidates: Vec<Candidate<'_>> = self
            .history
            .iter()
            .enumerate()
            .flat_map(|(age, batch)| {
                batch.iter().map(move |itom| Candidate {
                    itom,
                    fresh: age == newest,
                })
            })
            .collect();

        let mut outputs = Vec::new();
        let mut failures = Vec::new();
        for (index, substitution) in substitutions.iter_mut().enumerate() {
            match evaluate(substitution, &candidates) {
                Ok(values) => outputs.extend(values.into_iter().map(|itom| Output {
                    substitution: index,
                    itom,
                })),
                Err(error) => {
                    log_warn!("Substitution {} ({}) dropped: {}", index, substitution, error);
                    failures.push(ExecutionFailure {
                        substitution: index,
                        error,
                    });
                }
            }
        }

        let pairs = compare_outputs(&outputs, self.outputs.iter().flatten());
        self.outputs.push(outputs.clone());
        let (error, overlap) = collapse(substitutions.len(), &pairs);
        Comparison {
            outputs,
            pairs,
            error,
            overlap,
            failures,
        }
    }
}

/// Execute one substitution on every new feasible input combination
fn evaluate(substitution: &mut Substitution, candidates: &[Candidate<'_>]) -> Result<Vec<Itom>, MonitorError> {
    let groups: Vec<Vec<Candidate<'_>>> = substitution
        .input_variables()
        .iter()
        .map(|variable| {
            candidates
                .iter()
                .copied()
                .filter(|candidate| variable.matches(candidate.itom.name()))
                .collect()
        })
        .collect();

    let mut values = Vec::new();
    for combination in combinations(&groups) {
        // Older combinations ran on an earlier tick
        if !combination.iter().any(|candidate| candidate.fresh) {
            continue;
        }
        if !time::validity(combination.iter().map(|candidate| candidate.itom.timestamp())).is_valid() {
            continue;
        }
        let inputs: Itoms = combination.iter().map(|candidate| candidate.itom.clone()).collect();
        let result = substitution.execute(inputs)?;
        if let Some(output) = result.get(substitution.output_variable().name()) {
            values.push(output.clone());
        }
    }
    Ok(values)
}

/// Cartesian product of the groups (one element per group)
fn combinations<T: Copy>(groups: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut result = Vec::new();
    if groups.iter().any(Vec::is_empty) {
        return result;
    }

    let mut indices = vec![0usize; groups.len()];
    loop {
        result.push(
            indices
                .iter()
                .zip(groups)
                .map(|(&index, group)| group[index])
                .collect(),
        );

        let mut position = groups.len();
        loop {
            if position == 0 {
                return result;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < groups[position].len() {
                break;
            }
            indices[position] = 0;
        }
    }
}

/// Pairs among `fresh` outputs and between fresh and `cached` ones
fn compare_outputs<'a>(fresh: &[Output], cached: impl Iterator<Item = &'a Output>) -> Vec<PairComparison> {
    let mut pairs = Vec::new();
    for (i, first) in fresh.iter().enumerate() {
        for second in &fresh[i + 1..] {
            pairs.extend(compare_pair(first, second));
        }
    }
    for second in cached {
        for first in fresh {
            pairs.extend(compare_pair(first, second));
        }
    }
    pairs
}

fn compare_pair(first: &Output, second: &Output) -> Option<PairComparison> {
    if first.substitution == second.substitution {
        return None;
    }
    if !time::comparable(first.itom.timestamp(), second.itom.timestamp()) {
        return None;
    }
    let (v, w) = (first.itom.value(), second.itom.value());
    Some(PairComparison {
        first: first.substitution,
        second: second.substitution,
        error: v.error(&w),
        overlap: v.overlap(&w),
        uncertainty: v.half_width() + w.half_width(),
    })
}

/// Best agreement per substitution pair: minimum error, maximum overlap
fn collapse(size: usize, pairs: &[PairComparison]) -> (Matrix, Matrix) {
    let mut error = Matrix::zeros(size);
    let mut overlap = Matrix::zeros(size);
    let mut seen = vec![false; size * size];

    for pair in pairs {
        for (row, column) in [(pair.first, pair.second), (pair.second, pair.first)] {
            if row >= size || column >= size {
                continue;
            }
            let slot = row * size + column;
            if seen[slot] {
                error.set(row, column, error.get(row, column).min(pair.error));
                overlap.set(row, column, overlap.get(row, column).max(pair.overlap));
            } else {
                seen[slot] = true;
                error.set(row, column, pair.error);
                overlap.set(row, column, pair.overlap);
            }
        }
    }
    (error, overlap)
}
