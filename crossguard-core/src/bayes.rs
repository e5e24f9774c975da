//! Probabilistic Fault Vote
//!
//! ## Overview
//!
//! Interval scores say *how much* paths disagree; the vote asks *which* path is
//! to blame. Every pair of substitutions yields a match probability, and a
//! three-node consistency table turns the three pairwise matches of a triple
//! into failure probabilities:
//!
//! ```text
//!   match(a,b) match(a,c) match(b,c) │ P(a) P(b) P(c)
//!   ─────────────────────────────────┼────────────────
//!       T          T          T      │  0    0    0
//!       T          T          F      │  0   1/2  1/2
//!       T          F          T      │ 1/2   0   1/2
//!       F          T          T      │ 1/2  1/2   0
//!       T          F          F      │  0    0    1
//!       F          T          F      │  0    1    0
//!       F          F          T      │  1    0    0
//!       F          F          F      │ 1/3  1/3  1/3
//! ```
//!
//! Soft evidence is marginalised over all eight rows assuming independent
//! pairs. With more than three substitutions a path's probability is the mean
//! over every triple containing it; with fewer there is no vote.
//!
//! ## Evidence
//!
//! Errors and overlaps are scaled by the pair uncertainty (sum of both
//! half-widths), so they are unit-less. Over the pairs compared this tick a
//! substitution pair keeps its best agreement: minimum scaled error, maximum
//! scaled overlap. Pairs that
//! were never comparable carry no evidence and match with probability 0.5.

use alloc::vec;
use alloc::vec::Vec;

use crate::compare::{Comparison, Matrix, PairComparison};
use crate::config::BayesMode;
use crate::constants::bayes::{
    FAULT_PROBABILITY_THRESHOLD, SOFT_MATCH_GAIN, UNDECIDED_PROBABILITY, VOTE_SIZE,
};

/// Failure probabilities of one triple for each combination of pair matches
///
/// Row index bits: `ab << 2 | ac << 1 | bc` with 1 = match.
const TRUTH_TABLE: [[f64; 3]; 8] = [
    [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0], // FFF
    [1.0, 0.0, 0.0],                   // FFT
    [0.0, 1.0, 0.0],                   // FTF
    [0.5, 0.5, 0.0],                   // FTT
    [0.0, 0.0, 1.0],                   // TFF
    [0.5, 0.0, 0.5],                   // TFT
    [0.0, 0.5, 0.5],                   // TTF
    [0.0, 0.0, 0.0],                   // TTT
];

/// Scaled (error, overlap) of one pair
fn scaled(pair: &PairComparison) -> (f64, f64) {
    if pair.uncertainty > 0.0 {
        (
            (pair.error / pair.uncertainty).min(1.0),
            (pair.overlap / pair.uncertainty).min(1.0),
        )
    } else if pair.error == 0.0 {
        (0.0, 1.0)
    } else {
        (1.0, 0.0)
    }
}

/// Pairwise match probabilities (symmetric, diagonal 1)
pub fn match_probabilities(comparison: &Comparison, mode: BayesMode) -> Matrix {
    let size = comparison.len();
    let mut evidence: Vec<Option<(f64, f64)>> = vec![None; size * size];

    for pair in &comparison.pairs {
        if pair.first >= size || pair.second >= size {
            continue;
        }
        let (error, overlap) = scaled(pair);
        for slot in [pair.first * size + pair.second, pair.second * size + pair.first] {
            evidence[slot] = Some(match evidence[slot] {
                Some((e, o)) => (e.min(error), o.max(overlap)),
                None => (error, overlap),
            });
        }
    }

    let mut matches = Matrix::zeros(size);
    for row in 0..size {
        for column in 0..size {
            let probability = if row == column {
                1.0
            } else {
                match evidence[row * size + column] {
                    None => UNDECIDED_PROBABILITY,
                    Some((error, overlap)) => match mode {
                        BayesMode::Boolean => {
                            if error == 0.0 {
                                1.0
                            } else {
                                0.0
                            }
                        }
                        BayesMode::Soft => (UNDECIDED_PROBABILITY - SOFT_MATCH_GAIN * error
                            + SOFT_MATCH_GAIN * overlap)
                            .clamp(0.0, 1.0),
                    },
                }
            };
            matches.set(row, column, probability);
        }
    }
    matches
}

/// Failure probabilities of a triple given its three match probabilities
pub fn triple(ab: f64, ac: f64, bc: f64) -> [f64; 3] {
    let mut result = [0.0; 3];
    for (row, probabilities) in TRUTH_TABLE.iter().enumerate() {
        let weight = [(ab, 4), (ac, 2), (bc, 1)]
            .iter()
            .map(|&(p, bit)| if row & bit != 0 { p } else { 1.0 - p })
            .product::<f64>();
        if weight == 0.0 {
            continue;
        }
        for (slot, probability) in result.iter_mut().zip(probabilities) {
            *slot += weight * probability;
        }
    }
    result
}

/// Failure probability per substitution; `None` below three substitutions
pub fn fault_probabilities(matches: &Matrix) -> Option<Vec<f64>> {
    let size = matches.size();
    if size < VOTE_SIZE {
        return None;
    }

    let mut sums = vec![0.0; size];
    let mut counts = vec![0usize; size];
    for a in 0..size {
        for b in a + 1..size {
            for c in b + 1..size {
                let votes = triple(matches.get(a, b), matches.get(a, c), matches.get(b, c));
                for (index, vote) in [a, b, c].into_iter().zip(votes) {
                    sums[index] += vote;
                    counts[index] += 1;
                }
            }
        }
    }

    Some(
        sums.into_iter()
            .zip(counts)
            .map(|(sum, count)| if count > 0 { sum / count as f64 } else { 0.0 })
            .collect(),
    )
}

/// Most probable culprit above the reporting threshold, first on ties
pub fn select(probabilities: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, probability) in probabilities.iter().enumerate() {
        if *probability <= FAULT_PROBABILITY_THRESHOLD {
            continue;
        }
        match best {
            Some(current) if probabilities[current] >= *probability => {}
            _ => best = Some(index),
        }
    }
    best
}

/// Run the whole vote on a comparison
pub fn vote(comparison: &Comparison, mode: BayesMode) -> Option<Vec<f64>> {
    fault_probabilities(&match_probabilities(comparison, mode))
}
