//! Temporal Smoothing of Substitution Scores
//!
//! Scores are noisy: a single late or jittery sample can open a gap between two
//! otherwise agreeing paths for one tick. Filters keep a window of past score
//! vectors and replace the current vector with an element-wise statistic once
//! the window is full.
//!
//! - [`MovingAverage`]: smooths transient noise
//! - [`MovingMedian`]: rejects single-tick outliers entirely
//!
//! Until the window is full, scores pass through unchanged. Windows are
//! cleared whenever the number of substitutions changes, and the monitor
//! resets them on every re-resolution.

use alloc::vec::Vec;

use crate::buffer::HistoryBuffer;
use crate::constants::monitor::MIN_FILTER_WINDOW;

/// Stateful transform of per-substitution score vectors
pub trait ScoreFilter {
    /// Record `scores` and return the filtered vector
    fn apply(&mut self, scores: &[f64]) -> Vec<f64>;

    /// Forget all recorded vectors
    fn reset(&mut self);

    /// Window length in ticks
    fn window(&self) -> usize;
}

/// Window of score vectors of one length
#[derive(Debug, Clone)]
struct ScoreWindow {
    history: HistoryBuffer<Vec<f64>>,
}

impl ScoreWindow {
    fn new(window: usize) -> Self {
        Self {
            history: HistoryBuffer::new(window.max(MIN_FILTER_WINDOW)),
        }
    }

    /// Push `scores`, returning whether the window is full afterwards
    fn record(&mut self, scores: &[f64]) -> bool {
        if self.history.last().is_some_and(|last| last.len() != scores.len()) {
            self.history.clear();
        }
        self.history.push(scores.to_vec());
        self.history.is_full()
    }

    /// Column `index` across the window
    fn column(&self, index: usize) -> Vec<f64> {
        self.history
            .iter()
            .filter_map(|scores| scores.get(index).copied())
            .collect()
    }
}

/// Element-wise mean over the last `window` score vectors
#[derive(Debug, Clone)]
pub struct MovingAverage {
    window: ScoreWindow,
}

impl MovingAverage {
    /// Create a filter averaging `window` ticks
    pub fn new(window: usize) -> Self {
        Self {
            window: ScoreWindow::new(window),
        }
    }
}

impl ScoreFilter for MovingAverage {
    fn apply(&mut self, scores: &[f64]) -> Vec<f64> {
        if !self.window.record(scores) {
            return scores.to_vec();
        }
        (0..scores.len())
            .map(|index| {
                let column = self.window.column(index);
                column.iter().sum::<f64>() / column.len() as f64
            })
            .collect()
    }

    fn reset(&mut self) {
        self.window.history.clear();
    }

    fn window(&self) -> usize {
        self.window.history.capacity()
    }
}

/// Element-wise median over the last `window` score vectors
#[derive(Debug, Clone)]
pub struct MovingMedian {
    window: ScoreWindow,
}

impl MovingMedian {
    /// Create a filter taking the median of `window` ticks
    pub fn new(window: usize) -> Self {
        Self {
            window: ScoreWindow::new(window),
        }
    }
}

impl ScoreFilter for MovingMedian {
    fn apply(&mut self, scores: &[f64]) -> Vec<f64> {
        if !self.window.record(scores) {
            return scores.to_vec();
        }
        (0..scores.len())
            .map(|index| median(self.window.column(index)))
            .collect()
    }

    fn reset(&mut self) {
        self.window.history.clear();
    }

    fn window(&self) -> usize {
        self.window.history.capacity()
    }
}

/// Median; the mean of both middle values for even counts
fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);

    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
