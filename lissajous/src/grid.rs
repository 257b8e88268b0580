//! Uniform time grids.
//!
//! A grid is built either from `(start, end, count)` like numpy's
//! `linspace`, or from `(start, end, density)` where density is samples per
//! unit of time. Both forms guarantee at least two strictly increasing
//! samples, so every constructor is fallible.

use serde::{Deserialize, Serialize};

/// Upper bound on samples per grid.
pub const MAX_SAMPLES: usize = 100_000;

/// Error type for grid construction.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// `count` (or the count derived from density) is below 2.
    TooFewSamples(usize),
    /// More samples than `MAX_SAMPLES`.
    TooManySamples(usize),
    /// `end` is not greater than `start`.
    EmptyRange { start: f64, end: f64 },
    /// A bound or density was NaN/inf, or density was not positive.
    NotFinite(&'static str),
    /// The step between samples is below f64 resolution at this range.
    TooFine { start: f64, end: f64, count: usize },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::TooFewSamples(n) => write!(f, "time grid needs at least 2 samples, got {}", n),
            GridError::TooManySamples(n) => {
                write!(f, "time grid is capped at {} samples, got {}", MAX_SAMPLES, n)
            }
            GridError::EmptyRange { start, end } => {
                write!(f, "time range end ({}) must be greater than start ({})", end, start)
            }
            GridError::NotFinite(what) => write!(f, "time grid {} must be a finite positive number", what),
            GridError::TooFine { start, end, count } => write!(
                f,
                "time range [{}, {}] is too narrow for {} distinct samples",
                start, end, count
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// An ordered, uniformly spaced sequence of sample times.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    samples: Vec<f64>,
}

impl TimeGrid {
    /// `count` evenly spaced samples over `[start, end]`, both ends included.
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self, GridError> {
        if !start.is_finite() {
            return Err(GridError::NotFinite("start"));
        }
        if !end.is_finite() {
            return Err(GridError::NotFinite("end"));
        }
        if end <= start {
            return Err(GridError::EmptyRange { start, end });
        }
        if count < 2 {
            return Err(GridError::TooFewSamples(count));
        }
        if count > MAX_SAMPLES {
            return Err(GridError::TooManySamples(count));
        }

        let step = (end - start) / (count - 1) as f64;
        if !step.is_finite() {
            return Err(GridError::NotFinite("step"));
        }
        if start + step <= start || end - step >= end {
            return Err(GridError::TooFine { start, end, count });
        }

        let samples = spaced(start, end, count);
        // rounding can still collapse neighbours when step is a few ulps
        if samples.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GridError::TooFine { start, end, count });
        }
        Ok(Self { samples })
    }

    /// Samples over `[start, end]` at `density` samples per unit time.
    pub fn with_density(start: f64, end: f64, density: f64) -> Result<Self, GridError> {
        if !density.is_finite() || density <= 0.0 {
            return Err(GridError::NotFinite("density"));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(GridError::NotFinite("range"));
        }
        let duration = end - start;
        let count = (duration * density).round().max(0.0) as usize;
        Self::linspace(start, end, count.min(MAX_SAMPLES + 1))
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start(&self) -> f64 {
        self.samples[0]
    }

    pub fn end(&self) -> f64 {
        self.samples[self.samples.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }
}

impl Default for TimeGrid {
    /// 1000 samples over `[0, 4π]`, the default session grid.
    fn default() -> Self {
        Self { samples: spaced(0.0, 4.0 * std::f64::consts::PI, 1000) }
    }
}

/// `count >= 2` evenly spaced values, last one pinned to `end` so rounding
/// can't overshoot.
fn spaced(start: f64, end: f64, count: usize) -> Vec<f64> {
    let step = (end - start) / (count - 1) as f64;
    let mut samples: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
    samples[count - 1] = end;
    samples
}

/// Serializable description of a grid, as stored in a session.
///
/// `density`, when set, wins over `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub start: f64,
    pub end: f64,
    pub points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 4.0 * std::f64::consts::PI,
            points: 1000,
            density: None,
        }
    }
}

impl TimeConfig {
    pub fn build(&self) -> Result<TimeGrid, GridError> {
        match self.density {
            Some(d) => TimeGrid::with_density(self.start, self.end, d),
            None => TimeGrid::linspace(self.start, self.end, self.points),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
