//! Sampled signals.

use serde::Serialize;

/// One real value per time-grid sample. Built once per render pass and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Signal {
    values: Vec<f64>,
}

impl Signal {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn zeros(len: usize) -> Self {
        Self { values: vec![0.0; len] }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(min, max)` over finite samples.
    pub fn range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Largest finite |value|, 0 for an empty or all-NaN signal.
    pub fn peak(&self) -> f64 {
        self.range().map_or(0.0, |(lo, hi)| lo.abs().max(hi.abs()))
    }

    /// True if every sample is exactly zero.
    pub fn is_flat_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }
}
