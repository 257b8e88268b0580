//! Quiz mode: match a hidden target figure.
//!
//! The target is a fixed pair of waveforms sampled on the same grid as the
//! user's signals every render, drawn as a faint overlay. The score is the
//! RMS distance between the two curves, relative to the target's size.

use std::f64::consts::FRAC_PI_4;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::TimeGrid;
use crate::signal::Signal;
use crate::waveform::{sample_periodic, Phase, Shape, WaveParams};

/// Relative RMS distance below which a target counts as matched.
pub const SOLVED_THRESHOLD: f64 = 0.05;

/// Fixed waveform pair the user tries to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizTarget {
    pub x: WaveParams,
    pub y: WaveParams,
}

/// Target signals sampled on the current grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub x: Signal,
    pub y: Signal,
}

impl QuizTarget {
    pub fn new(x: WaveParams, y: WaveParams) -> Self {
        Self { x, y }
    }

    /// Pick a target with small integer frequencies (1..=5), unit
    /// amplitude, sine or cosine shape, and a phase on the π/4 grid.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let axis = |rng: &mut R| {
            let shape = if rng.random_bool(0.5) { Shape::Sine } else { Shape::Cosine };
            let frequency = rng.random_range(1..=5) as f64;
            let phase = rng.random_range(0..8) as f64 * FRAC_PI_4;
            WaveParams::new(shape, frequency, 1.0, Phase::radians(phase))
        };
        let x = axis(rng);
        let y = axis(rng);
        Self { x, y }
    }

    pub fn sample(&self, grid: &TimeGrid) -> Overlay {
        Overlay {
            x: sample_periodic(&self.x, grid).signal,
            y: sample_periodic(&self.y, grid).signal,
        }
    }

    /// Frequency ratio `x:y` reduced to lowest terms, when both are integers.
    pub fn ratio(&self) -> Option<(u64, u64)> {
        let (a, b) = (self.x.frequency, self.y.frequency);
        if a.fract() != 0.0 || b.fract() != 0.0 || a <= 0.0 || b <= 0.0 {
            return None;
        }
        let (a, b) = (a as u64, b as u64);
        let g = gcd(a, b);
        Some((a / g, b / g))
    }
}

/// Result of comparing the user's curve with the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuizScore {
    /// RMS point distance divided by the target's peak amplitude.
    pub distance: f64,
    pub solved: bool,
}

impl Overlay {
    /// Compare `x`/`y` against this overlay, pointwise in time.
    ///
    /// Non-finite samples on either side are skipped. If nothing is
    /// comparable the distance is infinite.
    pub fn score(&self, x: &Signal, y: &Signal) -> QuizScore {
        let mut sum = 0.0;
        let mut n = 0usize;

        let pairs = x.values().iter().zip(y.values()).zip(self.x.values().iter().zip(self.y.values()));
        for ((ux, uy), (tx, ty)) in pairs {
            let (dx, dy) = (ux - tx, uy - ty);
            let d2 = dx * dx + dy * dy;
            if d2.is_finite() {
                sum += d2;
                n += 1;
            }
        }

        if n == 0 {
            return QuizScore { distance: f64::INFINITY, solved: false };
        }

        let scale = self.x.peak().max(self.y.peak()).max(f64::EPSILON);
        let distance = (sum / n as f64).sqrt() / scale;
        QuizScore { distance, solved: distance < SOLVED_THRESHOLD }
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
