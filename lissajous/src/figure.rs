//! The result of one render pass: a time grid, two signals, and whatever
//! went wrong along the way.

use crate::geometry::{Bounds, Point};
use crate::grid::TimeGrid;
use crate::quiz::{Overlay, QuizScore};
use crate::signal::Signal;
use crate::waveform::Diagnostic;

/// Which signal a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Time,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::X => "x(t)",
            Axis::Y => "y(t)",
            Axis::Time => "t",
        }
    }
}

/// Everything needed to draw the three views.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub grid: TimeGrid,
    pub x: Signal,
    pub y: Signal,
    /// Short description of each axis' waveform, for legends.
    pub x_label: String,
    pub y_label: String,
    pub overlay: Option<Overlay>,
    pub diagnostics: Vec<(Axis, Diagnostic)>,
    /// Hint line shown under the plots.
    pub tip: Option<String>,
}

impl Figure {
    /// Points of one time series, `(t, value)`.
    pub fn time_series(&self, axis: Axis) -> Vec<Point> {
        let signal = match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Time => return Vec::new(),
        };
        self.grid
            .iter()
            .zip(signal.values())
            .map(|(t, v)| Point::new(t, *v))
            .collect()
    }

    /// The parametric curve `(x(t), y(t))`.
    pub fn curve(&self) -> Vec<Point> {
        pair(&self.x, &self.y)
    }

    /// Overlay curve, if a quiz target is active.
    pub fn overlay_curve(&self) -> Option<Vec<Point>> {
        self.overlay.as_ref().map(|o| pair(&o.x, &o.y))
    }

    /// Bounds of the parametric curve (and overlay, when present).
    pub fn curve_bounds(&self) -> Option<Bounds> {
        let own = Bounds::from_points(self.curve());
        let other = self.overlay_curve().and_then(Bounds::from_points);
        match (own, other) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, b) => a.or(b),
        }
    }

    /// True when one axis is constant, so the figure collapses to a line.
    pub fn is_degenerate(&self) -> bool {
        let flat = |s: &Signal| s.range().is_none_or(|(lo, hi)| hi - lo < f64::EPSILON);
        flat(&self.x) || flat(&self.y)
    }

    pub fn quiz_score(&self) -> Option<QuizScore> {
        self.overlay.as_ref().map(|o| o.score(&self.x, &self.y))
    }

    /// Diagnostics rendered as user-facing lines.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|(axis, d)| format!("{}: {}", axis.name(), d))
            .collect()
    }
}

fn pair(x: &Signal, y: &Signal) -> Vec<Point> {
    x.values()
        .iter()
        .zip(y.values())
        .map(|(x, y)| Point::new(*x, *y))
        .collect()
}
