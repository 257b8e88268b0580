//! Waveform sampling.
//!
//! Every closed-form shape is a function of the angular argument
//! `angle(t) = 2π·f·t + φ`, with period 2π in `angle`:
//!
//! | shape    | value                                             |
//! |----------|---------------------------------------------------|
//! | sine     | `A·sin(angle)`                                    |
//! | cosine   | `A·cos(angle)`                                    |
//! | square   | `+A` on the first half period, `-A` on the second |
//! | triangle | `-A → +A → -A`, symmetric about mid-period        |
//! | sawtooth | ramp `-A → +A`, reset at the period boundary      |
//!
//! The `arbitrary` shape replaces all of that with a formula in `t`
//! (see [`crate::expr`]).
//!
//! Sampling never fails. An unknown shape name or a bad formula yields an
//! all-zero signal plus a [`Diagnostic`], so the caller can always draw
//! something.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::expr::Expr;
use crate::grid::TimeGrid;
use crate::signal::Signal;

/// Available waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Sine,
    Cosine,
    Square,
    Triangle,
    Sawtooth,
    Arbitrary,
}

impl Shape {
    /// Get all available shapes.
    pub fn all() -> &'static [Shape] {
        &[
            Shape::Sine,
            Shape::Cosine,
            Shape::Square,
            Shape::Triangle,
            Shape::Sawtooth,
            Shape::Arbitrary,
        ]
    }

    /// Get shape name as string.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Sine => "sine",
            Shape::Cosine => "cosine",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Sawtooth => "sawtooth",
            Shape::Arbitrary => "arbitrary",
        }
    }

    /// Title-case label for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Sine => "Sine",
            Shape::Cosine => "Cosine",
            Shape::Square => "Square",
            Shape::Triangle => "Triangle",
            Shape::Sawtooth => "Sawtooth",
            Shape::Arbitrary => "Arbitrary",
        }
    }

    /// Parse shape from string (case-insensitive, a few aliases).
    pub fn from_name(name: &str) -> Option<Shape> {
        match name.trim().to_lowercase().as_str() {
            "sine" | "sin" => Some(Shape::Sine),
            "cosine" | "cos" => Some(Shape::Cosine),
            "square" => Some(Shape::Square),
            "triangle" | "tri" => Some(Shape::Triangle),
            "sawtooth" | "saw" => Some(Shape::Sawtooth),
            "arbitrary" | "expr" | "expression" | "custom" => Some(Shape::Arbitrary),
            _ => None,
        }
    }

    /// Next shape in `all()` order, wrapping.
    pub fn next(&self) -> Shape {
        let all = Shape::all();
        let i = all.iter().position(|s| s == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }

    /// Previous shape in `all()` order, wrapping.
    pub fn prev(&self) -> Shape {
        let all = Shape::all();
        let i = all.iter().position(|s| s == self).unwrap_or(0);
        all[(i + all.len() - 1) % all.len()]
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit a phase value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseUnit {
    #[default]
    Radians,
    Degrees,
}

impl PhaseUnit {
    pub fn to_radians(self, value: f64) -> f64 {
        match self {
            PhaseUnit::Radians => value,
            PhaseUnit::Degrees => value.to_radians(),
        }
    }

    pub fn from_radians(self, radians: f64) -> f64 {
        match self {
            PhaseUnit::Radians => radians,
            PhaseUnit::Degrees => radians.to_degrees(),
        }
    }

    /// Full turn in this unit (slider upper bound).
    pub fn full_turn(self) -> f64 {
        match self {
            PhaseUnit::Radians => TAU,
            PhaseUnit::Degrees => 360.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PhaseUnit::Radians => "rad",
            PhaseUnit::Degrees => "°",
        }
    }
}

/// A phase offset that remembers its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub value: f64,
    #[serde(default)]
    pub unit: PhaseUnit,
}

impl Phase {
    pub fn radians(value: f64) -> Self {
        Self { value, unit: PhaseUnit::Radians }
    }

    pub fn degrees(value: f64) -> Self {
        Self { value, unit: PhaseUnit::Degrees }
    }

    pub fn to_radians(&self) -> f64 {
        self.unit.to_radians(self.value)
    }

    /// The same angle expressed in `unit`.
    pub fn converted(&self, unit: PhaseUnit) -> Phase {
        Phase { value: unit.from_radians(self.to_radians()), unit }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::radians(0.0)
    }
}

/// Parameters of a closed-form waveform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub shape: Shape,
    pub frequency: f64,
    pub amplitude: f64,
    pub phase: Phase,
}

impl WaveParams {
    pub fn new(shape: Shape, frequency: f64, amplitude: f64, phase: Phase) -> Self {
        Self { shape, frequency, amplitude, phase }
    }

    /// Angular argument `2π·f·t + φ` at time `t`.
    #[inline]
    pub fn angle(&self, t: f64) -> f64 {
        TAU * self.frequency * t + self.phase.to_radians()
    }

    /// Value at a single time. `Arbitrary` has no closed form and yields 0.
    pub fn value_at(&self, t: f64) -> f64 {
        let angle = self.angle(t);
        let unit = match self.shape {
            Shape::Sine => angle.sin(),
            Shape::Cosine => angle.cos(),
            Shape::Square => square_wave(angle, 0.5),
            Shape::Triangle => triangle_wave(angle),
            Shape::Sawtooth => sawtooth_wave(angle, 1.0),
            Shape::Arbitrary => 0.0,
        };
        self.amplitude * unit
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        WaveParams::new(Shape::Sine, 1.0, 1.0, Phase::default())
    }
}

/// Why a sampled signal fell back to zeros.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    UnknownShape(String),
    /// The formula failed to parse; `message` is user-facing.
    BadExpression { source: String, message: String },
    /// The grid itself could not be built.
    BadGrid(String),
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::UnknownShape(name) => {
                write!(f, "unknown waveform '{}', drawing a flat line", name)
            }
            Diagnostic::BadExpression { source, message } => {
                write!(f, "invalid expression '{}': {}", source, message)
            }
            Diagnostic::BadGrid(message) => write!(f, "invalid time grid: {}", message),
        }
    }
}

/// A signal plus the reason it is flat, if it is a fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampled {
    pub signal: Signal,
    pub diagnostic: Option<Diagnostic>,
}

impl Sampled {
    fn ok(signal: Signal) -> Self {
        Self { signal, diagnostic: None }
    }

    fn zeros(len: usize, diagnostic: Diagnostic) -> Self {
        log::warn!("{}", diagnostic);
        Self { signal: Signal::zeros(len), diagnostic: Some(diagnostic) }
    }
}

/// Sample a closed-form waveform. `Arbitrary` has no formula here and
/// comes back as zeros.
pub fn sample_periodic(params: &WaveParams, grid: &TimeGrid) -> Sampled {
    let values = grid.iter().map(|t| params.value_at(t)).collect();
    Sampled::ok(Signal::new(values))
}

/// Parse and sample a formula in `t`.
pub fn sample_expression(source: &str, grid: &TimeGrid) -> Sampled {
    match Expr::parse(source) {
        Ok(expr) => {
            if !expr.depends_on_time() {
                log::info!("formula '{}' does not use t, its signal is constant", expr);
            }
            Sampled::ok(Signal::new(expr.eval_all(grid.samples())))
        }
        Err(e) => Sampled::zeros(
            grid.len(),
            Diagnostic::BadExpression {
                source: source.to_string(),
                message: e.to_string(),
            },
        ),
    }
}

/// Sample by shape name, as a UI selector would pass it.
///
/// Unknown names produce zeros; `arbitrary` uses `expression`.
pub fn sample_named(
    shape: &str,
    grid: &TimeGrid,
    frequency: f64,
    amplitude: f64,
    phase: Phase,
    expression: Option<&str>,
) -> Sampled {
    match Shape::from_name(shape) {
        Some(Shape::Arbitrary) => sample_expression(expression.unwrap_or(""), grid),
        Some(shape) => sample_periodic(&WaveParams::new(shape, frequency, amplitude, phase), grid),
        None => Sampled::zeros(grid.len(), Diagnostic::UnknownShape(shape.to_string())),
    }
}

/// Position within the current period of `angle`, in `[0, 1)`.
#[inline]
fn cycle_position(angle: f64) -> f64 {
    let p = angle.rem_euclid(TAU) / TAU;
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if p >= 1.0 { 0.0 } else { p }
}

/// Square wave of period 2π: `+1` while the cycle position is below
/// `duty`, `-1` after. `duty` outside `[0, 1]` yields NaN.
pub fn square_wave(angle: f64, duty: f64) -> f64 {
    if !(0.0..=1.0).contains(&duty) || !angle.is_finite() {
        return f64::NAN;
    }
    if cycle_position(angle) < duty { 1.0 } else { -1.0 }
}

/// Sawtooth of period 2π rising from -1 to +1 over `width` of the cycle
/// and falling back to -1 over the rest. `width = 1` is the plain ramp,
/// `width = 0.5` the symmetric triangle. `width` outside `[0, 1]` yields NaN.
pub fn sawtooth_wave(angle: f64, width: f64) -> f64 {
    if !(0.0..=1.0).contains(&width) || !angle.is_finite() {
        return f64::NAN;
    }
    let p = cycle_position(angle);
    if p < width {
        -1.0 + 2.0 * p / width
    } else {
        1.0 - 2.0 * (p - width) / (1.0 - width)
    }
}

/// Symmetric triangle of period 2π: -1 at 0, +1 at π.
pub fn triangle_wave(angle: f64) -> f64 {
    sawtooth_wave(angle, 0.5)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn grid(end: f64, n: usize) -> TimeGrid {
        TimeGrid::linspace(0.0, end, n).unwrap()
    }

    fn periodic(shape: Shape, f: f64, a: f64, phase: f64) -> Vec<f64> {
        let g = grid(2.0, 997);
        sample_periodic(&WaveParams::new(shape, f, a, Phase::radians(phase)), &g)
            .signal
            .values()
            .to_vec()
    }

    #[test]
    fn every_shape_matches_grid_length() {
        let g = grid(3.0, 321);
        for shape in Shape::all() {
            let s = sample_named(shape.name(), &g, 3.0, 1.5, Phase::radians(0.4), Some("t^2"));
            assert_eq!(s.signal.len(), g.len(), "{}", shape.name());
        }
    }

    #[test]
    fn sine_and_cosine_scale_linearly() {
        for shape in [Shape::Sine, Shape::Cosine] {
            let one = periodic(shape, 3.0, 0.7, 0.3);
            let two = periodic(shape, 3.0, 1.4, 0.3);
            for (a, b) in one.iter().zip(&two) {
                assert_eq!(2.0 * a, *b);
            }
        }
    }

    #[test]
    fn square_is_plus_or_minus_amplitude() {
        let amp = 2.5;
        let values = periodic(Shape::Square, 4.0, amp, 0.0);
        assert!(values.iter().all(|v| v.abs() == amp));
        assert!(values.contains(&amp));
        assert!(values.contains(&-amp));
    }

    #[test]
    fn square_starts_high() {
        assert_eq!(square_wave(0.0, 0.5), 1.0);
        assert_eq!(square_wave(PI - 1e-9, 0.5), 1.0);
        assert_eq!(square_wave(PI + 1e-9, 0.5), -1.0);
        assert_eq!(square_wave(-0.1, 0.5), -1.0);
    }

    #[test]
    fn sawtooth_rises_within_one_period() {
        // one period of angle over the grid: f = 1, t in [0, 1)
        let g = TimeGrid::linspace(0.0, 0.999, 500).unwrap();
        let s = sample_periodic(&WaveParams::new(Shape::Sawtooth, 1.0, 3.0, Phase::default()), &g);
        let v = s.signal.values();
        assert!(v.windows(2).all(|w| w[1] > w[0]));
        assert!((v[0] + 3.0).abs() < 1e-12);
        assert!(v[v.len() - 1] < 3.0 && v[v.len() - 1] > 2.9);
    }

    #[test]
    fn sawtooth_resets_at_period_boundary() {
        assert!((sawtooth_wave(TAU - 1e-9, 1.0) - 1.0).abs() < 1e-6);
        assert_eq!(sawtooth_wave(TAU, 1.0), -1.0);
    }

    #[test]
    fn triangle_rises_then_falls_symmetrically() {
        let n = 401;
        let g = TimeGrid::linspace(0.0, 1.0, n).unwrap();
        let s = sample_periodic(&WaveParams::new(Shape::Triangle, 1.0, 2.0, Phase::default()), &g);
        let v = s.signal.values();
        let mid = n / 2;
        assert!(v[..=mid].windows(2).all(|w| w[1] > w[0]));
        assert!(v[mid..n - 1].windows(2).all(|w| w[1] < w[0]));
        assert!((v[mid] - 2.0).abs() < 1e-9);
        for i in 0..mid {
            assert!((v[i] - v[n - 1 - i]).abs() < 1e-9, "asymmetric at {}", i);
        }
    }

    #[test]
    fn phase_shift_equals_time_shift() {
        let f = 3.0;
        let phi = 1.1;
        let g = grid(2.0, 500);
        let delay = phi / (2.0 * PI * f);
        let shifted = TimeGrid::linspace(delay, 2.0 + delay, 500).unwrap();

        let with_phase = sample_periodic(&WaveParams::new(Shape::Sine, f, 1.0, Phase::radians(phi)), &g);
        let with_delay = sample_periodic(&WaveParams::new(Shape::Sine, f, 1.0, Phase::default()), &shifted);

        for (a, b) in with_phase.signal.values().iter().zip(with_delay.signal.values()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn degrees_and_radians_agree() {
        let g = grid(1.0, 100);
        let rad = sample_periodic(&WaveParams::new(Shape::Sine, 2.0, 1.0, Phase::radians(PI / 2.0)), &g);
        let deg = sample_periodic(&WaveParams::new(Shape::Sine, 2.0, 1.0, Phase::degrees(90.0)), &g);
        for (a, b) in rad.signal.values().iter().zip(deg.signal.values()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn phase_conversion() {
        let p = Phase::degrees(180.0).converted(PhaseUnit::Radians);
        assert!((p.value - PI).abs() < 1e-12);
        assert_eq!(p.unit, PhaseUnit::Radians);
    }

    #[test]
    fn unknown_shape_is_flat_with_diagnostic() {
        let g = grid(1.0, 64);
        let s = sample_named("wobble", &g, 1.0, 1.0, Phase::default(), None);
        assert_eq!(s.signal.len(), 64);
        assert!(s.signal.values().iter().all(|v| *v == 0.0));
        assert_eq!(s.diagnostic, Some(Diagnostic::UnknownShape("wobble".into())));
    }

    #[test]
    fn malformed_expression_is_flat_with_diagnostic() {
        let g = grid(1.0, 50);
        for src in ["t +", "foo(t)", "bar * t", ""] {
            let s = sample_expression(src, &g);
            assert_eq!(s.signal.len(), 50);
            assert!(s.signal.values().iter().all(|v| *v == 0.0));
            assert!(matches!(s.diagnostic, Some(Diagnostic::BadExpression { .. })), "{}", src);
        }
    }

    #[test]
    fn expression_matches_closed_form() {
        let g = grid(2.0, 300);
        let expr = sample_expression("sin(2*pi*3*t + pi/4)", &g);
        let closed = sample_periodic(&WaveParams::new(Shape::Sine, 3.0, 1.0, Phase::radians(PI / 4.0)), &g);
        assert!(expr.diagnostic.is_none());
        for (a, b) in expr.signal.values().iter().zip(closed.signal.values()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_formula_is_valid_and_flat() {
        let g = grid(1.0, 20);
        let s = sample_expression("2*pi", &g);
        assert!(s.diagnostic.is_none());
        assert!(s.signal.values().iter().all(|v| (v - 2.0 * PI).abs() < 1e-12));
    }

    #[test]
    fn zero_amplitude_is_flat() {
        for shape in Shape::all().iter().filter(|s| **s != Shape::Arbitrary) {
            assert!(periodic(*shape, 5.0, 0.0, 1.0).iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn shape_names_round_trip_and_cycle() {
        for shape in Shape::all() {
            assert_eq!(Shape::from_name(shape.name()), Some(*shape));
            assert_eq!(shape.next().prev(), *shape);
        }
        assert_eq!(Shape::from_name("  SINE "), Some(Shape::Sine));
        assert_eq!(Shape::Arbitrary.next(), Shape::Sine);
    }

    #[test]
    fn out_of_range_width_is_nan() {
        assert!(sawtooth_wave(1.0, 1.5).is_nan());
        assert!(square_wave(1.0, -0.1).is_nan());
    }
}
