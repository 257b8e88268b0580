//! Session state and the render pass.
//!
//! A [`Session`] holds every user-facing setting: both axes, the time
//! range, the phase unit, an optional quiz target, the plot style and the
//! index of the tip currently shown. Nothing lives in globals. The render
//! pass takes a session by value and hands back the figure plus the session
//! to use next time:
//!
//! ```
//! use lissajous::Session;
//!
//! let session = Session::default();
//! let (figure, next) = session.render();
//! assert_eq!(figure.x.len(), 1000);
//! assert_eq!(next.tip_index, 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::figure::{Axis, Figure};
use crate::grid::{GridError, TimeConfig, TimeGrid};
use crate::plot::{PlotError, PlotStyle};
use crate::quiz::QuizTarget;
use crate::waveform::{sample_named, Diagnostic, Phase, PhaseUnit, Sampled, Shape};

/// Hints cycled under the plots, one per render.
pub const TIPS: &[&str] = &[
    "Equal x and y frequencies with a phase of pi/2 draw a circle (or an ellipse when amplitudes differ).",
    "The frequency ratio x:y sets the lobe count: 3:4 gives 3 lobes one way and 4 the other.",
    "A phase of 0 between equal frequencies collapses the figure to a diagonal line.",
    "Non-integer frequency ratios never close; widen the time range to watch the curve fill in.",
    "Square waves jump between corners, so square vs square only ever visits four points.",
    "Triangle waves trace straight segments: try triangle vs triangle at 1:2.",
    "Set one amplitude to 0 to flatten that axis into a line.",
    "Pick the arbitrary shape to type any formula in t, e.g. sin(t) * exp(-t/20).",
    "More points give a smoother curve; a higher frequency needs more of them.",
    "In quiz mode, tune frequencies and phases until your curve covers the gray target.",
];

/// Error type for session validation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// An axis parameter is out of range.
    Axis { axis: &'static str, message: String },
    Grid(GridError),
    Style(PlotError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Axis { axis, message } => write!(f, "{}: {}", axis, message),
            SessionError::Grid(e) => write!(f, "{}", e),
            SessionError::Style(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<GridError> for SessionError {
    fn from(e: GridError) -> Self {
        SessionError::Grid(e)
    }
}

impl From<PlotError> for SessionError {
    fn from(e: PlotError) -> Self {
        SessionError::Style(e)
    }
}

/// Settings for one signal, as the UI edits them.
///
/// `shape` stays a free string so a session file naming a shape we don't
/// know still loads (and renders flat, with a warning).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisConfig {
    pub shape: String,
    pub frequency: f64,
    pub amplitude: f64,
    /// In the session's [`PhaseUnit`].
    pub phase: f64,
    /// Formula in `t`, used when `shape` is `arbitrary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::periodic(Shape::Sine, 1.0, 1.0, 0.0)
    }
}

impl AxisConfig {
    pub fn periodic(shape: Shape, frequency: f64, amplitude: f64, phase: f64) -> Self {
        Self {
            shape: shape.name().to_string(),
            frequency,
            amplitude,
            phase,
            expression: None,
        }
    }

    pub fn expression(source: &str) -> Self {
        Self {
            shape: Shape::Arbitrary.name().to_string(),
            expression: Some(source.to_string()),
            ..Self::default()
        }
    }

    /// The parsed shape, `None` for an unknown name.
    pub fn shape(&self) -> Option<Shape> {
        Shape::from_name(&self.shape)
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape.name().to_string();
    }

    pub fn sample(&self, grid: &TimeGrid, unit: PhaseUnit) -> Sampled {
        sample_named(
            &self.shape,
            grid,
            self.frequency,
            self.amplitude,
            Phase { value: self.phase, unit },
            self.expression.as_deref(),
        )
    }

    /// One-line description, e.g. `Sine  f=3  A=1  φ=1.571 rad`.
    pub fn label(&self, unit: PhaseUnit) -> String {
        match self.shape() {
            Some(Shape::Arbitrary) => self.expression.clone().unwrap_or_default(),
            Some(shape) => format!(
                "{}  f={}  A={}  φ={}",
                shape.label(),
                short(self.frequency),
                short(self.amplitude),
                phase_text(self.phase, unit)
            ),
            None => format!("unknown shape '{}'", self.shape),
        }
    }

    fn validate(&self, axis: &'static str) -> Result<(), SessionError> {
        let bad = |message: String| Err(SessionError::Axis { axis, message });
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return bad(format!("frequency must be positive, got {}", self.frequency));
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return bad(format!("amplitude must be zero or positive, got {}", self.amplitude));
        }
        if !self.phase.is_finite() {
            return bad(format!("phase must be finite, got {}", self.phase));
        }
        Ok(())
    }
}

/// Everything the render pass needs, and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub x: AxisConfig,
    pub y: AxisConfig,
    pub time: TimeConfig,
    pub phase_unit: PhaseUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz: Option<QuizTarget>,
    pub show_tips: bool,
    pub tip_index: usize,
    pub style: PlotStyle,
}

impl Default for Session {
    /// x = sin(2π·3t), y = sin(2π·4t + π/2) over `[0, 4π]`.
    fn default() -> Self {
        Self {
            x: AxisConfig::periodic(Shape::Sine, 3.0, 1.0, 0.0),
            y: AxisConfig::periodic(Shape::Sine, 4.0, 1.0, std::f64::consts::FRAC_PI_2),
            time: TimeConfig::default(),
            phase_unit: PhaseUnit::Radians,
            quiz: None,
            show_tips: true,
            tip_index: 0,
            style: PlotStyle::default(),
        }
    }
}

impl Session {
    /// A session drawing two formulas against each other.
    pub fn symbolic(x_expr: &str, y_expr: &str) -> Self {
        Self {
            x: AxisConfig::expression(x_expr),
            y: AxisConfig::expression(y_expr),
            ..Self::default()
        }
    }

    /// The tip for the current index.
    pub fn tip(&self) -> &'static str {
        TIPS[self.tip_index % TIPS.len()]
    }

    /// Switch phase units, converting both axes so the figure is unchanged.
    pub fn set_phase_unit(&mut self, unit: PhaseUnit) {
        let from = self.phase_unit;
        for axis in [&mut self.x, &mut self.y] {
            axis.phase = unit.from_radians(from.to_radians(axis.phase));
        }
        self.phase_unit = unit;
    }

    /// Reject out-of-range values before they reach a render.
    ///
    /// Rendering never fails; this is for callers loading untrusted
    /// settings that would rather report the problem than draw a fallback.
    pub fn validate(&self) -> Result<(), SessionError> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        self.time.build()?;
        self.style.validate()?;
        Ok(())
    }

    /// One full render pass. Returns the figure and the session for the
    /// next pass (tip advanced).
    pub fn render(self) -> (Figure, Session) {
        let figure = self.figure();
        let next = Session {
            tip_index: (self.tip_index % TIPS.len() + 1) % TIPS.len(),
            ..self
        };
        (figure, next)
    }

    /// Build the figure for the current settings without advancing.
    ///
    /// Always succeeds: a bad time range falls back to the default grid
    /// and every problem shows up in `Figure::diagnostics`.
    pub fn figure(&self) -> Figure {
        let mut diagnostics = Vec::new();

        let grid = match self.time.build() {
            Ok(grid) => grid,
            Err(e) => {
                let diagnostic = Diagnostic::BadGrid(e.to_string());
                log::warn!("{}, using the default grid", diagnostic);
                diagnostics.push((Axis::Time, diagnostic));
                TimeGrid::default()
            }
        };
        log::debug!(
            "render pass: {} samples over [{}, {}]",
            grid.len(),
            grid.start(),
            grid.end()
        );

        let x = self.x.sample(&grid, self.phase_unit);
        let y = self.y.sample(&grid, self.phase_unit);
        diagnostics.extend(x.diagnostic.map(|d| (Axis::X, d)));
        diagnostics.extend(y.diagnostic.map(|d| (Axis::Y, d)));

        let overlay = self.quiz.as_ref().map(|target| target.sample(&grid));

        Figure {
            x_label: self.x.label(self.phase_unit),
            y_label: self.y.label(self.phase_unit),
            tip: self.show_tips.then(|| self.tip().to_string()),
            grid,
            x: x.signal,
            y: y.signal,
            overlay,
            diagnostics,
        }
    }
}

fn short(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    format!("{}", rounded)
}

fn phase_text(value: f64, unit: PhaseUnit) -> String {
    match unit {
        PhaseUnit::Radians => format!("{} rad", short(value)),
        PhaseUnit::Degrees => format!("{}°", short(value)),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::WaveParams;

    #[test]
    fn default_figure_stays_in_unit_square() {
        let figure = Session::default().figure();
        assert_eq!(figure.grid.len(), 1000);
        assert!(figure.diagnostics.is_empty());
        for p in figure.curve() {
            assert!(p.x.abs() <= 1.0 + 1e-12 && p.y.abs() <= 1.0 + 1e-12, "{:?}", p);
        }
        // starts at (sin 0, sin π/2)
        let first = figure.curve()[0];
        assert!(first.x.abs() < 1e-12);
        assert!((first.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_amplitude_flattens_an_axis() {
        let mut session = Session::default();
        session.y.amplitude = 0.0;
        let figure = session.figure();
        assert!(figure.y.is_flat_zero());
        assert!(figure.is_degenerate());
        assert!(!figure.x.is_flat_zero());
    }

    #[test]
    fn render_advances_and_wraps_tip() {
        let mut session = Session::default();
        session.tip_index = TIPS.len() - 1;
        let last_tip = session.tip();
        let (figure, next) = session.render();
        assert_eq!(figure.tip.as_deref(), Some(last_tip));
        assert_eq!(next.tip_index, 0);
    }

    #[test]
    fn out_of_range_tip_index_from_a_file_still_renders() {
        let session: Session = serde_yaml::from_str("tip_index: 18446744073709551615\n").unwrap();
        assert!(session.validate().is_ok());
        let shown = session.tip();
        let (figure, next) = session.render();
        assert_eq!(figure.tip.as_deref(), Some(shown));
        assert_eq!(next.tip_index, (usize::MAX % TIPS.len() + 1) % TIPS.len());
    }

    #[test]
    fn render_leaves_settings_alone() {
        let session = Session::default();
        let (_, next) = session.clone().render();
        assert_eq!(Session { tip_index: 0, ..next }, session);
    }

    #[test]
    fn tips_can_be_hidden() {
        let session = Session { show_tips: false, ..Session::default() };
        assert_eq!(session.figure().tip, None);
    }

    #[test]
    fn bad_time_range_falls_back_with_diagnostic() {
        let mut session = Session::default();
        session.time.end = -1.0;
        let figure = session.figure();
        assert_eq!(figure.grid, TimeGrid::default());
        assert!(matches!(figure.diagnostics[0], (Axis::Time, Diagnostic::BadGrid(_))));
        assert!(session.validate().is_err());
    }

    #[test]
    fn unknown_shape_is_reported_per_axis() {
        let mut session = Session::default();
        session.y.shape = "hexagon".into();
        let figure = session.figure();
        assert_eq!(figure.y.len(), 1000);
        assert!(figure.y.is_flat_zero());
        assert_eq!(figure.diagnostics.len(), 1);
        assert_eq!(figure.diagnostics[0].0, Axis::Y);
        assert!(figure.messages()[0].starts_with("y(t): unknown waveform 'hexagon'"));
    }

    #[test]
    fn symbolic_session_matches_closed_form() {
        let symbolic = Session::symbolic("sin(2*pi*3*t)", "sin(2*pi*4*t + pi/2)").figure();
        let closed = Session::default().figure();
        assert!(symbolic.diagnostics.is_empty());
        for (a, b) in symbolic.curve().iter().zip(closed.curve()) {
            assert!(a.distance(b) < 1e-9);
        }
        assert_eq!(symbolic.x_label, "sin(2*pi*3*t)");
    }

    #[test]
    fn bad_expression_renders_flat() {
        let figure = Session::symbolic("t +", "cos(t)").figure();
        assert!(figure.x.is_flat_zero());
        assert!(matches!(figure.diagnostics[0], (Axis::X, Diagnostic::BadExpression { .. })));
        assert!(!figure.y.is_flat_zero());
    }

    #[test]
    fn switching_phase_unit_keeps_the_figure() {
        let before = Session::default().figure();
        let mut session = Session::default();
        session.set_phase_unit(PhaseUnit::Degrees);
        assert!((session.y.phase - 90.0).abs() < 1e-9);
        let after = session.figure();
        for (a, b) in before.curve().iter().zip(after.curve()) {
            assert!(a.distance(b) < 1e-9);
        }
        assert!(after.y_label.contains("φ=90°"));
    }

    #[test]
    fn quiz_target_is_overlaid_on_the_same_grid() {
        let mut session = Session::default();
        session.quiz = Some(QuizTarget::new(
            WaveParams::new(Shape::Sine, 3.0, 1.0, Phase::default()),
            WaveParams::new(Shape::Sine, 4.0, 1.0, Phase::radians(std::f64::consts::FRAC_PI_2)),
        ));
        let figure = session.figure();
        let overlay = figure.overlay.as_ref().unwrap();
        assert_eq!(overlay.x.len(), figure.grid.len());
        assert!(figure.quiz_score().unwrap().solved);
    }

    #[test]
    fn validate_rejects_bad_axis_values() {
        let mut session = Session::default();
        session.x.frequency = 0.0;
        assert!(matches!(session.validate(), Err(SessionError::Axis { axis: "x", .. })));
        assert!(Session::default().validate().is_ok());
    }

    #[test]
    fn yaml_round_trip() {
        let mut session = Session::symbolic("sin(t)", "cos(3*t)");
        session.tip_index = 4;
        let text = serde_yaml::to_string(&session).unwrap();
        let back: Session = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let session: Session = serde_yaml::from_str("x:\n  shape: square\n  frequency: 2\nphase_unit: degrees\n").unwrap();
        assert_eq!(session.x.shape(), Some(Shape::Square));
        assert_eq!(session.x.frequency, 2.0);
        assert_eq!(session.x.amplitude, 1.0);
        assert_eq!(session.y, Session::default().y);
        assert_eq!(session.phase_unit, PhaseUnit::Degrees);
        assert_eq!(session.time, TimeConfig::default());
    }
}
