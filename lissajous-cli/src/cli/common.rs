//! Common utilities shared across CLI commands.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use lissajous::{AxisConfig, PhaseUnit, Session, Shape};

use super::session_file;

/// Phase unit as accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Radians,
    Degrees,
}

impl From<UnitArg> for PhaseUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Radians => PhaseUnit::Radians,
            UnitArg::Degrees => PhaseUnit::Degrees,
        }
    }
}

/// Session file plus per-setting overrides, shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Session YAML file to start from (see `lissajous session --example`)
    #[arg(long, global = true, value_name = "FILE")]
    pub session: Option<PathBuf>,

    /// x(t) waveform: sine, cosine, square, triangle, sawtooth, arbitrary
    #[arg(long, global = true, value_name = "SHAPE")]
    pub x_shape: Option<String>,
    /// x(t) frequency
    #[arg(long, global = true, value_name = "HZ")]
    pub x_freq: Option<f64>,
    /// x(t) amplitude
    #[arg(long, global = true, value_name = "A")]
    pub x_amp: Option<f64>,
    /// x(t) phase, in the session's phase unit
    #[arg(long, global = true, allow_negative_numbers = true, value_name = "PHI")]
    pub x_phase: Option<f64>,
    /// x(t) formula in t (implies --x-shape arbitrary)
    #[arg(long, global = true, value_name = "EXPR")]
    pub x_expr: Option<String>,

    /// y(t) waveform: sine, cosine, square, triangle, sawtooth, arbitrary
    #[arg(long, global = true, value_name = "SHAPE")]
    pub y_shape: Option<String>,
    /// y(t) frequency
    #[arg(long, global = true, value_name = "HZ")]
    pub y_freq: Option<f64>,
    /// y(t) amplitude
    #[arg(long, global = true, value_name = "A")]
    pub y_amp: Option<f64>,
    /// y(t) phase, in the session's phase unit
    #[arg(long, global = true, allow_negative_numbers = true, value_name = "PHI")]
    pub y_phase: Option<f64>,
    /// y(t) formula in t (implies --y-shape arbitrary)
    #[arg(long, global = true, value_name = "EXPR")]
    pub y_expr: Option<String>,

    /// Start of the time range
    #[arg(long, global = true, allow_negative_numbers = true, value_name = "T")]
    pub t_start: Option<f64>,
    /// End of the time range
    #[arg(long, global = true, allow_negative_numbers = true, value_name = "T")]
    pub t_end: Option<f64>,
    /// Number of samples
    #[arg(long, global = true, value_name = "N")]
    pub points: Option<usize>,
    /// Samples per unit time (overrides --points)
    #[arg(long, global = true, value_name = "D")]
    pub density: Option<f64>,

    /// Unit for phase values (existing phases are converted)
    #[arg(long, global = true, value_enum)]
    pub phase_unit: Option<UnitArg>,

    /// Leave the tip line out of the plot
    #[arg(long, global = true)]
    pub no_tips: bool,
}

impl ParamArgs {
    /// Load the session file (or the default session) and apply overrides.
    pub fn build_session(&self) -> Result<Session> {
        let mut session = match &self.session {
            Some(path) => session_file::load(path)?,
            None => Session::default(),
        };
        self.apply(&mut session);
        session.validate().context("Invalid session settings")?;
        Ok(session)
    }

    /// Apply command-line overrides on top of `session`.
    pub fn apply(&self, session: &mut Session) {
        // unit first, so phases given on the command line are read in it
        if let Some(unit) = self.phase_unit {
            session.set_phase_unit(unit.into());
        }

        apply_axis(
            &mut session.x,
            self.x_shape.as_deref(),
            self.x_freq,
            self.x_amp,
            self.x_phase,
            self.x_expr.as_deref(),
        );
        apply_axis(
            &mut session.y,
            self.y_shape.as_deref(),
            self.y_freq,
            self.y_amp,
            self.y_phase,
            self.y_expr.as_deref(),
        );

        if let Some(start) = self.t_start {
            session.time.start = start;
        }
        if let Some(end) = self.t_end {
            session.time.end = end;
        }
        if let Some(points) = self.points {
            session.time.points = points;
            session.time.density = None;
        }
        if let Some(density) = self.density {
            session.time.density = Some(density);
        }
        if self.no_tips {
            session.show_tips = false;
        }
    }
}

fn apply_axis(
    axis: &mut AxisConfig,
    shape: Option<&str>,
    frequency: Option<f64>,
    amplitude: Option<f64>,
    phase: Option<f64>,
    expression: Option<&str>,
) {
    if let Some(expr) = expression {
        axis.expression = Some(expr.to_string());
        axis.set_shape(Shape::Arbitrary);
    }
    if let Some(shape) = shape {
        axis.shape = shape.to_string();
    }
    if let Some(f) = frequency {
        axis.frequency = f;
    }
    if let Some(a) = amplitude {
        axis.amplitude = a;
    }
    if let Some(p) = phase {
        axis.phase = p;
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content).context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
