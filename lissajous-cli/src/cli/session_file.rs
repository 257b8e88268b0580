//! Session files.
//!
//! Sessions are YAML documents mirroring [`Session`]. Every field has a
//! default, so a file only needs the settings it changes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use lissajous::Session;

use super::common::{write_output, ParamArgs};

/// Arguments for `lissajous session`.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Print a documented example session instead
    #[arg(long)]
    pub example: bool,

    /// Write the YAML here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Load a session from a YAML file.
pub fn load(path: &Path) -> Result<Session> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read session file {}", path.display()))?;
    from_yaml(&content).with_context(|| format!("Failed to parse session file {}", path.display()))
}

pub fn from_yaml(content: &str) -> Result<Session> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn to_yaml(session: &Session) -> Result<String> {
    serde_yaml::to_string(session).context("Failed to serialize session")
}

/// Save a session as YAML.
pub fn save(session: &Session, path: &Path) -> Result<()> {
    let yaml = to_yaml(session)?;
    fs::write(path, yaml).with_context(|| format!("Failed to write session file {}", path.display()))
}

/// Execute the session command.
pub fn cmd_session(params: &ParamArgs, args: &SessionArgs) -> Result<()> {
    if args.example {
        return write_output(args.output.as_deref(), EXAMPLE.as_bytes());
    }
    let session = params.build_session()?;
    write_output(args.output.as_deref(), to_yaml(&session)?.as_bytes())
}

/// Documented example, printed by `lissajous session --example`.
pub const EXAMPLE: &str = r##"# Example lissajous session
#
# Every key is optional; anything left out takes its default.

# Waveforms: sine, cosine, square, triangle, sawtooth, arbitrary
x:
  shape: sine
  frequency: 3
  amplitude: 1.0
  phase: 0.0          # in phase_unit

y:
  shape: arbitrary
  # any formula in t; see `lissajous shapes` for the function list
  expression: "sin(2*pi*4*t + pi/2)"

time:
  start: 0.0
  end: 12.566370614359172   # 4*pi
  points: 1000
  # density: 100            # samples per unit time, overrides points

phase_unit: radians   # or degrees

# Quiz target drawn as a dashed overlay; scored on every render.
# quiz:
#   x: { shape: sine, frequency: 2, amplitude: 1, phase: { value: 0.0 } }
#   y: { shape: cosine, frequency: 3, amplitude: 1, phase: { value: 45, unit: degrees } }

show_tips: true
tip_index: 0

style:
  panel_width: 480
  panel_height: 400
  background: white
  x_color: royalblue
  y_color: green
  curve_color: crimson
  overlay_color: gray
  overlay_opacity: 0.6
  stroke_width: 1.5
  show_grid: true
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use lissajous::{PhaseUnit, Shape};

    #[test]
    fn example_parses_and_validates() {
        let session = from_yaml(EXAMPLE).unwrap();
        session.validate().unwrap();
        assert_eq!(session.x.shape(), Some(Shape::Sine));
        assert_eq!(session.y.shape(), Some(Shape::Arbitrary));
        assert_eq!(session.phase_unit, PhaseUnit::Radians);
        assert!(session.quiz.is_none());
        assert!(session.figure().diagnostics.is_empty());
    }

    #[test]
    fn quiz_block_parses() {
        let yaml = "quiz:\n  x: { shape: sine, frequency: 2, amplitude: 1, phase: { value: 0.0 } }\n  y: { shape: cosine, frequency: 3, amplitude: 1, phase: { value: 45, unit: degrees } }\n";
        let session = from_yaml(yaml).unwrap();
        let quiz = session.quiz.unwrap();
        assert_eq!(quiz.y.shape, Shape::Cosine);
        assert!((quiz.y.phase.to_radians() - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("lissajous-session-{}.yaml", std::process::id()));
        let mut session = Session::symbolic("t", "t^2");
        session.tip_index = 3;
        save(&session, &path).unwrap();
        let loaded = load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, session);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
