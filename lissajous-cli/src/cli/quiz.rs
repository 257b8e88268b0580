//! The `quiz` command: pick a hidden target figure and score against it.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lissajous::{QuizTarget, Session, WaveParams};

use super::common::ParamArgs;
use super::render::{render_session, RenderArgs};
use super::session_file;

/// Arguments for `lissajous quiz`.
#[derive(Args, Debug, Clone)]
pub struct QuizArgs {
    /// Seed for the target (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write the plot with the target overlay (SVG, PNG or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Save the session, target included, so later renders keep scoring it
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Print the target's parameters
    #[arg(long)]
    pub reveal: bool,

    /// Print the target's x:y frequency ratio
    #[arg(long)]
    pub hint: bool,
}

/// Pick a target from `seed`, or from OS entropy.
pub fn pick_target(seed: Option<u64>) -> QuizTarget {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    QuizTarget::random(&mut rng)
}

/// Execute the quiz command.
pub fn cmd_quiz(params: &ParamArgs, args: &QuizArgs) -> Result<()> {
    let mut session = params.build_session()?;
    // keep a target loaded from the session file unless a seed asks for a new one
    if session.quiz.is_none() || args.seed.is_some() {
        session.quiz = Some(pick_target(args.seed));
    }

    let figure = session.figure();
    if let Some(score) = figure.quiz_score() {
        println!("distance: {:.4}", score.distance);
        println!("solved: {}", score.solved);
    }
    if args.hint || args.reveal {
        if let Some(target) = &session.quiz {
            println!("hint: {}", hint(target));
        }
    }
    if args.reveal {
        if let Some(target) = &session.quiz {
            println!("target x: {}", describe(&target.x));
            println!("target y: {}", describe(&target.y));
        }
    }

    if let Some(path) = &args.save {
        session_file::save(&session, path)?;
        eprintln!("Saved session: {}", path.display());
    }
    if let Some(path) = &args.output {
        let render = RenderArgs { output: Some(path.clone()), format: None, scale: 1.0 };
        render_session(session, &render)?;
    }
    Ok(())
}

/// The target's reduced frequency ratio, e.g. `ratio 3:4`.
pub fn hint(target: &QuizTarget) -> String {
    match target.ratio() {
        Some((a, b)) => format!("ratio {}:{}", a, b),
        None => "frequencies are not whole numbers".to_string(),
    }
}

fn describe(params: &WaveParams) -> String {
    format!(
        "{} f={} A={} phase={:.4} rad",
        params.shape.name(),
        params.frequency,
        params.amplitude,
        params.phase.to_radians()
    )
}

/// Set both axes of `session` to the target's parameters.
pub fn apply_solution(session: &mut Session, target: &QuizTarget) {
    let unit = session.phase_unit;
    for (axis, wave) in [(&mut session.x, &target.x), (&mut session.y, &target.y)] {
        axis.set_shape(wave.shape);
        axis.frequency = wave.frequency;
        axis.amplitude = wave.amplitude;
        axis.phase = unit.from_radians(wave.phase.to_radians());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lissajous::{Phase, Shape};

    #[test]
    fn seeded_targets_repeat() {
        assert_eq!(pick_target(Some(42)), pick_target(Some(42)));
    }

    #[test]
    fn hint_reduces_the_ratio() {
        let target = QuizTarget::new(
            WaveParams::new(Shape::Sine, 2.0, 1.0, Phase::default()),
            WaveParams::new(Shape::Cosine, 4.0, 1.0, Phase::default()),
        );
        assert_eq!(hint(&target), "ratio 1:2");

        let odd = QuizTarget::new(
            WaveParams::new(Shape::Sine, 2.5, 1.0, Phase::default()),
            WaveParams::new(Shape::Sine, 1.0, 1.0, Phase::default()),
        );
        assert_eq!(hint(&odd), "frequencies are not whole numbers");
    }

    #[test]
    fn solution_scores_as_solved() {
        let target = pick_target(Some(3));
        let mut session = Session { quiz: Some(target), ..Session::default() };
        session.set_phase_unit(lissajous::PhaseUnit::Degrees);
        apply_solution(&mut session, &target);
        let score = session.figure().quiz_score().unwrap();
        assert!(score.solved, "distance {}", score.distance);
    }
}
