//! lissajous - TUI and CLI for Lissajous figures
//!
//! Usage:
//!   lissajous                           Launch TUI
//!   lissajous render -o figure.svg      Write the three-panel plot (svg/png/json)
//!   lissajous sample --format json      Dump t, x(t), y(t)
//!   lissajous shapes                    List waveform shapes and formula functions
//!   lissajous session --example         Print an example session file
//!   lissajous quiz --seed 7             Match a hidden target figure
//!
//! Every command accepts `--session FILE` plus per-setting overrides such as
//! `--x-freq 5` or `--y-expr "cos(t)^3"`.

mod cli;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};

use lissajous::{expr, Shape};

use cli::{
    cmd_quiz, cmd_render, cmd_sample, cmd_session, run_tui, ParamArgs, QuizArgs, RenderArgs, SampleArgs,
    SessionArgs,
};

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive terminal UI (default)
    Tui,
    /// Write the three-panel plot
    Render(RenderArgs),
    /// Print the time grid and both signals
    Sample(SampleArgs),
    /// List waveform shapes and the functions allowed in formulas
    Shapes,
    /// Print the effective session as YAML
    Session(SessionArgs),
    /// Pick a hidden target figure and score the current settings against it
    Quiz(QuizArgs),
}

#[derive(Parser, Debug)]
#[command(name = "lissajous", version)]
#[command(about = "Lissajous figure generator: plot x(t), y(t) and y(t) vs x(t)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    params: ParamArgs,
}

fn main() {
    let cli = Cli::parse();

    // the TUI owns the terminal, so it only logs when RUST_LOG asks for it
    let interactive = matches!(cli.command, None | Some(Command::Tui));
    logging::init_logger(if interactive { "off" } else { "info" });

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let params = &cli.params;
    match cli.command {
        None | Some(Command::Tui) => run_tui(params.build_session()?),
        Some(Command::Render(args)) => cmd_render(params, &args),
        Some(Command::Sample(args)) => cmd_sample(params, &args),
        Some(Command::Shapes) => {
            cmd_shapes();
            Ok(())
        }
        Some(Command::Session(args)) => cmd_session(params, &args),
        Some(Command::Quiz(args)) => cmd_quiz(params, &args),
    }
}

fn cmd_shapes() {
    println!("Available shapes:");
    for shape in Shape::all() {
        let note = match shape {
            Shape::Arbitrary => "formula in t, set with --x-expr / --y-expr",
            _ => "frequency, amplitude, phase",
        };
        println!("  {:<10} {}", shape.name(), note);
    }
    println!();
    println!("Formula functions:");
    println!("  {}", expr::names().join(", "));
    println!("Constants: pi, e, tau    Operators: + - * / % ^ (or **)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from(["lissajous", "render", "--x-freq", "5", "--x-phase", "-1.5"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Render(_))));
        assert_eq!(cli.params.x_freq, Some(5.0));
        assert_eq!(cli.params.x_phase, Some(-1.5));
    }

    #[test]
    fn no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["lissajous"]).unwrap();
        assert!(cli.command.is_none());
    }
}
