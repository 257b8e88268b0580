//! CLI command implementations.
//!
//! This module contains the implementations for the various subcommands:
//! - `render` - Write the three-panel plot as SVG, PNG or JSON
//! - `sample` - Dump the time grid and both signals as CSV or JSON
//! - `session` - Print the effective session (or an example) as YAML
//! - `quiz` - Pick a random target figure and score the current settings
//! - `tui` - Interactive terminal UI (the default)

pub mod common;
pub mod quiz;
pub mod render;
pub mod sample;
pub mod session_file;
pub mod tui;

pub use common::ParamArgs;
pub use quiz::{cmd_quiz, QuizArgs};
pub use render::{cmd_render, RenderArgs};
pub use sample::{cmd_sample, SampleArgs};
pub use session_file::{cmd_session, SessionArgs};
pub use tui::run_tui;
