//! # lissajous
//!
//! Lissajous figure generation: sample two waveforms over a shared time
//! grid and draw x(t), y(t) and the parametric curve y(t) vs x(t).
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! The crate is laid out bottom-up: `geometry` and `grid` know nothing about
//! waveforms, `waveform` and `expr` turn parameters into a [`Signal`], and
//! `session` ties it all together into one render pass that produces a
//! [`Figure`] for `plot` (or a terminal UI) to draw.

pub mod expr;
pub mod figure;
pub mod geometry;
pub mod grid;
pub mod plot;
pub mod quiz;
pub mod session;
pub mod signal;
pub mod waveform;

// Re-export common types at crate root for convenience.
pub use expr::{Expr, ExprError};
pub use figure::{Axis, Figure};
pub use geometry::{Bounds, Point};
pub use grid::{GridError, TimeConfig, TimeGrid};
pub use plot::{render_svg, PlotError, PlotStyle};
pub use quiz::{Overlay, QuizScore, QuizTarget};
pub use session::{AxisConfig, Session, SessionError, TIPS};
pub use signal::Signal;
pub use waveform::{sample_named, Diagnostic, Phase, PhaseUnit, Sampled, Shape, WaveParams};
