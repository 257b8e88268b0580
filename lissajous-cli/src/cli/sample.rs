//! The `sample` command: dump the time grid and both signals.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use lissajous::Figure;

use super::common::{write_output, ParamArgs};

/// Output format for the sample command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SampleFormat {
    Csv,
    Json,
}

/// Arguments for `lissajous sample`.
#[derive(Args, Debug, Clone)]
pub struct SampleArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = SampleFormat::Csv)]
    pub format: SampleFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SamplesJson<'a> {
    t: &'a [f64],
    x: &'a [f64],
    y: &'a [f64],
}

/// `t,x,y` rows with a header line.
pub fn to_csv(figure: &Figure) -> String {
    let mut out = String::from("t,x,y\n");
    for ((t, x), y) in figure.grid.iter().zip(figure.x.values()).zip(figure.y.values()) {
        // writing to a String can't fail
        let _ = writeln!(out, "{},{},{}", t, x, y);
    }
    out
}

pub fn to_json(figure: &Figure) -> Result<String> {
    let samples = SamplesJson {
        t: figure.grid.samples(),
        x: figure.x.values(),
        y: figure.y.values(),
    };
    serde_json::to_string(&samples).context("Failed to serialize samples")
}

/// Execute the sample command.
pub fn cmd_sample(params: &ParamArgs, args: &SampleArgs) -> Result<()> {
    let session = params.build_session()?;
    let (figure, _) = session.render();

    let content = match args.format {
        SampleFormat::Csv => to_csv(&figure),
        SampleFormat::Json => to_json(&figure)? + "\n",
    };
    write_output(args.output.as_deref(), content.as_bytes())
}
