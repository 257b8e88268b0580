//! The `render` command: write the three-panel plot.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use lissajous::{render_svg, Figure, QuizScore, Session};

use super::common::{write_output, ParamArgs};

/// Output format for the render command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    Svg,
    Png,
    Json,
}

impl RenderFormat {
    /// Guess from a file extension, falling back to SVG.
    fn from_path(path: Option<&Path>) -> RenderFormat {
        let ext = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => RenderFormat::Png,
            Some("json") => RenderFormat::Json,
            _ => RenderFormat::Svg,
        }
    }
}

/// Arguments for `lissajous render`.
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Output file (stdout when omitted; required for PNG)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output extension, else SVG)
    #[arg(short, long, value_enum)]
    pub format: Option<RenderFormat>,

    /// PNG scale factor
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

/// Figure data as written by `render --format json`.
#[derive(Serialize)]
struct FigureJson<'a> {
    t: &'a [f64],
    x: &'a lissajous::Signal,
    y: &'a lissajous::Signal,
    x_label: &'a str,
    y_label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<OverlayJson<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quiz: Option<QuizScore>,
    diagnostics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tip: Option<&'a str>,
}

#[derive(Serialize)]
struct OverlayJson<'a> {
    x: &'a lissajous::Signal,
    y: &'a lissajous::Signal,
}

impl<'a> FigureJson<'a> {
    fn new(figure: &'a Figure) -> Self {
        Self {
            t: figure.grid.samples(),
            x: &figure.x,
            y: &figure.y,
            x_label: &figure.x_label,
            y_label: &figure.y_label,
            overlay: figure.overlay.as_ref().map(|o| OverlayJson { x: &o.x, y: &o.y }),
            quiz: figure.quiz_score(),
            diagnostics: figure.messages(),
            tip: figure.tip.as_deref(),
        }
    }
}

/// Serialize a figure as pretty JSON. Non-finite samples become `null`.
pub fn figure_json(figure: &Figure) -> Result<String> {
    serde_json::to_string_pretty(&FigureJson::new(figure)).context("Failed to serialize figure")
}

/// Execute the render command.
pub fn cmd_render(params: &ParamArgs, args: &RenderArgs) -> Result<()> {
    let session = params.build_session()?;
    render_session(session, args)
}

/// Render `session` in the requested format. Also used by `quiz`.
pub fn render_session(session: Session, args: &RenderArgs) -> Result<()> {
    let output = args.output.as_deref();
    let format = args.format.unwrap_or_else(|| RenderFormat::from_path(output));
    let style = session.style.clone();
    let (figure, _) = session.render();

    match format {
        RenderFormat::Svg => {
            let svg = render_svg(&figure, &style)?;
            write_output(output, svg.as_bytes())
        }
        RenderFormat::Json => {
            let json = figure_json(&figure)?;
            write_output(output, format!("{}\n", json).as_bytes())
        }
        RenderFormat::Png => {
            let path = output.ok_or_else(|| anyhow!("PNG output needs --output <FILE>"))?;
            if !args.scale.is_finite() || args.scale <= 0.0 || args.scale > 8.0 {
                bail!("--scale must be in (0, 8], got {}", args.scale);
            }
            let svg = render_svg(&figure, &style)?;
            generate_png(&svg, path, args.scale)
        }
    }
}

/// Rasterize an SVG document and save it as PNG.
pub fn generate_png(svg_content: &str, png_path: &Path, scale: f64) -> Result<()> {
    use resvg::usvg;
    use tiny_skia::Pixmap;

    eprint!("Generating PNG at {}x scale...", scale);

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg_content, &options).context("Failed to parse generated SVG")?;

    let size = tree.size();
    let pixmap_width = (size.width() as f64 * scale).ceil() as u32;
    let pixmap_height = (size.height() as f64 * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(pixmap_width, pixmap_height)
        .ok_or_else(|| anyhow!("could not create a {}x{} pixmap", pixmap_width, pixmap_height))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let transform = tiny_skia::Transform::from_scale(scale as f32, scale as f32);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .save_png(png_path)
        .with_context(|| format!("Failed to write {}", png_path.display()))?;
    eprintln!(" done!\nWrote: {} ({}x{})", png_path.display(), pixmap_width, pixmap_height);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(RenderFormat::from_path(Some(Path::new("a.PNG"))), RenderFormat::Png);
        assert_eq!(RenderFormat::from_path(Some(Path::new("a.json"))), RenderFormat::Json);
        assert_eq!(RenderFormat::from_path(Some(Path::new("a.svg"))), RenderFormat::Svg);
        assert_eq!(RenderFormat::from_path(None), RenderFormat::Svg);
    }

    #[test]
    fn json_keeps_every_sample_and_nulls_non_finite() {
        let figure = Session::symbolic("1/t", "t").figure();
        let json: serde_json::Value = serde_json::from_str(&figure_json(&figure).unwrap()).unwrap();
        assert_eq!(json["t"].as_array().unwrap().len(), 1000);
        assert_eq!(json["x"].as_array().unwrap().len(), 1000);
        assert!(json["x"][0].is_null());
        assert_eq!(json["x_label"], "1/t");
        assert!(json.get("overlay").is_none());
    }

    #[test]
    fn png_is_written() {
        let path = std::env::temp_dir().join(format!("lissajous-render-{}.png", std::process::id()));
        let session = Session { show_tips: false, ..Session::default() };
        let args = RenderArgs { output: Some(path.clone()), format: None, scale: 0.5 };
        render_session(session, &args).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn png_needs_a_path() {
        let args = RenderArgs { output: None, format: Some(RenderFormat::Png), scale: 1.0 };
        assert!(render_session(Session::default(), &args).is_err());
    }
}
