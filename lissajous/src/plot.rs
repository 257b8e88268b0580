//! SVG plot writer.
//!
//! Draws a [`Figure`] as three side-by-side panels: `x(t) vs t`,
//! `y(t) vs t` and the parametric curve `y(t) vs x(t)` at equal aspect.
//! Each panel gets a frame, grid lines at "nice" tick values, tick labels,
//! axis labels and a title. Diagnostics, the quiz score and the current tip
//! go in a footer under the panels.
//!
//! ## Rust Lesson #9: Builders over string pasting
//!
//! Text from the user (expressions, shape names) ends up in the document.
//! Writing elements through `quick_xml::Writer` means every attribute and
//! text node is escaped for us, so a stray `<` or `&` can't break the file.

use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::figure::{Axis, Figure};
use crate::geometry::{split_finite, Bounds, Point, Rect};

/// Error type for plot rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotError {
    /// A style color that SVG can't understand.
    InvalidColor { field: &'static str, value: String },
    /// Panel size or stroke width out of range.
    InvalidSize(String),
    Xml(String),
}

impl std::fmt::Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotError::InvalidColor { field, value } => {
                write!(f, "invalid color '{}' for {}", value, field)
            }
            PlotError::InvalidSize(msg) => write!(f, "invalid plot size: {}", msg),
            PlotError::Xml(msg) => write!(f, "SVG write error: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {}

/// Colors and sizes for the three panels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    /// Width of one panel in px (the document is three panels wide).
    pub panel_width: f64,
    pub panel_height: f64,
    pub background: String,
    pub x_color: String,
    pub y_color: String,
    pub curve_color: String,
    /// Quiz target overlay.
    pub overlay_color: String,
    pub overlay_opacity: f64,
    pub stroke_width: f64,
    pub show_grid: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            panel_width: 480.0,
            panel_height: 400.0,
            background: "white".to_string(),
            x_color: "royalblue".to_string(),
            y_color: "green".to_string(),
            curve_color: "crimson".to_string(),
            overlay_color: "gray".to_string(),
            overlay_opacity: 0.6,
            stroke_width: 1.5,
            show_grid: true,
        }
    }
}

impl PlotStyle {
    /// Check colors parse as SVG colors and sizes are usable.
    pub fn validate(&self) -> Result<(), PlotError> {
        let colors = [
            ("background", &self.background),
            ("x_color", &self.x_color),
            ("y_color", &self.y_color),
            ("curve_color", &self.curve_color),
            ("overlay_color", &self.overlay_color),
        ];
        for (field, value) in colors {
            if svgtypes::Color::from_str(value).is_err() {
                return Err(PlotError::InvalidColor { field, value: value.clone() });
            }
        }

        let sizes = [("panel_width", self.panel_width), ("panel_height", self.panel_height)];
        for (field, value) in sizes {
            if !value.is_finite() || !(MIN_PANEL..=MAX_PANEL).contains(&value) {
                return Err(PlotError::InvalidSize(format!(
                    "{} must be between {} and {}, got {}",
                    field, MIN_PANEL, MAX_PANEL, value
                )));
            }
        }
        if !self.stroke_width.is_finite() || self.stroke_width <= 0.0 {
            return Err(PlotError::InvalidSize(format!(
                "stroke_width must be positive, got {}",
                self.stroke_width
            )));
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(PlotError::InvalidSize(format!(
                "overlay_opacity must be in [0, 1], got {}",
                self.overlay_opacity
            )));
        }
        Ok(())
    }

    /// Full document size `(width, height)` for a figure with
    /// `footer_lines` lines of text under the panels.
    pub fn document_size(&self, footer_lines: usize) -> (f64, f64) {
        let footer = if footer_lines == 0 { 0.0 } else { FOOTER_PAD + LINE_HEIGHT * footer_lines as f64 };
        (3.0 * self.panel_width, self.panel_height + footer)
    }
}

const MIN_PANEL: f64 = 100.0;
const MAX_PANEL: f64 = 10_000.0;

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_TOP: f64 = 48.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 46.0;
const LINE_HEIGHT: f64 = 18.0;
const FOOTER_PAD: f64 = 10.0;
const TICK_TARGET: usize = 6;

/// One panel's worth of drawing instructions.
struct Panel<'a> {
    title: &'a str,
    subtitle: &'a str,
    x_label: &'a str,
    y_label: &'a str,
    bounds: Bounds,
    equal_aspect: bool,
    series: Vec<Series>,
}

struct Series {
    points: Vec<Point>,
    color: String,
    opacity: f64,
    dashed: bool,
}

/// Render `figure` as a standalone SVG document.
pub fn render_svg(figure: &Figure, style: &PlotStyle) -> Result<String, PlotError> {
    style.validate()?;

    let footer = footer_lines(figure);
    let (width, height) = style.document_size(footer.len());
    log::debug!("rendering {}x{} svg, {} samples", width, height, figure.grid.len());

    let mut svg = SvgWriter::new();
    svg.decl()?;
    svg.open(
        "svg",
        &[
            ("xmlns", "http://www.w3.org/2000/svg".to_string()),
            ("width", num(width)),
            ("height", num(height)),
            ("viewBox", format!("0 0 {} {}", num(width), num(height))),
            ("font-family", "sans-serif".to_string()),
        ],
    )?;
    svg.empty(
        "rect",
        &[
            ("width", num(width)),
            ("height", num(height)),
            ("fill", style.background.clone()),
        ],
    )?;

    for (i, panel) in panels(figure, style).iter().enumerate() {
        let area = Rect::new(i as f64 * style.panel_width, 0.0, style.panel_width, style.panel_height);
        draw_panel(&mut svg, panel, area, style)?;
    }

    let mut y = style.panel_height + FOOTER_PAD + LINE_HEIGHT * 0.7;
    for (line, kind) in &footer {
        let fill = match kind {
            FooterKind::Warning => "firebrick",
            FooterKind::Score => "black",
            FooterKind::Tip => "dimgray",
        };
        svg.text(
            &[
                ("x", num(MARGIN_LEFT / 2.0)),
                ("y", num(y)),
                ("font-size", "13".to_string()),
                ("fill", fill.to_string()),
            ],
            line,
        )?;
        y += LINE_HEIGHT;
    }

    svg.close("svg")?;
    svg.finish()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FooterKind {
    Warning,
    Score,
    Tip,
}

fn footer_lines(figure: &Figure) -> Vec<(String, FooterKind)> {
    let mut lines: Vec<(String, FooterKind)> = figure
        .messages()
        .into_iter()
        .map(|m| (format!("Warning: {}", m), FooterKind::Warning))
        .collect();
    if let Some(score) = figure.quiz_score() {
        let verdict = if score.solved { "matched!" } else { "keep going" };
        lines.push((format!("Quiz distance: {:.3} ({})", score.distance, verdict), FooterKind::Score));
    }
    if let Some(tip) = &figure.tip {
        lines.push((format!("Tip: {}", tip), FooterKind::Tip));
    }
    lines
}

fn panels<'a>(figure: &'a Figure, style: &PlotStyle) -> [Panel<'a>; 3] {
    let overlay = figure.overlay.as_ref();
    let t_series = |values: &[f64]| -> Vec<Point> {
        figure.grid.iter().zip(values).map(|(t, v)| Point::new(t, *v)).collect()
    };
    let overlay_series = |points: Vec<Point>| Series {
        points,
        color: style.overlay_color.clone(),
        opacity: style.overlay_opacity,
        dashed: true,
    };
    let solid = |points: Vec<Point>, color: &str| Series {
        points,
        color: color.to_string(),
        opacity: 1.0,
        dashed: false,
    };

    let mut x_series = Vec::new();
    let mut y_series = Vec::new();
    let mut xy_series = Vec::new();
    if let Some(o) = overlay {
        x_series.push(overlay_series(t_series(o.x.values())));
        y_series.push(overlay_series(t_series(o.y.values())));
    }
    if let Some(points) = figure.overlay_curve() {
        xy_series.push(overlay_series(points));
    }
    x_series.push(solid(figure.time_series(Axis::X), &style.x_color));
    y_series.push(solid(figure.time_series(Axis::Y), &style.y_color));
    xy_series.push(solid(figure.curve(), &style.curve_color));

    let time_bounds = |series: &[Series]| {
        let fallback = Bounds::new(figure.grid.start(), -1.0, figure.grid.end(), 1.0);
        series_bounds(series).unwrap_or(fallback).padded(0.05)
    };
    let x_bounds = time_bounds(&x_series);
    let y_bounds = time_bounds(&y_series);
    let xy_bounds = series_bounds(&xy_series)
        .unwrap_or(Bounds::new(-1.0, -1.0, 1.0, 1.0))
        .padded(0.05)
        .squared();

    [
        Panel {
            title: "x(t) vs t",
            subtitle: &figure.x_label,
            x_label: "t",
            y_label: "x(t)",
            bounds: x_bounds,
            equal_aspect: false,
            series: x_series,
        },
        Panel {
            title: "y(t) vs t",
            subtitle: &figure.y_label,
            x_label: "t",
            y_label: "y(t)",
            bounds: y_bounds,
            equal_aspect: false,
            series: y_series,
        },
        Panel {
            title: "Lissajous Figure: y(t) vs x(t)",
            subtitle: "",
            x_label: "x(t)",
            y_label: "y(t)",
            bounds: xy_bounds,
            equal_aspect: true,
            series: xy_series,
        },
    ]
}

fn series_bounds(series: &[Series]) -> Option<Bounds> {
    series
        .iter()
        .filter_map(|s| Bounds::from_points(s.points.iter().copied()))
        .reduce(|a, b| a.union(&b))
}

fn draw_panel(svg: &mut SvgWriter, panel: &Panel<'_>, area: Rect, style: &PlotStyle) -> Result<(), PlotError> {
    let mut plot = area.inset(MARGIN_LEFT, MARGIN_TOP, MARGIN_RIGHT, MARGIN_BOTTOM);
    if panel.equal_aspect {
        plot = plot.centered_square();
    }
    let b = &panel.bounds;

    svg.open("g", &[])?;

    // ticks and grid
    let x_ticks = nice_ticks(b.min_x, b.max_x, TICK_TARGET);
    let y_ticks = nice_ticks(b.min_y, b.max_y, TICK_TARGET);
    let x_step = tick_step(&x_ticks);
    let y_step = tick_step(&y_ticks);

    for &tx in &x_ticks {
        let p = b.project(Point::new(tx, b.min_y), &plot);
        if style.show_grid {
            svg.empty("line", &line_attrs(p.x, plot.y, p.x, plot.y + plot.height, "#dddddd"))?;
        }
        svg.text(
            &[
                ("x", num(p.x)),
                ("y", num(plot.y + plot.height + 16.0)),
                ("font-size", "11".to_string()),
                ("text-anchor", "middle".to_string()),
            ],
            &format_tick(tx, x_step),
        )?;
    }
    for &ty in &y_ticks {
        let p = b.project(Point::new(b.min_x, ty), &plot);
        if style.show_grid {
            svg.empty("line", &line_attrs(plot.x, p.y, plot.x + plot.width, p.y, "#dddddd"))?;
        }
        svg.text(
            &[
                ("x", num(plot.x - 6.0)),
                ("y", num(p.y + 4.0)),
                ("font-size", "11".to_string()),
                ("text-anchor", "end".to_string()),
            ],
            &format_tick(ty, y_step),
        )?;
    }

    // data, clipped to the plot frame by construction of the bounds
    for series in &panel.series {
        for line in split_finite(series.points.iter().copied()) {
            if line.len() < 2 {
                continue;
            }
            let points = line
                .iter()
                .map(|p| {
                    let q = b.project(*p, &plot);
                    format!("{:.2},{:.2}", q.x, q.y)
                })
                .collect::<Vec<_>>()
                .join(" ");
            let mut attrs = vec![
                ("points", points),
                ("fill", "none".to_string()),
                ("stroke", series.color.clone()),
                ("stroke-width", num(style.stroke_width)),
                ("stroke-linejoin", "round".to_string()),
            ];
            if series.opacity < 1.0 {
                attrs.push(("stroke-opacity", num(series.opacity)));
            }
            if series.dashed {
                attrs.push(("stroke-dasharray", "6 4".to_string()));
            }
            svg.empty("polyline", &attrs)?;
        }
    }

    svg.empty(
        "rect",
        &[
            ("x", num(plot.x)),
            ("y", num(plot.y)),
            ("width", num(plot.width)),
            ("height", num(plot.height)),
            ("fill", "none".to_string()),
            ("stroke", "black".to_string()),
        ],
    )?;

    // labels
    let cx = area.x + area.width / 2.0;
    svg.text(
        &[
            ("x", num(cx)),
            ("y", num(20.0)),
            ("font-size", "15".to_string()),
            ("text-anchor", "middle".to_string()),
        ],
        panel.title,
    )?;
    if !panel.subtitle.is_empty() {
        svg.text(
            &[
                ("x", num(cx)),
                ("y", num(37.0)),
                ("font-size", "11".to_string()),
                ("text-anchor", "middle".to_string()),
                ("fill", "dimgray".to_string()),
            ],
            panel.subtitle,
        )?;
    }
    svg.text(
        &[
            ("x", num(plot.x + plot.width / 2.0)),
            ("y", num(plot.y + plot.height + 34.0)),
            ("font-size", "12".to_string()),
            ("text-anchor", "middle".to_string()),
        ],
        panel.x_label,
    )?;
    let (lx, ly) = (area.x + 14.0, plot.y + plot.height / 2.0);
    svg.text(
        &[
            ("x", num(lx)),
            ("y", num(ly)),
            ("font-size", "12".to_string()),
            ("text-anchor", "middle".to_string()),
            ("transform", format!("rotate(-90 {} {})", num(lx), num(ly))),
        ],
        panel.y_label,
    )?;

    svg.close("g")
}

fn line_attrs(x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) -> Vec<(&'static str, String)> {
    vec![
        ("x1", num(x1)),
        ("y1", num(y1)),
        ("x2", num(x2)),
        ("y2", num(y2)),
        ("stroke", stroke.to_string()),
        ("stroke-width", "1".to_string()),
    ]
}

/// Round-ish tick positions covering `[min, max]`, about `target` of them.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !span.is_finite() || span <= 0.0 {
        return Vec::new();
    }
    let step = nice_step(span / target.max(1) as f64);
    let first = (min / step).ceil();
    let last = (max / step).floor();

    let mut ticks = Vec::new();
    let mut k = first;
    while k <= last && ticks.len() <= 4 * target.max(1) {
        let v = k * step;
        // avoid printing "-0"
        ticks.push(if v == 0.0 { 0.0 } else { v });
        k += 1.0;
    }
    ticks
}

/// 1, 2 or 5 times a power of ten, nearest above `raw`.
fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

fn tick_step(ticks: &[f64]) -> f64 {
    match ticks {
        [a, b, ..] => b - a,
        _ => 1.0,
    }
}

/// Format a tick with just enough decimals for its step.
fn format_tick(value: f64, step: f64) -> String {
    let decimals = (-step.log10().floor()).clamp(0.0, 6.0) as usize;
    format!("{:.*}", decimals, value)
}

/// Coordinates with two decimals, trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Thin wrapper over `quick_xml::Writer` with SVG-shaped helpers.
struct SvgWriter {
    inner: Writer<Vec<u8>>,
}

impl SvgWriter {
    fn new() -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), PlotError> {
        self.inner
            .write_event(event)
            .map_err(|e| PlotError::Xml(e.to_string()))
    }

    fn decl(&mut self) -> Result<(), PlotError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    fn open(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<(), PlotError> {
        self.write(Event::Start(element(name, attrs)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, String)]) -> Result<(), PlotError> {
        self.write(Event::Empty(element(name, attrs)))
    }

    fn close(&mut self, name: &str) -> Result<(), PlotError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, attrs: &[(&str, String)], content: &str) -> Result<(), PlotError> {
        self.open("text", attrs)?;
        self.write(Event::Text(BytesText::new(content)))?;
        self.close("text")
    }

    fn finish(self) -> Result<String, PlotError> {
        String::from_utf8(self.inner.into_inner()).map_err(|e| PlotError::Xml(e.to_string()))
    }
}

fn element<'a>(name: &'a str, attrs: &[(&str, String)]) -> BytesStart<'a> {
    let mut elem = BytesStart::new(name);
    for (key, value) in attrs {
        elem.push_attribute((*key, value.as_str()));
    }
    elem
}

// ============================================================================
// TESTS
// ============================================================================
