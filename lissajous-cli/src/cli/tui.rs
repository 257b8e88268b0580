//! Interactive terminal UI.
//!
//! Three charts across the top (x(t), y(t) and the figure itself), one
//! settings panel per axis plus a global panel below, and a status line
//! with diagnostics, the quiz score and the current tip. Every key press
//! that changes a setting runs a full render pass.

use std::f64::consts::PI;
use std::fs;
use std::io::{self, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
};

use lissajous::{render_svg, AxisConfig, Bounds, Figure, PhaseUnit, Session, Shape};

use super::quiz::{self, apply_solution, pick_target};

const FREQ_MIN: f64 = 1.0;
const FREQ_MAX: f64 = 20.0;
const AMP_MIN: f64 = 0.1;
const AMP_MAX: f64 = 5.0;
const AMP_STEP: f64 = 0.1;
/// Phase moves in 1/24 of a turn (15°).
const PHASE_STEPS: f64 = 24.0;
const T_END_MIN: f64 = 2.0 * PI;
const T_END_MAX: f64 = 20.0 * PI;
const T_END_STEP: f64 = PI / 2.0;
const POINTS_MIN: usize = 100;
const POINTS_MAX: usize = 5000;
const POINTS_STEP: usize = 100;
/// Multiplier for `[` / `]`.
const COARSE: i32 = 5;

/// Which settings panel has focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Panel {
    X,
    Y,
    Global,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Shape,
    Frequency,
    Amplitude,
    Phase,
    Expression,
    TimeRange,
    Points,
    Unit,
    Quiz,
}

impl Panel {
    fn fields(self) -> &'static [Field] {
        match self {
            Panel::X | Panel::Y => &[
                Field::Shape,
                Field::Frequency,
                Field::Amplitude,
                Field::Phase,
                Field::Expression,
            ],
            Panel::Global => &[Field::TimeRange, Field::Points, Field::Unit, Field::Quiz],
        }
    }

    fn next(self) -> Panel {
        match self {
            Panel::X => Panel::Y,
            Panel::Y => Panel::Global,
            Panel::Global => Panel::X,
        }
    }

    fn prev(self) -> Panel {
        match self {
            Panel::X => Panel::Global,
            Panel::Y => Panel::X,
            Panel::Global => Panel::Y,
        }
    }
}

/// Application state for the TUI.
pub struct App {
    /// Settings for the next render pass
    session: Session,
    /// Result of the last render pass
    figure: Figure,
    panel: Panel,
    /// Index into `panel.fields()`
    field: usize,
    /// Expression being typed, if any
    editing: Option<String>,
    /// One-off message (export done, etc.)
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(session: Session) -> Self {
        let (figure, session) = session.render();
        App {
            session,
            figure,
            panel: Panel::X,
            field: 0,
            editing: None,
            status: None,
            should_quit: false,
        }
    }

    fn recompute(&mut self) {
        let session = std::mem::take(&mut self.session);
        let (figure, next) = session.render();
        self.figure = figure;
        self.session = next;
    }

    fn focused(&self) -> Field {
        let fields = self.panel.fields();
        fields[self.field.min(fields.len() - 1)]
    }

    fn axis_mut(&mut self) -> Option<&mut AxisConfig> {
        match self.panel {
            Panel::X => Some(&mut self.session.x),
            Panel::Y => Some(&mut self.session.y),
            Panel::Global => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.editing.is_some() {
            self.handle_edit_key(key.code);
            return;
        }

        self.status = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.panel = self.panel.next();
                self.field = 0;
            }
            KeyCode::BackTab => {
                self.panel = self.panel.prev();
                self.field = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let n = self.panel.fields().len();
                self.field = (self.field + n - 1) % n;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.field = (self.field + 1) % self.panel.fields().len();
            }
            KeyCode::Left | KeyCode::Char('h') => self.adjust(-1),
            KeyCode::Right | KeyCode::Char('l') => self.adjust(1),
            KeyCode::Char('[') => self.adjust(-COARSE),
            KeyCode::Char(']') => self.adjust(COARSE),
            KeyCode::Enter => match self.focused() {
                Field::Expression => self.start_editing(),
                Field::Unit | Field::Quiz => self.adjust(1),
                _ => {}
            },
            KeyCode::Char('u') => {
                self.toggle_unit();
                self.recompute();
            }
            KeyCode::Char('z') => {
                self.toggle_quiz();
                self.recompute();
            }
            KeyCode::Char('n') => {
                self.session.quiz = Some(pick_target(None));
                self.recompute();
            }
            KeyCode::Char('g') => {
                if let Some(target) = self.session.quiz {
                    apply_solution(&mut self.session, &target);
                    self.status = Some("Target revealed".to_string());
                    self.recompute();
                }
            }
            KeyCode::Char('r') => {
                self.session = Session {
                    style: self.session.style.clone(),
                    ..Session::default()
                };
                self.recompute();
            }
            KeyCode::Char('e') => {
                self.status = Some(match self.export_svg(Path::new(".")) {
                    Ok(path) => format!("Exported {}", path.display()),
                    Err(e) => format!("Export failed: {:#}", e),
                });
            }
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Some(buffer) = self.editing.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                let text = buffer.trim().to_string();
                self.editing = None;
                if let Some(axis) = self.axis_mut() {
                    axis.expression = Some(text);
                    axis.set_shape(Shape::Arbitrary);
                }
                self.recompute();
            }
            _ => {}
        }
    }

    fn start_editing(&mut self) {
        let current = match self.panel {
            Panel::X => self.session.x.expression.clone(),
            Panel::Y => self.session.y.expression.clone(),
            Panel::Global => return,
        };
        self.editing = Some(current.unwrap_or_default());
    }

    /// Step the focused field by `steps` (negative = down) and re-render.
    fn adjust(&mut self, steps: i32) {
        let d = steps as f64;
        let unit = self.session.phase_unit;
        match self.focused() {
            Field::Shape => {
                if let Some(axis) = self.axis_mut() {
                    let shape = match axis.shape() {
                        Some(s) if steps > 0 => s.next(),
                        Some(s) => s.prev(),
                        None => Shape::Sine,
                    };
                    axis.set_shape(shape);
                }
            }
            Field::Frequency => {
                if let Some(axis) = self.axis_mut() {
                    axis.frequency = (axis.frequency.round() + d).clamp(FREQ_MIN, FREQ_MAX);
                }
            }
            Field::Amplitude => {
                if let Some(axis) = self.axis_mut() {
                    let a = ((axis.amplitude + d * AMP_STEP) / AMP_STEP).round() * AMP_STEP;
                    axis.amplitude = a.clamp(AMP_MIN, AMP_MAX);
                }
            }
            Field::Phase => {
                if let Some(axis) = self.axis_mut() {
                    let turn = unit.full_turn();
                    axis.phase = (axis.phase + d * turn / PHASE_STEPS).rem_euclid(turn);
                }
            }
            Field::Expression => return,
            Field::TimeRange => {
                let time = &mut self.session.time;
                time.end = (time.end + d * T_END_STEP).clamp(T_END_MIN, T_END_MAX);
            }
            Field::Points => {
                let time = &mut self.session.time;
                // a density-driven grid steps from what is on screen
                let current = match time.density.take() {
                    Some(_) => self.figure.grid.len(),
                    None => time.points,
                };
                let points = current as i64 + steps as i64 * POINTS_STEP as i64;
                time.points = points.clamp(POINTS_MIN as i64, POINTS_MAX as i64) as usize;
            }
            Field::Unit => self.toggle_unit(),
            Field::Quiz => self.toggle_quiz(),
        }
        self.recompute();
    }

    fn toggle_unit(&mut self) {
        let unit = match self.session.phase_unit {
            PhaseUnit::Radians => PhaseUnit::Degrees,
            PhaseUnit::Degrees => PhaseUnit::Radians,
        };
        self.session.set_phase_unit(unit);
    }

    fn toggle_quiz(&mut self) {
        self.session.quiz = match self.session.quiz {
            Some(_) => None,
            None => Some(pick_target(None)),
        };
    }

    /// Write the current figure to `dir` with a timestamped name.
    fn export_svg(&self, dir: &Path) -> Result<PathBuf> {
        let svg = render_svg(&self.figure, &self.session.style)?;
        let name = format!("lissajous_{}.svg", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(name);
        fs::write(&path, svg).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Run the TUI until the user quits.
pub fn run_tui(session: Session) -> Result<()> {
    // Initialize terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    stdout().execute(EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout())).context("Failed to open terminal")?;

    let mut app = App::new(session);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    stdout().execute(LeaveAlternateScreen).context("Failed to leave alternate screen")?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui(frame, app)).context("Draw error")?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(7), Constraint::Length(5)])
        .split(frame.area());

    let chart_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(main_layout[0]);

    draw_charts(frame, &chart_layout, &app.figure);

    let settings_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)])
        .split(main_layout[1]);

    draw_axis_panel(frame, settings_layout[0], app, Panel::X, " x(t) Settings ", Color::Blue);
    draw_axis_panel(frame, settings_layout[1], app, Panel::Y, " y(t) Settings ", Color::Green);
    draw_global_panel(frame, settings_layout[2], app);
    draw_status(frame, main_layout[2], app);
}

fn finite_pairs(ts: impl Iterator<Item = f64>, values: &[f64]) -> Vec<(f64, f64)> {
    ts.zip(values.iter().copied())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .collect()
}

fn pairs_bounds(series: &[(Vec<(f64, f64)>, Color)]) -> Option<Bounds> {
    series
        .iter()
        .filter_map(|(data, _)| {
            Bounds::from_points(data.iter().map(|&(x, y)| lissajous::Point::new(x, y)))
        })
        .reduce(|a, b| a.union(&b))
}

fn draw_charts(frame: &mut Frame, areas: &[Rect], figure: &Figure) {
    let grid = &figure.grid;
    let overlay = figure.overlay.as_ref();

    let mut x_series = Vec::new();
    let mut y_series = Vec::new();
    let mut xy_series = Vec::new();
    if let Some(o) = overlay {
        x_series.push((finite_pairs(grid.iter(), o.x.values()), Color::DarkGray));
        y_series.push((finite_pairs(grid.iter(), o.y.values()), Color::DarkGray));
        xy_series.push((finite_pairs(o.x.values().iter().copied(), o.y.values()), Color::DarkGray));
    }
    x_series.push((finite_pairs(grid.iter(), figure.x.values()), Color::Blue));
    y_series.push((finite_pairs(grid.iter(), figure.y.values()), Color::Green));
    xy_series.push((finite_pairs(figure.x.values().iter().copied(), figure.y.values()), Color::Red));

    let time_bounds = |series: &[(Vec<(f64, f64)>, Color)]| {
        let b = pairs_bounds(series)
            .unwrap_or(Bounds::new(grid.start(), -1.0, grid.end(), 1.0))
            .padded(0.05);
        Bounds::new(grid.start(), b.min_y, grid.end(), b.max_y)
    };
    let xy_bounds = pairs_bounds(&xy_series)
        .unwrap_or(Bounds::new(-1.0, -1.0, 1.0, 1.0))
        .padded(0.05)
        .squared();

    draw_chart(frame, areas[0], "x(t) vs t", ("t", "x(t)"), &x_series, time_bounds(&x_series));
    draw_chart(frame, areas[1], "y(t) vs t", ("t", "y(t)"), &y_series, time_bounds(&y_series));
    draw_chart(frame, areas[2], "Lissajous Figure: y(t) vs x(t)", ("x(t)", "y(t)"), &xy_series, xy_bounds);
}

fn draw_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    (x_title, y_title): (&str, &str),
    series: &[(Vec<(f64, f64)>, Color)],
    bounds: Bounds,
) {
    let datasets: Vec<Dataset> = series
        .iter()
        .map(|(data, color)| {
            Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" {} ", title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .title(x_title)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([bounds.min_x, bounds.max_x])
                .labels(axis_labels(bounds.min_x, bounds.max_x)),
        )
        .y_axis(
            Axis::default()
                .title(y_title)
                .style(Style::default().fg(Color::DarkGray))
                .bounds([bounds.min_y, bounds.max_y])
                .labels(axis_labels(bounds.min_y, bounds.max_y)),
        );

    frame.render_widget(chart, area);
}

fn axis_labels(min: f64, max: f64) -> Vec<Span<'static>> {
    [min, (min + max) / 2.0, max]
        .iter()
        .map(|v| Span::raw(format!("{:.1}", v)))
        .collect()
}

fn field_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let marker = if focused { "► " } else { "  " };
    Line::from(Span::styled(format!("{}{:<10} {}", marker, label, value), style))
}

fn phase_value(phase: f64, unit: PhaseUnit) -> String {
    match unit {
        PhaseUnit::Radians => format!("{:.3} rad ({:.2}π)", phase, phase / PI),
        PhaseUnit::Degrees => format!("{:.0}°", phase),
    }
}

fn draw_axis_panel(frame: &mut Frame, area: Rect, app: &App, panel: Panel, title: &str, color: Color) {
    let axis = match panel {
        Panel::X => &app.session.x,
        _ => &app.session.y,
    };
    let has_focus = app.panel == panel;
    let focus = |field: Field| has_focus && app.focused() == field;

    let shape = axis
        .shape()
        .map(|s| s.label().to_string())
        .unwrap_or_else(|| format!("? {}", axis.shape));
    let expression = match (&app.editing, has_focus) {
        (Some(buffer), true) => format!("{}_", buffer),
        _ => axis.expression.clone().unwrap_or_else(|| "-".to_string()),
    };

    let lines = vec![
        field_line("Shape", shape, focus(Field::Shape)),
        field_line("Frequency", format!("{}", axis.frequency), focus(Field::Frequency)),
        field_line("Amplitude", format!("{:.1}", axis.amplitude), focus(Field::Amplitude)),
        field_line("Phase", phase_value(axis.phase, app.session.phase_unit), focus(Field::Phase)),
        field_line("Expr", expression, focus(Field::Expression)),
    ];

    let border = if has_focus { Color::Yellow } else { color };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_global_panel(frame: &mut Frame, area: Rect, app: &App) {
    let has_focus = app.panel == Panel::Global;
    let focus = |field: Field| has_focus && app.focused() == field;
    let time = &app.session.time;

    let points = match time.density {
        Some(d) => format!("{} ({}/unit)", app.figure.grid.len(), d),
        None => format!("{}", time.points),
    };
    let unit = match app.session.phase_unit {
        PhaseUnit::Radians => "radians",
        PhaseUnit::Degrees => "degrees",
    };
    let quiz = if app.session.quiz.is_some() { "on" } else { "off" };

    let lines = vec![
        field_line("Time", format!("{:.2} .. {:.2} ({:.1}π)", time.start, time.end, time.end / PI), focus(Field::TimeRange)),
        field_line("Points", points, focus(Field::Points)),
        field_line("Phase in", unit.to_string(), focus(Field::Unit)),
        field_line("Quiz", quiz.to_string(), focus(Field::Quiz)),
    ];

    let border = if has_focus { Color::Yellow } else { Color::Magenta };
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(" Global Settings ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    frame.render_widget(paragraph, area);
}

/// Score plus the frequency-ratio hint, while a quiz is running.
fn quiz_line(app: &App) -> Option<(String, Color)> {
    let score = app.figure.quiz_score()?;
    let hint = app.session.quiz.as_ref().map(quiz::hint).unwrap_or_default();
    Some(if score.solved {
        (format!("Quiz: matched! (distance {:.3})", score.distance), Color::Green)
    } else {
        (format!("Quiz: distance {:.3}  hint: {}", score.distance, hint), Color::Yellow)
    })
}

fn draw_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    for message in app.figure.messages() {
        lines.push(Line::from(Span::styled(message, Style::default().fg(Color::Red))));
    }
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(status.clone(), Style::default().fg(Color::Green))));
    }
    if let Some((text, color)) = quiz_line(app) {
        lines.push(Line::from(Span::styled(text, Style::default().fg(color))));
    }
    if let Some(tip) = &app.figure.tip {
        lines.push(Line::from(Span::styled(
            format!("Tip: {}", tip),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let help = if app.editing.is_some() {
        "type formula in t  Enter apply  Esc cancel"
    } else {
        "Tab panel  ↑↓ field  ←→ adjust  [] coarse  Enter edit  u unit  z quiz  n new  g give up  e export  r reset  q quit"
    };
    lines.push(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(paragraph, area);
}
