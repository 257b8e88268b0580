//! Integration tests for the lissajous CLI commands.
//!
//! These tests run the actual binary and verify end-to-end behavior.

use std::path::PathBuf;
use std::process::{Command, Output};

/// Path to the built `lissajous` binary.
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lissajous"))
}

fn run(args: &[&str]) -> Output {
    Command::new(binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("lissajous-it-{}-{}", std::process::id(), name))
}

#[test]
fn shapes_command_lists_all_shapes() {
    let output = run(&["shapes"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for shape in ["sine", "cosine", "square", "triangle", "sawtooth", "arbitrary"] {
        assert!(stdout.contains(shape), "Should list '{}'", shape);
    }
    assert!(stdout.contains("atan2"), "Should list two-argument functions");
}

#[test]
fn render_command_produces_svg() {
    let output = run(&["render"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("<?xml"), "Should have XML declaration");
    assert!(stdout.contains("<svg"), "Should have SVG element");
    assert!(stdout.contains("x(t) vs t"), "Should have x panel title");
    assert!(stdout.contains("y(t) vs t"), "Should have y panel title");
    assert!(stdout.contains("Lissajous Figure: y(t) vs x(t)"), "Should have figure title");
    assert!(stdout.contains("<polyline"), "Should have curves");
    assert!(stdout.contains("</svg>"), "Should close SVG element");
}

#[test]
fn render_command_writes_json_file() {
    let path = temp_path("figure.json");
    let output = run(&["render", "-o", path.to_str().unwrap(), "--points", "200"]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(&path).expect("JSON file should exist");
    let _ = std::fs::remove_file(&path);
    let json: serde_json::Value = serde_json::from_str(&content).expect("Should be valid JSON");
    assert_eq!(json["t"].as_array().unwrap().len(), 200);
    assert_eq!(json["y"].as_array().unwrap().len(), 200);
}

#[test]
fn render_command_writes_png() {
    let path = temp_path("figure.png");
    let output = run(&["render", "-o", path.to_str().unwrap(), "--scale", "0.5", "--no-tips"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(&path).expect("PNG file should exist");
    let _ = std::fs::remove_file(&path);
    assert_eq!(&bytes[1..4], b"PNG");
}

#[test]
fn bad_expression_still_renders_with_warning() {
    let output = run(&["render", "--x-expr", "t +"]);
    assert!(output.status.success(), "A bad formula must not fail the render");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("</svg>"));
    assert!(stderr.contains("invalid expression"), "stderr was: {}", stderr);
    assert!(stdout.contains("invalid expression"), "Diagnostic should be drawn in the plot");
}

#[test]
fn unknown_shape_renders_flat() {
    let output = run(&["sample", "--x-shape", "hexagon", "--points", "10"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 10);
    for row in rows {
        let x = row.split(',').nth(1).unwrap();
        assert_eq!(x, "0", "x should be zero in row {}", row);
    }
}

#[test]
fn sample_command_csv_and_json() {
    let csv = run(&["sample", "--points", "50"]);
    assert!(csv.status.success());
    let stdout = String::from_utf8_lossy(&csv.stdout);
    assert_eq!(stdout.lines().next(), Some("t,x,y"));
    assert_eq!(stdout.lines().count(), 51);

    let json = run(&["sample", "--format", "json", "--density", "10", "--t-end", "5"]);
    assert!(json.status.success());
    let value: serde_json::Value = serde_json::from_slice(&json.stdout).expect("Should be valid JSON");
    assert_eq!(value["t"].as_array().unwrap().len(), 50);
}

#[test]
fn default_figure_stays_in_unit_square() {
    let output = run(&["sample", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let xs = value["x"].as_array().unwrap();
    let ys = value["y"].as_array().unwrap();
    assert_eq!(xs.len(), 1000);
    for (x, y) in xs.iter().zip(ys) {
        assert!(x.as_f64().unwrap().abs() <= 1.0 + 1e-12);
        assert!(y.as_f64().unwrap().abs() <= 1.0 + 1e-12);
    }
}

#[test]
fn session_example_round_trips() {
    let example = run(&["session", "--example"]);
    assert!(example.status.success());

    let path = temp_path("example.yaml");
    std::fs::write(&path, &example.stdout).unwrap();
    let output = run(&["--session", path.to_str().unwrap(), "session", "--y-freq", "7"]);
    let _ = std::fs::remove_file(&path);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frequency: 7"), "override should apply: {}", stdout);
    assert!(stdout.contains("sin(2*pi*4*t + pi/2)"), "file values should survive");
}

#[test]
fn invalid_settings_exit_with_error() {
    let output = run(&["render", "--x-freq", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("frequency"));

    let output = run(&["render", "--session", "/no/such/session.yaml"]);
    assert!(!output.status.success());
}

#[test]
fn quiz_command_is_seeded() {
    let first = run(&["quiz", "--seed", "11", "--reveal"]);
    let second = run(&["quiz", "--seed", "11", "--reveal"]);
    assert!(first.status.success());

    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("distance:"));
    assert!(stdout.contains("target x:"));
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn quiz_hint_prints_frequency_ratio() {
    let output = run(&["quiz", "--seed", "5", "--hint"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let hint = stdout.lines().find(|l| l.starts_with("hint: ratio ")).expect("Should print a hint");
    let ratio = hint.trim_start_matches("hint: ratio ");
    let parts: Vec<u64> = ratio.split(':').map(|n| n.parse().unwrap()).collect();
    assert_eq!(parts.len(), 2);
    assert!(!stdout.contains("target x:"), "hint alone must not reveal the target");
}

#[test]
fn help_shows_subcommands() {
    let output = run(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["render", "sample", "shapes", "session", "quiz", "tui"] {
        assert!(stdout.contains(command), "Should mention {}", command);
    }
}
