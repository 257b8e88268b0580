//! Logger setup for the CLI and TUI.

use env_logger::Env;

/// Initialize the logger with a format that stays readable in raw terminal
/// mode. `default_filter` applies when `RUST_LOG` is unset.
pub fn init_logger(default_filter: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "\r[{} {:5} {}] {}",
                buf.timestamp(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();
}
