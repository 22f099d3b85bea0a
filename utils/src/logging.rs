use std::env;

use chrono::Local;
use log::LevelFilter;

/// Level from `LOG_LEVEL`, `warn` when unset or unrecognized.
pub fn log_level_from_env() -> LevelFilter {
    parse_log_level(env::var("LOG_LEVEL").ok().as_deref())
}

fn parse_log_level(value: Option<&str>) -> LevelFilter {
    match value {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("info") => LevelFilter::Info,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Warn,
    }
}

// Stdout carries the rendered template, so every log line goes to stderr.
pub fn setup_logging() -> Result<(), fern::InitError> {
    let level = log_level_from_env();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}] {}: {}",
                Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
