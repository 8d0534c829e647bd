//! Logging for the `qernel` application, built on `fern`.
//!
//! Info, debug and trace messages are written to stdout, and warnings and errors to stderr. Both
//! streams are colourised when attached to a terminal. When a run writes outputs, the same messages
//! are also copied into plain-text log files next to them.
use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Metadata, Record};
use std::env;
use std::fmt::Arguments;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::OnceLock;

/// Set once [`init`] has installed the logger
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The log level used when neither the environment nor the settings name one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable overriding the configured log level
pub const LOG_LEVEL_ENV_VAR: &str = "QERNEL_LOG_LEVEL";

/// Log file for messages below warning level
const INFO_LOG_FILE_NAME: &str = "qernel_info.log";

/// Log file for warnings and errors
const ERROR_LOG_FILE_NAME: &str = "qernel_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Install the program logger.
///
/// The level is taken from the `QERNEL_LOG_LEVEL` environment variable, then from
/// `log_level_from_settings`, then [`DEFAULT_LOG_LEVEL`]. Accepted names are `off`, `error`,
/// `warn`, `info`, `debug` and `trace`, in any case.
///
/// If `log_file_path` is given, `qernel_info.log` and `qernel_error.log` are created (or truncated)
/// in that directory.
pub fn init(log_level_from_settings: Option<&str>, log_file_path: Option<&Path>) -> Result<()> {
    let env_level = env::var(LOG_LEVEL_ENV_VAR).ok();
    let level = parse_log_level(&choose_log_level(
        env_level.as_deref(),
        log_level_from_settings,
    ))?;

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let stdout_colours = io::stdout().is_terminal().then_some(colours);
    let stderr_colours = io::stderr().is_terminal().then_some(colours);
    let mut dispatch = Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(below_warn)
                .format(move |out, message, record| {
                    format_message(out, message, record, stdout_colours.as_ref());
                })
                .level(level)
                .chain(io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    format_message(out, message, record, stderr_colours.as_ref());
                })
                .level(level.min(LevelFilter::Warn))
                .chain(io::stderr()),
        );

    if let Some(dir) = log_file_path {
        dispatch = dispatch
            .chain(
                file_dispatch(dir, INFO_LOG_FILE_NAME)?
                    .filter(below_warn)
                    .level(level.max(LevelFilter::Info)),
            )
            .chain(file_dispatch(dir, ERROR_LOG_FILE_NAME)?.level(LevelFilter::Warn));
    }

    dispatch.apply().context("Logger already initialised")?;
    let _ = LOGGER_INIT.set(());

    Ok(())
}

/// Pick the name of the log level, in order of precedence
fn choose_log_level(from_env: Option<&str>, from_settings: Option<&str>) -> String {
    from_env
        .or(from_settings)
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string()
}

/// Convert a log level name to a [`LevelFilter`]
fn parse_log_level(name: &str) -> Result<LevelFilter> {
    Ok(match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    })
}

/// Messages which belong on stdout rather than stderr
fn below_warn(metadata: &Metadata) -> bool {
    metadata.level() > LevelFilter::Warn
}

/// A plain-text dispatch writing to a fresh file in `dir`
fn file_dispatch(dir: &Path, file_name: &str) -> Result<Dispatch> {
    let path = dir.join(file_name);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("Could not create log file {}", path.display()))?;

    Ok(Dispatch::new()
        .format(|out, message, record| format_message(out, message, record, None))
        .chain(file))
}

/// Format a message as `[time level target] message`, colouring the level if `colours` is given
fn format_message(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    colours: Option<&ColoredLevelConfig>,
) {
    let timestamp = Local::now().format("%H:%M:%S");
    let target = record.target();
    match colours {
        Some(colours) => {
            let level = colours.color(record.level());
            out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
        }
        None => {
            let level = record.level();
            out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
        }
    }
}
