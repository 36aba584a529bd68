//! Debug log file shared by the `log` facade and rig's `tracing` output.
//!
//! Nothing is written until [`enable_logging`] and [`set_log_file`] are
//! called from the CLI.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{LazyLock, OnceLock};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// HTTP stack underneath rig; silenced unless verbose
const TRANSPORT_TARGETS: &[&str] = &["reqwest", "hyper", "rustls"];

const DEFAULT_TRACING_FILTER: &str = "trio=debug,rig=info,warn";

#[derive(Default)]
struct LogState {
    enabled: bool,
    verbose: bool,
    file: Option<File>,
}

impl LogState {
    fn append(&mut self, bytes: &[u8]) {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(bytes);
            let _ = file.flush();
        }
    }
}

static STATE: LazyLock<Mutex<LogState>> = LazyLock::new(|| Mutex::new(LogState::default()));

struct PipelineLogger;

static LOGGER: PipelineLogger = PipelineLogger;

impl log::Log for PipelineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let state = STATE.lock();
        if !state.enabled {
            return false;
        }

        let target = metadata.target();
        let ceiling = if target.starts_with("rig") {
            Level::Info
        } else if !state.verbose && TRANSPORT_TARGETS.iter().any(|t| target.starts_with(t)) {
            return false;
        } else {
            Level::Debug
        };
        metadata.level() <= ceiling
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} {} [{}] - {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        STATE.lock().append(line.as_bytes());
    }

    fn flush(&self) {}
}

/// `tracing` sink writing into the same file as the `log` facade
#[derive(Clone, Copy)]
struct LogFileWriter;

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        STATE.lock().append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

/// Install both loggers. Safe to call more than once; later calls return the
/// first result.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    static INIT: OnceLock<Result<(), String>> = OnceLock::new();

    let result = INIT.get_or_init(|| {
        if std::env::var("TRIO_VERBOSE").is_ok() {
            set_verbose_logging(true);
        }

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_TRACING_FILTER.into());
        let layer = fmt::Layer::new()
            .with_target(true)
            .with_timer(fmt::time::ChronoUtc::rfc_3339())
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(LogFileWriter);
        let tracing_result = Registry::default().with(filter).with(layer).try_init();

        let log_result =
            log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Debug));

        match (tracing_result, log_result) {
            (Err(tracing_err), Err(log_err)) => Err(format!(
                "Failed to initialize logging: tracing={tracing_err}, log={log_err}"
            )),
            (Err(tracing_err), Ok(())) => {
                eprintln!("Note: rig traces will not be logged ({tracing_err})");
                Ok(())
            }
            _ => Ok(()),
        }
    });

    result.clone().map_err(Into::into)
}

pub fn enable_logging() {
    STATE.lock().enabled = true;
}

pub fn set_verbose_logging(enabled: bool) {
    STATE.lock().verbose = enabled;
}

/// Append to `file_path`, creating it if needed
pub fn set_log_file(file_path: &str) -> io::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)?;
    STATE.lock().file = Some(file);
    Ok(())
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn test_log_lines_reach_file() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("trio-debug.log");
        set_log_file(path.to_str().expect("utf-8 path")).expect("log file should open");
        enable_logging();

        let metadata = Metadata::builder()
            .level(Level::Debug)
            .target("trio::pipeline")
            .build();
        assert!(LOGGER.enabled(&metadata));
        LOGGER.log(
            &Record::builder()
                .metadata(metadata)
                .args(format_args!("divided into 3"))
                .build(),
        );

        let content = std::fs::read_to_string(&path).expect("log file should exist");
        assert!(content.contains("[trio::pipeline] - divided into 3"));

        let rig_debug = Metadata::builder()
            .level(Level::Debug)
            .target("rig::agent")
            .build();
        assert!(!LOGGER.enabled(&rig_debug));
    }
}
