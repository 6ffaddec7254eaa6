//! Logging for evt-edge
//!
//! Built on the standard `log` facade: configure once at startup with
//! [`init_logging`], then use `log::info!` and friends everywhere.
//!
//! # Example
//!
//! ```rust,no_run
//! use evt_edge_core::logging::{LoggingConfig, LogLevel};
//!
//! let config = LoggingConfig::production()
//!     .with_level(LogLevel::Debug)
//!     .with_context_field("service", "evt-edge");
//!
//! evt_edge_core::logging::init_logging(&config).unwrap();
//! log::info!("edge listening on {}", "127.0.0.1:3000");
//! ```

pub mod config;
pub mod destinations;
pub mod formatter;

pub use config::{LogLevel, LoggingConfig};
pub use destinations::{LogEntry, LogOutput};
pub use formatter::LogFormat;

use std::io::Write;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install the edge logger as the global `log` backend.
///
/// Only the first call has an effect; later calls return `Ok(())`.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = init_logging_internal(config);
    });
    result
}

fn init_logging_internal(config: &LoggingConfig) -> anyhow::Result<()> {
    let logger = EdgeLogger::new(config.clone());
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(config.level.into());
    Ok(())
}

/// `log::Log` implementation writing formatted entries to every output
struct EdgeLogger {
    config: LoggingConfig,
    writers: Vec<Box<dyn LogWriter>>,
}

impl EdgeLogger {
    fn new(config: LoggingConfig) -> Self {
        let mut writers: Vec<Box<dyn LogWriter>> = Vec::new();

        for output in &config.outputs {
            match output {
                LogOutput::Stdout { format } => {
                    let format = format.clone().unwrap_or_else(|| config.format.clone());
                    writers.push(Box::new(StdoutWriter { format }));
                }
                LogOutput::Stderr { format } => {
                    let format = format.clone().unwrap_or_else(|| config.format.clone());
                    writers.push(Box::new(StderrWriter { format }));
                }
            }
        }

        if writers.is_empty() {
            writers.push(Box::new(StdoutWriter { format: config.format.clone() }));
        }

        Self { config, writers }
    }
}

impl log::Log for EdgeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        LogLevel::from(metadata.level()) <= self.config.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_log_record(record, &self.config);
        for writer in &self.writers {
            writer.write_log(&entry);
        }
    }

    fn flush(&self) {
        for writer in &self.writers {
            writer.flush();
        }
    }
}

trait LogWriter: Send + Sync {
    fn write_log(&self, entry: &LogEntry);
    fn flush(&self);
}

struct StdoutWriter {
    format: LogFormat,
}

impl LogWriter for StdoutWriter {
    fn write_log(&self, entry: &LogEntry) {
        let line = self.format.format_entry(entry);
        let _ = writeln!(std::io::stdout().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

struct StderrWriter {
    format: LogFormat,
}

impl LogWriter for StderrWriter {
    fn write_log(&self, entry: &LogEntry) {
        let line = self.format.format_entry(entry);
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
