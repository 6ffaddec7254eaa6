//! Log output destinations and the structured entry they receive

use crate::logging::{LogFormat, LogLevel, LoggingConfig};
use std::collections::HashMap;

/// Where logs should be sent
#[derive(Clone, Debug, PartialEq)]
pub enum LogOutput {
    Stdout {
        /// Override the default format for this output
        format: Option<LogFormat>,
    },
    Stderr {
        /// Override the default format for this output
        format: Option<LogFormat>,
    },
}

/// A structured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Usually the module path
    pub target: String,
    pub fields: HashMap<String, serde_json::Value>,
    /// Source file and line, when the record carries them
    pub location: Option<(String, u32)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, target: String) -> Self {
        Self {
            timestamp: chrono::Utc::now(),
            level,
            message,
            target,
            fields: HashMap::new(),
            location: None,
        }
    }

    /// Create a LogEntry from a standard log::Record
    pub fn from_log_record(record: &log::Record, config: &LoggingConfig) -> Self {
        let mut entry = Self::new(
            record.level().into(),
            record.args().to_string(),
            record.target().to_string(),
        );

        if let (Some(file), Some(line)) = (record.file(), record.line()) {
            entry.location = Some((file.to_string(), line));
        }

        for (key, value) in &config.context_fields {
            entry.fields.insert(key.clone(), serde_json::Value::String(value.clone()));
        }

        entry
    }

    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_entry_with_fields() {
        let entry =
            LogEntry::new(LogLevel::Error, "upstream down".to_string(), "evt::proxy".to_string())
                .with_field("status", serde_json::json!(502));

        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.fields.get("status"), Some(&serde_json::json!(502)));
        assert!(entry.location.is_none());
    }
}
