//! Log formatting options for different output styles

use crate::logging::destinations::LogEntry;
use std::str::FromStr;

/// How logs should be formatted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON format (production default)
    /// Example: {"timestamp":"2024-01-15T10:30:00Z","level":"INFO","message":"proxy ok","service":"evt-edge"}
    Json,

    /// Human-readable format (development default)
    /// Example: 2024-01-15 10:30:00.000 INFO  [evt_edge_core::proxy] proxy ok service=evt-edge
    Human,

    /// Logfmt format (key=value pairs)
    /// Example: timestamp=2024-01-15T10:30:00Z level=INFO target=evt_edge_core::proxy message="proxy ok"
    Logfmt,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "human" | "text" | "pretty" => Ok(LogFormat::Human),
            "logfmt" => Ok(LogFormat::Logfmt),
            other => Err(format!("unknown log format {:?}", other)),
        }
    }
}

impl LogFormat {
    /// Format a log entry according to this format
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self {
            LogFormat::Json => format_json(entry),
            LogFormat::Human => format_human(entry),
            LogFormat::Logfmt => format_logfmt(entry),
        }
    }
}

fn level_str(entry: &LogEntry) -> String {
    format!("{:?}", entry.level).to_uppercase()
}

fn format_json(entry: &LogEntry) -> String {
    let mut json = serde_json::Map::new();

    json.insert("timestamp".to_string(), serde_json::Value::String(entry.timestamp.to_rfc3339()));
    json.insert("level".to_string(), serde_json::Value::String(level_str(entry)));
    json.insert("message".to_string(), serde_json::Value::String(entry.message.clone()));
    json.insert("target".to_string(), serde_json::Value::String(entry.target.clone()));

    if let Some((file, line)) = &entry.location {
        json.insert("file".to_string(), serde_json::Value::String(file.clone()));
        json.insert("line".to_string(), serde_json::Value::from(*line));
    }

    for (key, value) in &entry.fields {
        json.insert(key.clone(), value.clone());
    }

    serde_json::to_string(&json).unwrap_or_else(|_| "Failed to serialize log entry".to_string())
}

fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn format_human(entry: &LogEntry) -> String {
    let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
    let mut message =
        format!("{} {:5} [{}] {}", timestamp, level_str(entry), entry.target, entry.message);

    let mut keys: Vec<&String> = entry.fields.keys().collect();
    keys.sort();
    for key in keys {
        message.push_str(&format!(" {}={}", key, field_text(&entry.fields[key])));
    }

    message
}

fn format_logfmt(entry: &LogEntry) -> String {
    let mut parts = vec![
        format!("timestamp={}", entry.timestamp.to_rfc3339()),
        format!("level={}", level_str(entry)),
        format!("target={}", entry.target),
        format!("message=\"{}\"", entry.message.replace('"', "\\\"")),
    ];

    let mut keys: Vec<&String> = entry.fields.keys().collect();
    keys.sort();
    for key in keys {
        let value = match &entry.fields[key] {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            other => format!("\"{}\"", field_text(other).replace('"', "\\\"")),
        };
        parts.push(format!("{}={}", key, value));
    }

    parts.join(" ")
}
