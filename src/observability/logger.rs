//! Structured JSON logger
//!
//! - One log line = one event
//! - Fields ordered alphabetically for deterministic output
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Normal operations
    Info = 0,
    /// Recoverable issues
    Warn = 1,
    /// Operation failures
    Error = 2,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured JSON logger
pub struct Logger;

impl Logger {
    /// Log at INFO level to stdout
    pub fn info(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::write_line(&mut io::stdout(), Level::Info, event, fields);
    }

    /// Log at WARN level to stderr
    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::write_line(&mut io::stderr(), Level::Warn, event, fields);
    }

    /// Log at ERROR level to stderr
    pub fn error(event: &str, fields: &[(&str, &str)]) {
        let _ = Self::write_line(&mut io::stderr(), Level::Error, event, fields);
    }

    fn write_line<W: Write>(
        writer: &mut W,
        level: Level,
        event: &str,
        fields: &[(&str, &str)],
    ) -> io::Result<()> {
        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":\"");
        escape_into(&mut line, event);
        line.push_str("\",\"level\":\"");
        line.push_str(level.as_str());
        line.push('"');

        let mut sorted: Vec<&(&str, &str)> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);
        for (key, value) in sorted {
            line.push_str(",\"");
            escape_into(&mut line, key);
            line.push_str("\":\"");
            escape_into(&mut line, value);
            line.push('"');
        }
        line.push_str("}\n");

        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    #[cfg(test)]
    fn render(level: Level, event: &str, fields: &[(&str, &str)]) -> String {
        let mut buffer = Vec::new();
        let _ = Self::write_line(&mut buffer, level, event, fields);
        String::from_utf8(buffer).unwrap()
    }
}

fn escape_into(output: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_control() => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
}
