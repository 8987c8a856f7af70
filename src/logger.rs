//! `log` backend feeding stderr and the in-app console

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Lines kept for the Console tab
const MAX_LINES: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub level: Level,
    pub text: String,
}

/// Shared ring buffer of formatted log lines
#[derive(Debug, Clone, Default)]
pub struct ConsoleBuffer {
    lines: Arc<Mutex<VecDeque<LogLine>>>,
}

impl ConsoleBuffer {
    pub fn push(&self, line: LogLine) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push_back(line);
            while lines.len() > MAX_LINES {
                lines.pop_front();
            }
        }
    }

    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }
}

pub struct ConsoleLogger {
    level: LevelFilter,
    buffer: ConsoleBuffer,
}

impl ConsoleLogger {
    pub fn new(level: LevelFilter, buffer: ConsoleBuffer) -> Self {
        Self { level, buffer }
    }

    fn format(record: &Record) -> String {
        format!(
            "[{}] [{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            record.level(),
            record.args()
        )
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let text = Self::format(record);
        eprintln!("{}", text);
        self.buffer.push(LogLine { level: record.level(), text });
    }

    fn flush(&self) {}
}

/// Level from `IPTV_CATALOG_LOG` (error, warn, info, debug, trace), default info
pub fn level_from_env() -> LevelFilter {
    std::env::var("IPTV_CATALOG_LOG")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the global logger and return the buffer the Console tab reads
pub fn init(level: LevelFilter) -> ConsoleBuffer {
    let buffer = ConsoleBuffer::default();
    let logger = ConsoleLogger::new(level, buffer.clone());
    match log::set_boxed_logger(Box::new(logger)) {
        Ok(()) => log::set_max_level(level),
        Err(e) => eprintln!("Logger already installed: {}", e),
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_is_bounded() {
        let buffer = ConsoleBuffer::default();
        for i in 0..(MAX_LINES + 25) {
            buffer.push(LogLine { level: Level::Info, text: format!("line {}", i) });
        }
        let lines = buffer.snapshot();
        assert_eq!(lines.len(), MAX_LINES);
        assert_eq!(lines[0].text, "line 25");
    }

    #[test]
    fn test_logger_filters_by_level() {
        let buffer = ConsoleBuffer::default();
        let logger = ConsoleLogger::new(LevelFilter::Warn, buffer.clone());
        logger.log(
            &Record::builder()
                .level(Level::Info)
                .args(format_args!("hidden"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Error)
                .args(format_args!("shown"))
                .build(),
        );
        let lines = buffer.snapshot();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, Level::Error);
        assert!(lines[0].text.ends_with("[ERROR] shown"));
    }

    #[test]
    fn test_clear() {
        let buffer = ConsoleBuffer::default();
        buffer.push(LogLine { level: Level::Warn, text: "x".into() });
        buffer.clear();
        assert_eq!(buffer.len(), 0);
    }
}
