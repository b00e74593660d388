#[cfg(test)]
use std::sync::{Arc, Mutex};
use strum_macros::Display;

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        println!("\x1b[32m[INFO] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        println!("\x1b[33m[LOG]  [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        println!("\x1b[35m[WARN] [{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        println!("\x1b[31m[ERROR][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!("\x1b[1;31m[FATAL][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if std::env::var("LOG_BRIDGE_EVENTS").is_ok() {
            println!("\x1b[36m[EVENT][{}]\x1b[0m {}", chrono::Utc::now().format("%H:%M:%S%.3f"), format!($($arg)*))
        }
    };
}

/// Severity of a line handed to a [`LogSink`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Event,
    Log,
    Info,
    Warn,
    Error,
}

/// Destination for the dispatch core's diagnostics.
///
/// The core never prints directly; it is handed a sink at construction so
/// that the owning process decides where lines go.
pub trait LogSink: Send + Sync {
    fn record(&self, level: LogLevel, message: &str);
}

/// Forwards every line to the coloured stdout macros.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLog;

impl LogSink for ConsoleLog {
    fn record(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Event => event!("{message}"),
            LogLevel::Log => log!("{message}"),
            LogLevel::Info => info!("{message}"),
            LogLevel::Warn => warn!("{message}"),
            LogLevel::Error => error!("{message}"),
        }
    }
}

/// Keeps every line in memory. Cloning shares the same buffer.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct RecordingLog {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

#[cfg(test)]
impl RecordingLog {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.lines().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn count_containing(&self, level: LogLevel, needle: &str) -> usize {
        self.lines().iter().filter(|(l, m)| *l == level && m.contains(needle)).count()
    }
}

#[cfg(test)]
impl LogSink for RecordingLog {
    fn record(&self, level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((level, message.to_owned()));
        }
    }
}
