//! Battle event logger
//!
//! Engine-owned logger for action transitions and headline game events.
//! Output can go to stdout, an in-memory buffer (for tests asserting on
//! log content), or both.

use serde::{Deserialize, Serialize};

/// Verbosity level for battle output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during the battle
    Silent = 0,
    /// Minimal - only the battle outcome
    Minimal = 1,
    /// Normal - turns and key actions (default)
    #[default]
    Normal = 2,
    /// Verbose - all action transitions
    Verbose = 3,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to the in-memory buffer (no stdout)
    Memory,
    /// Both stdout and the in-memory buffer
    Both,
}

/// A captured log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g. "transition", "game_event")
    pub category: Option<&'static str>,
}

/// Centralized logger for battle events
#[derive(Debug, Default)]
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,
    buffer: Vec<LogEntry>,
}

impl GameLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_mode: OutputMode::default(),
            buffer: Vec::new(),
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Capture to memory only (used by tests)
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    /// Captured log entries
    pub fn logs(&self) -> &[LogEntry] {
        &self.buffer
    }

    pub fn clear_logs(&mut self) {
        self.buffer.clear();
    }

    /// Log at Minimal level
    pub fn minimal(&mut self, message: &str) {
        self.log(VerbosityLevel::Minimal, message, None);
    }

    /// Log at Normal level
    pub fn normal(&mut self, message: &str) {
        self.log(VerbosityLevel::Normal, message, None);
    }

    /// Log at Verbose level
    pub fn verbose(&mut self, message: &str) {
        self.log(VerbosityLevel::Verbose, message, None);
    }

    /// Log an action transition at Verbose level
    pub fn transition(&mut self, message: &str) {
        self.log(VerbosityLevel::Verbose, message, Some("transition"));
    }

    fn log(&mut self, level: VerbosityLevel, message: &str, category: Option<&'static str>) {
        let should_capture = matches!(self.output_mode, OutputMode::Memory | OutputMode::Both);
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both)
            && level <= self.verbosity;

        if !should_capture && !should_output {
            return;
        }

        if should_capture {
            self.buffer.push(LogEntry {
                level,
                message: message.to_string(),
                category,
            });
        }

        if should_output {
            if level == VerbosityLevel::Minimal {
                println!("{}", message);
            } else {
                println!("  {}", message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verbosity_is_normal() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_capture_records_all_levels() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
        logger.enable_capture();

        logger.minimal("outcome");
        logger.normal("event");
        logger.verbose("detail");
        logger.transition("pushed");

        let logs = logger.logs();
        assert_eq!(logs.len(), 4);
        assert_eq!(logs[0].message, "outcome");
        assert_eq!(logs[3].category, Some("transition"));
    }

    #[test]
    fn test_clear_logs() {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger.normal("one");
        assert_eq!(logger.logs().len(), 1);

        logger.clear_logs();
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(VerbosityLevel::Silent < VerbosityLevel::Minimal);
        assert!(VerbosityLevel::Minimal < VerbosityLevel::Normal);
        assert!(VerbosityLevel::Normal < VerbosityLevel::Verbose);
    }
}
