//! Build log sinks.

use std::sync::Mutex;

use crate::ports::BuildLog;

/// Writes build log lines to stdout.
pub struct ConsoleLog;

impl BuildLog for ConsoleLog {
    fn log(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps build log lines in memory.
#[derive(Debug, Default)]
pub struct BufferedLog {
    lines: Mutex<Vec<String>>,
}

impl BufferedLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far.
    ///
    /// # Panics
    ///
    /// Panics if a writer panicked while holding the lock.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("log lock poisoned").clone()
    }

    /// Returns `true` if any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// All lines joined with newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

impl BuildLog for BufferedLog {
    fn log(&self, line: &str) {
        self.lines.lock().expect("log lock poisoned").push(line.to_string());
    }
}
