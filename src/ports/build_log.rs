//! Build console log port.

/// Appends human-readable lines to the build's console log.
///
/// Lines written here are what users (and tests) read, so their text is
/// stable.
pub trait BuildLog {
    /// Writes one line.
    fn log(&self, line: &str);
}
