//! Cassette format for recording and replaying tracker sessions.

pub mod format;
pub mod recorder;
pub mod replayer;
