//! Port implementations.
//!
//! - `live`: the real clock, console log, and variable expansion.
//! - `recording`: a tracker wrapper that writes every call to a cassette.
//! - `replaying`: a tracker served from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
