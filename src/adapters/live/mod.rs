//! Live adapters for real external interactions.

pub mod clock;
pub mod console;
pub mod expander;

pub use clock::{FixedClock, SystemClock};
pub use console::{BufferedLog, ConsoleLog};
pub use expander::VariableExpander;
