pub mod error;
pub mod log;
pub mod probe;
pub mod stats;
pub mod table;

pub use error::LatmeterError;
pub use table::{FilterOutcome, LatencyTable, SessionRow};
