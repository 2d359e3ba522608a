pub mod loader;
pub mod store;

pub use loader::load_table;
pub use store::append_session;

/// Default location of the persistent latency log, relative to the working
/// directory, when the caller does not supply a path.
pub const DEFAULT_LOG_PATH: &str = "results/results.csv";
