//! Rate-limited dispatch loop

mod config;
mod dispatcher;

pub use config::DispatcherConfig;
pub use dispatcher::{DispatchStats, Dispatcher};
