//! Inter-Process Communication between the CLI and the daemon
//!
//! Unix Domain Socket carrying newline-delimited JSON: one request and one
//! response per connection.

use std::path::PathBuf;

pub mod client;
pub mod listener;
pub mod messages;

pub use client::DaemonClient;
pub use listener::{cleanup_socket, create_listener_at, read_message, send_response};
pub use messages::{DaemonMessage, DaemonResponse};

/// Maximum size of a request line, in bytes
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Default socket path for daemon IPC
pub fn get_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("batchdaemon")
        .join("daemon.sock")
}
