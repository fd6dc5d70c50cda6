//! BatchStore - durable JSON record store
//!
//! Every record lives in its own JSON file, grouped by collection. Writes go
//! through a temp file in the same directory followed by a rename, so readers
//! never observe a partially written record.
//!
//! # Layout
//!
//! ```text
//! {data_dir}/
//! ├── .lock                # exclusive fs2 lock held while the store is open
//! └── {collection}/
//!     ├── {id}.json
//!     └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use batchstore::Store;
//!
//! let store = Store::open("/var/lib/batchdaemon")?;
//! store.put(&record)?;
//! let loaded: Option<MyRecord> = store.get("some-id")?;
//! ```

mod error;
mod record;
mod store;

pub use error::{StoreError, StoreResult};
pub use record::Record;
pub use store::Store;

/// Current wall-clock time in Unix milliseconds
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
