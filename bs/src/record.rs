//! Record trait

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value that can be persisted in the store.
///
/// Each record type belongs to one collection (a subdirectory of the store)
/// and is addressed by its id within that collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Unique identifier within the collection
    fn id(&self) -> &str;

    /// Last update timestamp (Unix milliseconds)
    fn updated_at(&self) -> i64;

    /// Collection (directory) name for this record type
    fn collection_name() -> &'static str;
}
