//! Splitting an ingestion into batches

use crate::domain::{Batch, ItemId, Priority};

/// Split ids into consecutive chunks of at most `size`, preserving order.
///
/// A `size` of zero is treated as one.
pub fn chunk_ids(ids: &[ItemId], size: usize) -> Vec<Vec<ItemId>> {
    ids.chunks(size.max(1)).map(<[ItemId]>::to_vec).collect()
}

/// Build one queued batch per chunk, all sharing the ingestion's priority
pub fn build_batches(ingestion_id: &str, ids: &[ItemId], priority: Priority, size: usize) -> Vec<Batch> {
    chunk_ids(ids, size)
        .into_iter()
        .map(|chunk| Batch::new(ingestion_id, chunk, priority))
        .collect()
}
