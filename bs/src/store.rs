//! Core Store implementation

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::record::Record;

const LOCK_FILE: &str = ".lock";
const RECORD_EXT: &str = "json";

/// File-per-record JSON store
///
/// Holds an exclusive lock on `{base_path}/.lock` for as long as it is alive,
/// so a data directory has at most one writer process.
#[derive(Debug)]
pub struct Store {
    base_path: PathBuf,
    _lock: fs::File,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let base_path = path.as_ref().to_path_buf();
        debug!(?base_path, "Store::open: called");
        fs::create_dir_all(&base_path).map_err(|e| StoreError::io(&base_path, e))?;

        let lock_path = base_path.join(LOCK_FILE);
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StoreError::io(&lock_path, e))?;
        if lock.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked(base_path));
        }

        info!(?base_path, "Opened store");
        Ok(Self { base_path, _lock: lock })
    }

    /// Insert or atomically replace a record
    pub fn put<R: Record>(&self, record: &R) -> StoreResult<()> {
        let collection = R::collection_name();
        let id = record.id();
        debug!(%collection, %id, "Store::put: called");

        let path = self.record_path(collection, id)?;
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let bytes = serde_json::to_vec_pretty(record).map_err(|source| StoreError::Serde {
            collection: collection.to_string(),
            id: id.to_string(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(&bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;

        debug!(%collection, %id, bytes = bytes.len(), "Store::put: record written");
        Ok(())
    }

    /// Load a record by id, `None` if it does not exist
    pub fn get<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        let collection = R::collection_name();
        debug!(%collection, %id, "Store::get: called");
        let path = self.record_path(collection, id)?;
        read_record(&path, collection, id)
    }

    /// Load every record in the collection, ordered by id
    pub fn list<R: Record>(&self) -> StoreResult<Vec<R>> {
        let collection = R::collection_name();
        debug!(%collection, "Store::list: called");
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))? {
            let path = entry.map_err(|e| StoreError::io(&dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == RECORD_EXT)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let path = self.record_path(collection, &id)?;
            // A concurrent delete between read_dir and read is not an error
            if let Some(record) = read_record(&path, collection, &id)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.base_path.join(collection)
    }

    fn record_path(&self, collection: &str, id: &str) -> StoreResult<PathBuf> {
        validate_id(id)?;
        Ok(self.collection_dir(collection).join(format!("{}.{}", id, RECORD_EXT)))
    }
}

/// Ids become file names, so they must not escape the collection directory
fn validate_id(id: &str) -> StoreResult<()> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.starts_with('.')
        || id.contains(['/', '\\', '\0']);
    if bad {
        return Err(StoreError::InvalidId(id.to_string()));
    }
    Ok(())
}

fn read_record<R: Record>(path: &Path, collection: &str, id: &str) -> StoreResult<Option<R>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let record = serde_json::from_slice(&bytes).map_err(|source| StoreError::Serde {
        collection: collection.to_string(),
        id: id.to_string(),
        source,
    })?;
    Ok(Some(record))
}
