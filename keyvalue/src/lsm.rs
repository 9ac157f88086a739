//! LSM-tree backend built on fjall.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use common::BytesRange;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use tempfile::TempDir;

use crate::config::LsmConfig;
use crate::error::{Error, Result};
use crate::model::{MAX_KEY_LEN, Operation, validate_key, validate_operations};
use crate::store::{Store, Visitor};

const PARTITION_NAME: &str = "default";

/// A [`Store`] over a single fjall partition.
pub struct LsmStore {
    // Declared before `_temp_dir` so the engine shuts down before its
    // directory is removed.
    partition: PartitionHandle,
    keyspace: Keyspace,
    closed: AtomicBool,
    _temp_dir: Option<TempDir>,
}

impl LsmStore {
    pub fn open(config: &LsmConfig) -> Result<Self> {
        match config {
            LsmConfig::InMemory => Self::open_temporary(),
            LsmConfig::OnDisk { path } => Self::open_on_disk(path),
        }
    }

    /// Opens (creating if needed) a store rooted at `path`.
    pub fn open_on_disk(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            Error::Open(format!(
                "failed to create directory '{}': {}",
                path.display(),
                e
            ))
        })?;
        let keyspace = Config::new(path)
            .open()
            .map_err(|e| Error::Open(e.to_string()))?;
        Self::with_keyspace(keyspace, None)
    }

    /// Opens a store whose files live in a private temporary directory that
    /// is deleted with the store.
    pub fn open_temporary() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("opendata-kv-")
            .tempdir()
            .map_err(|e| Error::Open(format!("failed to create temporary directory: {}", e)))?;
        let keyspace = Config::new(dir.path())
            .temporary(true)
            .open()
            .map_err(|e| Error::Open(e.to_string()))?;
        Self::with_keyspace(keyspace, Some(dir))
    }

    fn with_keyspace(keyspace: Keyspace, temp_dir: Option<TempDir>) -> Result<Self> {
        let partition = keyspace
            .open_partition(PARTITION_NAME, PartitionCreateOptions::default())
            .map_err(|e| Error::Open(e.to_string()))?;
        Ok(Self {
            partition,
            keyspace,
            closed: AtomicBool::new(false),
            _temp_dir: temp_dir,
        })
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Storage("store is closed".to_string()));
        }
        Ok(())
    }
}

impl Store for LsmStore {
    #[tracing::instrument(level = "trace", skip_all)]
    fn close(&self) -> Result<()> {
        self.check_open()?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_open()?;
        validate_key(key)?;
        self.partition.insert(key, value)?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.check_open()?;
        validate_key(key)?;
        match self.partition.get(key)? {
            Some(value) => Ok(Bytes::copy_from_slice(&value)),
            None => Err(Error::NotFound),
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn delete(&self, key: &[u8]) -> Result<()> {
        self.check_open()?;
        validate_key(key)?;
        self.partition.remove(key)?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn iterate(&self, prefix: &[u8], visit: &mut Visitor<'_>) -> Result<()> {
        self.check_open()?;
        // No stored key is longer than the limit.
        if prefix.len() > MAX_KEY_LEN {
            return Ok(());
        }
        let range = BytesRange::prefix(Bytes::copy_from_slice(prefix));
        for item in self.partition.range(range) {
            let (key, value) = item?;
            visit(&key, &value)?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn sync(&self) -> Result<()> {
        self.check_open()?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn apply(&self, ops: &[Operation]) -> Result<()> {
        self.check_open()?;
        validate_operations(ops)?;
        let mut batch = self.keyspace.batch();
        for op in ops {
            match op {
                Operation::Set { key, value } => {
                    batch.insert(&self.partition, key.as_ref(), value.as_ref())
                }
                Operation::Delete { key } => batch.remove(&self.partition, key.as_ref()),
            }
        }
        batch.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(store: &LsmStore, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut entries = Vec::new();
        store
            .iterate(prefix, &mut |k, v| {
                entries.push((k.to_vec(), v.to_vec()));
                Ok(())
            })
            .unwrap();
        entries
    }

    #[test]
    fn should_persist_across_reopen() {
        // given
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lsm");
        let store = LsmStore::open_on_disk(&path).unwrap();
        store.set(b"k", b"v").unwrap();
        store.close().unwrap();
        drop(store);

        // when
        let reopened = LsmStore::open_on_disk(&path).unwrap();

        // then
        assert_eq!(reopened.get(b"k").unwrap(), Bytes::from_static(b"v"));
    }

    #[test]
    fn should_not_share_data_between_temporary_stores() {
        // given
        let first = LsmStore::open_temporary().unwrap();
        first.set(b"k", b"v").unwrap();

        // when
        let second = LsmStore::open_temporary().unwrap();

        // then
        assert_eq!(second.get(b"k"), Err(Error::NotFound));
    }

    #[test]
    fn should_scan_prefix_ending_in_ff() {
        // given
        let store = LsmStore::open_temporary().unwrap();
        store.set(&[0x01, 0xFF], b"a").unwrap();
        store.set(&[0x01, 0xFF, 0x00], b"b").unwrap();
        store.set(&[0x02], b"c").unwrap();

        // when
        let entries = collect(&store, &[0x01, 0xFF]);

        // then
        assert_eq!(
            entries,
            vec![
                (vec![0x01, 0xFF], b"a".to_vec()),
                (vec![0x01, 0xFF, 0x00], b"b".to_vec()),
            ]
        );
    }

    #[test]
    fn should_stop_iteration_on_visitor_error() {
        // given
        let store = LsmStore::open_temporary().unwrap();
        store.set(b"a", b"1").unwrap();
        store.set(b"b", b"2").unwrap();
        let mut seen = 0;

        // when
        let result = store.iterate(b"", &mut |_, _| {
            seen += 1;
            Err(Error::Internal("stop".to_string()))
        });

        // then
        assert_eq!(result, Err(Error::Internal("stop".to_string())));
        assert_eq!(seen, 1);
    }

    #[test]
    fn should_reject_calls_after_close() {
        // given
        let store = LsmStore::open_temporary().unwrap();
        store.close().unwrap();

        // when
        let result = store.set(b"k", b"v");

        // then
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn should_fail_to_open_when_path_is_a_file() {
        // given
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();

        // when
        let result = LsmStore::open_on_disk(&file.join("lsm"));

        // then
        assert!(matches!(result, Err(Error::Open(_))));
    }
}
