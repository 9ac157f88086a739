//! Object-store backed backend built on SlateDB.
//!
//! SlateDB is async; the store owns the runtime that drives it and blocks the
//! calling thread on each operation. Compaction runs on a second runtime so a
//! `block_on` from a worker never waits on work scheduled behind it.

use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use common::BytesRange;
use common::storage::config::ObjectStoreConfig;
use common::storage::factory::{create_object_store, load_settings, prepare_local_dir};
use slatedb::config::{PutOptions, WriteOptions};
use slatedb::{Db, DbBuilder, WriteBatch};
use tokio::runtime::Runtime;

use crate::config::SlateDbConfig;
use crate::error::{Error, Result};
use crate::model::{MAX_KEY_LEN, Operation, validate_key, validate_operations};
use crate::store::{Store, Visitor};

/// A [`Store`] over a SlateDB database.
pub struct SlateDbStore {
    db: Db,
    runtime: Runtime,
    closed: AtomicBool,
    // Kept alive so compaction tasks continue running; never read directly.
    _compaction_runtime: Runtime,
}

fn build_runtime(name: &str, workers: Option<usize>) -> Result<Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(workers) = workers {
        builder.worker_threads(workers);
    }
    builder
        .thread_name(name)
        .enable_all()
        .build()
        .map_err(|e| Error::Open(format!("failed to create {} runtime: {}", name, e)))
}

/// Writes are acknowledged once applied in memory; `sync` and `close`
/// make them durable.
fn write_options() -> WriteOptions {
    let mut options = WriteOptions::default();
    options.await_durable = false;
    options
}

impl SlateDbStore {
    pub fn open(config: &SlateDbConfig) -> Result<Self> {
        let runtime = build_runtime("od-kv", None)?;
        let compaction_runtime = build_runtime("od-compaction", Some(2))?;

        // The local store is rooted at `/`, so the database lives at the
        // absolute directory path.
        let db_path = match &config.object_store {
            ObjectStoreConfig::Local(local) => prepare_local_dir(&local.path)?,
            _ => config.path.clone(),
        };
        let object_store = create_object_store(&config.object_store)?;
        let settings = load_settings(config.settings_path.as_deref())?;

        let db = runtime
            .block_on(
                DbBuilder::new(db_path, object_store)
                    .with_settings(settings)
                    .with_compaction_runtime(compaction_runtime.handle().clone())
                    .build(),
            )
            .map_err(|e| Error::Open(format!("failed to open SlateDB: {}", e)))?;

        Ok(Self {
            db,
            runtime,
            closed: AtomicBool::new(false),
            _compaction_runtime: compaction_runtime,
        })
    }

    fn check_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Storage("store is closed".to_string()));
        }
        Ok(())
    }
}

impl Store for SlateDbStore {
    #[tracing::instrument(level = "trace", skip_all)]
    fn close(&self) -> Result<()> {
        self.check_open()?;
        // Writes do not await durability, so flush them before closing.
        self.runtime
            .block_on(self.db.flush())
            .map_err(Error::from_storage)?;
        self.runtime
            .block_on(self.db.close())
            .map_err(Error::from_storage)?;
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.check_open()?;
        validate_key(key)?;
        self.runtime
            .block_on(self.db.put_with_options(
                key,
                value,
                &PutOptions::default(),
                &write_options(),
            ))
            .map_err(Error::from_storage)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.check_open()?;
        validate_key(key)?;
        self.runtime
            .block_on(self.db.get(key))
            .map_err(Error::from_storage)?
            .ok_or(Error::NotFound)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn delete(&self, key: &[u8]) -> Result<()> {
        self.check_open()?;
        validate_key(key)?;
        self.runtime
            .block_on(self.db.delete_with_options(key, &write_options()))
            .map_err(Error::from_storage)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn iterate(&self, prefix: &[u8], visit: &mut Visitor<'_>) -> Result<()> {
        self.check_open()?;
        if prefix.len() > MAX_KEY_LEN {
            return Ok(());
        }
        let range = BytesRange::prefix(Bytes::copy_from_slice(prefix));
        self.runtime.block_on(async {
            let mut iter = self.db.scan(range).await.map_err(Error::from_storage)?;
            while let Some(entry) = iter.next().await.map_err(Error::from_storage)? {
                visit(&entry.key, &entry.value)?;
            }
            Ok::<(), Error>(())
        })
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn sync(&self) -> Result<()> {
        self.check_open()?;
        self.runtime
            .block_on(self.db.flush())
            .map_err(Error::from_storage)
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn apply(&self, ops: &[Operation]) -> Result<()> {
        self.check_open()?;
        validate_operations(ops)?;
        if ops.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::new();
        for op in ops {
            match op {
                Operation::Set { key, value } => batch.put(key, value),
                Operation::Delete { key } => batch.delete(key),
            }
        }
        self.runtime
            .block_on(self.db.write_with_options(batch, &write_options()))
            .map_err(Error::from_storage)
    }
}
