//! Turns a location string into an open [`Store`].

use std::sync::Arc;

use tracing::debug;

use crate::config::{Location, LsmConfig};
use crate::error::{Error, Result};
use crate::lsm::LsmStore;
use crate::slate::SlateDbStore;
use crate::store::Store;

/// Opens the backend selected by `location`.
///
/// See [`crate::config`] for the location grammar. `in_memory` applies to the
/// LSM backend only. Every failure is reported as [`Error::Open`].
pub fn open(location: &str, in_memory: bool) -> Result<Arc<dyn Store>> {
    let location = Location::parse(location, in_memory)?;
    open_location(&location).map_err(|e| match e {
        Error::Open(_) => e,
        other => Error::Open(other.to_string()),
    })
}

/// Opens an already parsed [`Location`].
pub fn open_location(location: &Location) -> Result<Arc<dyn Store>> {
    match location {
        Location::Lsm(config) => {
            match config {
                LsmConfig::InMemory => debug!(backend = "lsm", "opening in-memory store"),
                LsmConfig::OnDisk { path } => {
                    debug!(backend = "lsm", path = %path.display(), "opening store")
                }
            }
            Ok(Arc::new(LsmStore::open(config)?))
        }
        Location::SlateDb(config) => {
            debug!(
                backend = "slatedb",
                path = %config.path,
                object_store = ?config.object_store,
                "opening store"
            );
            Ok(Arc::new(SlateDbStore::open(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_missing_lsm_directory() {
        // given
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lsm");

        // when
        let store = open(path.to_str().unwrap(), false).unwrap();

        // then
        store.set(b"k", b"v").unwrap();
        assert!(path.is_dir());
        store.close().unwrap();
    }

    #[test]
    fn should_open_slatedb_memory_provider() {
        // when
        let store = open(r#"slatedb:{"path":"kv","store":{"provider":"memory"}}"#, false).unwrap();

        // then
        store.set(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k").unwrap().as_ref(), b"v");
        store.close().unwrap();
    }

    #[test]
    fn should_treat_remote_path_as_object_prefix_only() {
        // given
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefix");
        let location = format!(
            r#"slatedb:{{"path":{:?},"store":{{"provider":"memory"}}}}"#,
            path.to_str().unwrap()
        );

        // when
        let store = open(&location, false).unwrap();
        store.set(b"k", b"v").unwrap();
        store.close().unwrap();

        // then
        assert!(!path.exists());
    }

    #[test]
    fn should_report_directory_failure_as_open_error() {
        // given
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        std::fs::write(&file, b"x").unwrap();
        let location = format!("slatedb:{}", file.join("db").display());

        // when
        let result = open(&location, false);

        // then
        assert!(matches!(result, Err(Error::Open(_))));
    }

    #[test]
    fn should_report_bad_configuration_as_open_error() {
        let result = open("slatedb:{not json", false);

        assert!(matches!(result, Err(Error::Open(_))));
    }
}
