//! Object store and SlateDB settings construction from configuration.

use std::path::Path;
use std::sync::Arc;

use slatedb::config::Settings;
use slatedb::object_store::{self, ObjectStore};

use super::config::ObjectStoreConfig;
use super::{StorageError, StorageResult};

/// Creates an object store from configuration.
///
/// The local filesystem store is rooted at `/`, so a database opened on it
/// must use the absolute path returned by [`prepare_local_dir`].
pub fn create_object_store(config: &ObjectStoreConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    match config {
        ObjectStoreConfig::InMemory => Ok(Arc::new(object_store::memory::InMemory::new())),
        ObjectStoreConfig::Aws(aws_config) => {
            let mut builder = object_store::aws::AmazonS3Builder::from_env()
                .with_bucket_name(&aws_config.bucket);
            if !aws_config.region.is_empty() {
                builder = builder.with_region(&aws_config.region);
            }
            if let Some(endpoint) = &aws_config.endpoint {
                builder = builder
                    .with_endpoint(endpoint)
                    .with_allow_http(endpoint.starts_with("http://"));
            }
            let store = builder.build().map_err(|e| {
                StorageError::Storage(format!("Failed to create AWS S3 store: {}", e))
            })?;
            Ok(Arc::new(store))
        }
        ObjectStoreConfig::Local(local_config) => {
            prepare_local_dir(&local_config.path)?;
            Ok(Arc::new(object_store::local::LocalFileSystem::new()))
        }
    }
}

/// Creates `path` (and its parents) if missing and returns it as an absolute,
/// canonical string.
pub fn prepare_local_dir(path: impl AsRef<Path>) -> StorageResult<String> {
    let path = path.as_ref();
    std::fs::create_dir_all(path).map_err(|e| {
        StorageError::Storage(format!(
            "Failed to create storage directory '{}': {}",
            path.display(),
            e
        ))
    })?;
    let absolute = std::fs::canonicalize(path).map_err(|e| {
        StorageError::Storage(format!(
            "Failed to resolve storage directory '{}': {}",
            path.display(),
            e
        ))
    })?;
    absolute
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| {
            StorageError::Storage(format!(
                "Storage directory '{}' is not valid UTF-8",
                absolute.display()
            ))
        })
}

/// Loads SlateDB settings from `settings_path`, or from SlateDB's default
/// sources when no path is given.
pub fn load_settings(settings_path: Option<&str>) -> StorageResult<Settings> {
    match settings_path {
        Some(path) => Settings::from_file(path).map_err(|e| {
            StorageError::Storage(format!(
                "Failed to load SlateDB settings from {}: {}",
                path, e
            ))
        }),
        None => Ok(Settings::load().unwrap_or_default()),
    }
}
