pub mod bytes;
pub mod storage;

pub use bytes::BytesRange;
pub use storage::config::ObjectStoreConfig;
pub use storage::{StorageError, StorageResult};
