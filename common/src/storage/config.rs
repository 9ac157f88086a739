//! Object store configuration shared by the SlateDB-backed store.

use serde::{Deserialize, Serialize};

/// Where SlateDB keeps its objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectStoreConfig {
    /// Volatile store held in process memory.
    InMemory,
    /// Local filesystem rooted at `/`; database paths are absolute.
    Local(LocalObjectStoreConfig),
    /// Amazon S3 or an S3-compatible endpoint.
    Aws(AwsObjectStoreConfig),
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        ObjectStoreConfig::Local(LocalObjectStoreConfig::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectStoreConfig {
    /// Directory the database lives in.
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsObjectStoreConfig {
    pub bucket: String,
    /// Region; when empty the `AWS_REGION` environment value applies.
    #[serde(default)]
    pub region: String,
    /// Custom endpoint for S3-compatible services (MinIO, LocalStack).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}
