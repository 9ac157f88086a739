//! Location strings and the configuration they resolve to.
//!
//! ```text
//! location := ""                       default LSM directory
//!           | <path>                   LSM store on <path>
//!           | "slatedb:" ["//"] rest   SlateDB store
//! rest     := ""                       default SlateDB directory
//!           | "{" json                 SlateDbLocation
//!           | <path>
//! ```

use std::path::PathBuf;

use common::storage::config::{AwsObjectStoreConfig, LocalObjectStoreConfig, ObjectStoreConfig};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Scheme selecting the SlateDB backend, matched case-insensitively.
pub const SLATEDB_SCHEME: &str = "slatedb:";

/// Directory used by the LSM backend when no path is given.
pub const DEFAULT_LSM_DIR: &str = "data/lsm";

/// Directory used by the SlateDB backend when no path is given.
pub const DEFAULT_SLATEDB_DIR: &str = "data/slatedb";

/// Which backend to open and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Lsm(LsmConfig),
    SlateDb(SlateDbConfig),
}

/// Configuration of the LSM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LsmConfig {
    /// Nothing survives the store.
    InMemory,
    OnDisk { path: PathBuf },
}

/// Configuration of the SlateDB backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlateDbConfig {
    /// Directory created for the database; also the database path for the
    /// local provider and the key prefix for remote providers.
    pub path: String,
    pub object_store: ObjectStoreConfig,
    /// Optional SlateDB settings file.
    pub settings_path: Option<String>,
}

/// JSON form accepted after the `slatedb:` scheme.
#[derive(Debug, Default, Deserialize)]
pub struct SlateDbLocation {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub store: Option<ProviderConfig>,
    #[serde(default)]
    pub settings_path: Option<String>,
}

/// Object store provider section of [`SlateDbLocation`].
#[derive(Debug, Default, Deserialize)]
pub struct ProviderConfig {
    /// `local`, `aws` or `memory`. Anything else falls back to `local`.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub aws: Option<AwsObjectStoreConfig>,
}

impl Location {
    /// Resolves a caller-supplied location string.
    ///
    /// `in_memory` only affects the LSM backend.
    pub fn parse(raw: &str, in_memory: bool) -> Result<Self> {
        let trimmed = raw.trim();
        match strip_scheme(trimmed) {
            Some(rest) => parse_slatedb(rest).map(Location::SlateDb),
            None => Ok(Location::Lsm(parse_lsm(trimmed, in_memory))),
        }
    }
}

fn strip_scheme(location: &str) -> Option<&str> {
    let head = location.get(..SLATEDB_SCHEME.len())?;
    if head.eq_ignore_ascii_case(SLATEDB_SCHEME) {
        Some(&location[SLATEDB_SCHEME.len()..])
    } else {
        None
    }
}

fn parse_lsm(path: &str, in_memory: bool) -> LsmConfig {
    if in_memory {
        LsmConfig::InMemory
    } else if path.is_empty() {
        LsmConfig::OnDisk {
            path: PathBuf::from(DEFAULT_LSM_DIR),
        }
    } else {
        LsmConfig::OnDisk {
            path: PathBuf::from(path),
        }
    }
}

fn parse_slatedb(rest: &str) -> Result<SlateDbConfig> {
    let rest = rest.trim();
    let rest = rest.strip_prefix("//").unwrap_or(rest);

    let location = if rest.trim_start().starts_with('{') {
        serde_json::from_str::<SlateDbLocation>(rest)
            .map_err(|e| Error::Open(format!("invalid slatedb configuration: {}", e)))?
    } else if rest.is_empty() {
        SlateDbLocation::default()
    } else {
        SlateDbLocation {
            path: Some(rest.to_string()),
            ..SlateDbLocation::default()
        }
    };

    let path = location
        .path
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_SLATEDB_DIR.to_string());
    let object_store = resolve_provider(location.store.unwrap_or_default(), &path)?;

    Ok(SlateDbConfig {
        path,
        object_store,
        settings_path: location.settings_path,
    })
}

fn resolve_provider(config: ProviderConfig, path: &str) -> Result<ObjectStoreConfig> {
    let provider = config
        .provider
        .map(|p| p.trim().to_ascii_lowercase())
        .unwrap_or_default();
    match provider.as_str() {
        "aws" => config.aws.map(ObjectStoreConfig::Aws).ok_or_else(|| {
            Error::Open("aws provider requires an \"aws\" section".to_string())
        }),
        "memory" => Ok(ObjectStoreConfig::InMemory),
        "" | "local" => Ok(local_store(path)),
        other => {
            tracing::warn!(provider = other, "unknown object store provider, using local");
            Ok(local_store(path))
        }
    }
}

fn local_store(path: &str) -> ObjectStoreConfig {
    ObjectStoreConfig::Local(LocalObjectStoreConfig {
        path: path.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slate(raw: &str) -> SlateDbConfig {
        match Location::parse(raw, false).unwrap() {
            Location::SlateDb(config) => config,
            other => panic!("expected slatedb location, got {other:?}"),
        }
    }

    #[test]
    fn should_use_default_lsm_dir_for_empty_location() {
        assert_eq!(
            Location::parse("", false).unwrap(),
            Location::Lsm(LsmConfig::OnDisk {
                path: PathBuf::from(DEFAULT_LSM_DIR)
            })
        );
    }

    #[test]
    fn should_open_lsm_in_memory_regardless_of_path() {
        assert_eq!(
            Location::parse("", true).unwrap(),
            Location::Lsm(LsmConfig::InMemory)
        );
        assert_eq!(
            Location::parse("/var/lib/kv", true).unwrap(),
            Location::Lsm(LsmConfig::InMemory)
        );
    }

    #[test]
    fn should_trim_lsm_path() {
        assert_eq!(
            Location::parse("  ./kv-data \n", false).unwrap(),
            Location::Lsm(LsmConfig::OnDisk {
                path: PathBuf::from("./kv-data")
            })
        );
    }

    #[test]
    fn should_use_default_slatedb_dir_for_bare_scheme() {
        // when
        let config = slate("slatedb:");

        // then
        assert_eq!(config.path, DEFAULT_SLATEDB_DIR);
        assert_eq!(config.object_store, local_store(DEFAULT_SLATEDB_DIR));
        assert_eq!(slate("slatedb://").path, DEFAULT_SLATEDB_DIR);
    }

    #[test]
    fn should_match_scheme_case_insensitively() {
        assert_eq!(slate("  SlateDB:///tmp/kv").path, "/tmp/kv");
        assert_eq!(slate("SLATEDB:relative/kv").path, "relative/kv");
    }

    #[test]
    fn should_parse_json_configuration() {
        // given
        let raw = r#"slatedb://{"path": "kv", "store": {"provider": "aws",
            "aws": {"bucket": "b", "region": "eu-west-1", "endpoint": "http://localhost:4566"}}}"#;

        // when
        let config = slate(raw);

        // then
        assert_eq!(config.path, "kv");
        assert_eq!(
            config.object_store,
            ObjectStoreConfig::Aws(AwsObjectStoreConfig {
                bucket: "b".to_string(),
                region: "eu-west-1".to_string(),
                endpoint: Some("http://localhost:4566".to_string()),
            })
        );
    }

    #[test]
    fn should_fall_back_to_defaults_inside_json() {
        // when
        let config = slate(r#"slatedb:{"store": {}}"#);

        // then
        assert_eq!(config.path, DEFAULT_SLATEDB_DIR);
        assert_eq!(config.object_store, local_store(DEFAULT_SLATEDB_DIR));
    }

    #[test]
    fn should_treat_unknown_provider_as_local() {
        let config = slate(r#"slatedb:{"path": "p", "store": {"provider": "gcs"}}"#);

        assert_eq!(config.object_store, local_store("p"));
    }

    #[test]
    fn should_accept_memory_provider_and_settings_path() {
        // when
        let config =
            slate(r#"slatedb:{"path":"p","store":{"provider":"memory"},"settings_path":"s.toml"}"#);

        // then
        assert_eq!(config.object_store, ObjectStoreConfig::InMemory);
        assert_eq!(config.settings_path.as_deref(), Some("s.toml"));
    }

    #[test]
    fn should_reject_malformed_json() {
        let result = Location::parse(r#"slatedb:{"path": "#, false);

        assert!(matches!(result, Err(Error::Open(_))));
    }

    #[test]
    fn should_reject_aws_without_section() {
        let result = Location::parse(r#"slatedb:{"store": {"provider": "aws"}}"#, false);

        assert!(matches!(result, Err(Error::Open(_))));
    }

    #[test]
    fn should_ignore_in_memory_flag_for_slatedb() {
        let location = Location::parse("slatedb:/tmp/kv", true).unwrap();

        assert!(matches!(location, Location::SlateDb(_)));
    }
}
