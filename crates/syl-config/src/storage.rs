//! Blob storage settings shared by every backend.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

fn default_bucket() -> String {
    String::from("syllabus-files")
}

fn default_local_root() -> String {
    String::from(".syllabus/blobs")
}

const fn default_url_ttl_secs() -> u64 {
    3600
}

/// Seven days, the longest presigned URL lifetime S3 accepts.
const fn default_max_url_ttl_secs() -> u64 {
    604_800
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Bucket name recorded on file rows.
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Root directory of the local filesystem store (used when R2 is not configured).
    #[serde(default = "default_local_root")]
    pub local_root: String,

    /// Signed URL lifetime when the caller does not pass one.
    #[serde(default = "default_url_ttl_secs")]
    pub default_url_ttl_secs: u64,

    /// Upper bound on any requested signed URL lifetime.
    #[serde(default = "default_max_url_ttl_secs")]
    pub max_url_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            local_root: default_local_root(),
            default_url_ttl_secs: default_url_ttl_secs(),
            max_url_ttl_secs: default_max_url_ttl_secs(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub const fn default_url_ttl(&self) -> Duration {
        Duration::from_secs(self.default_url_ttl_secs)
    }

    #[must_use]
    pub const fn max_url_ttl(&self) -> Duration {
        Duration::from_secs(self.max_url_ttl_secs)
    }

    /// Reject TTL settings that could never produce a valid URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_url_ttl_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.max_url_ttl_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.default_url_ttl_secs == 0 || self.default_url_ttl_secs > self.max_url_ttl_secs {
            return Err(ConfigError::InvalidValue {
                field: "storage.default_url_ttl_secs".into(),
                reason: format!("must be within 1..={}", self.max_url_ttl_secs),
            });
        }
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.bucket".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}
