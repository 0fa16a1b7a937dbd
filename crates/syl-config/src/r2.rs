//! Cloudflare R2 configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_bucket_name() -> String {
    String::from("syllabus-files")
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct R2Config {
    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Custom endpoint URL. If empty, built from `account_id`.
    #[serde(default)]
    pub endpoint: String,
}

impl Default for R2Config {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: default_bucket_name(),
            endpoint: String::new(),
        }
    }
}

impl R2Config {
    /// Check if the R2 config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.account_id.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.bucket_name.is_empty()
    }

    /// Credential fields that are still empty.
    fn missing_fields(&self) -> Vec<String> {
        [
            ("r2.account_id", &self.account_id),
            ("r2.access_key_id", &self.access_key_id),
            ("r2.secret_access_key", &self.secret_access_key),
            ("r2.bucket_name", &self.bucket_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
    }

    /// An untouched section means "use local storage". A section with some
    /// credentials set but others missing is a mistake, not a fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let any_credential = !self.account_id.is_empty()
            || !self.access_key_id.is_empty()
            || !self.secret_access_key.is_empty();
        if !any_credential || self.is_configured() {
            return Ok(());
        }
        Err(ConfigError::NotConfigured {
            section: "r2".into(),
            missing: self.missing_fields(),
        })
    }

    /// Returns the custom `endpoint` if set, otherwise builds from `account_id`.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.is_empty() {
            format!("https://{}.r2.cloudflarestorage.com", self.account_id)
        } else {
            self.endpoint.clone()
        }
    }
}
