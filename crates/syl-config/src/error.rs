//! Errors raised while loading or validating configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] figment::Error),

    /// Some but not all of a section's required fields are set.
    #[error("section '{section}' is partly configured; missing {}", missing.join(", "))]
    NotConfigured {
        section: String,
        missing: Vec<String>,
    },

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
