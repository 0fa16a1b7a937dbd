//! Workflow engine tuning: blob cleanup retries after a failed metadata write.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_cleanup_max_attempts() -> u32 {
    3
}

const fn default_cleanup_base_delay_ms() -> u64 {
    500
}

const fn default_cleanup_max_delay_ms() -> u64 {
    4000
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Attempts at deleting an uploaded blob whose metadata insert failed.
    #[serde(default = "default_cleanup_max_attempts")]
    pub cleanup_max_attempts: u32,

    /// Delay before the second attempt; doubles after each failure.
    #[serde(default = "default_cleanup_base_delay_ms")]
    pub cleanup_base_delay_ms: u64,

    #[serde(default = "default_cleanup_max_delay_ms")]
    pub cleanup_max_delay_ms: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            cleanup_max_attempts: default_cleanup_max_attempts(),
            cleanup_base_delay_ms: default_cleanup_base_delay_ms(),
            cleanup_max_delay_ms: default_cleanup_max_delay_ms(),
        }
    }
}

impl WorkflowConfig {
    #[must_use]
    pub const fn cleanup_base_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_base_delay_ms)
    }

    #[must_use]
    pub const fn cleanup_max_delay(&self) -> Duration {
        Duration::from_millis(self.cleanup_max_delay_ms)
    }
}
