// Queue Domain Model

use super::Parallelism;
use crate::error::{QueueError, Result};
use serde::Deserialize;

/// Queue identifier
pub type QueueId = String;

/// Environment variable holding the queue name
pub const ENV_QUEUE_NAME: &str = "TASKQ_QUEUE_NAME";

/// Environment variable holding the parallelism limit (`0`, `unbounded` or N)
pub const ENV_PARALLELISM: &str = "TASKQ_PARALLELISM";

/// Name used when no queue name is configured
pub const DEFAULT_QUEUE_NAME: &str = "default";

/// Queue configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Name attached to every log event of the queue
    pub name: QueueId,
    pub parallelism: Parallelism,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_QUEUE_NAME.to_string(),
            parallelism: Parallelism::Unbounded,
        }
    }
}

impl QueueConfig {
    pub fn new(name: impl Into<String>, parallelism: Parallelism) -> Self {
        Self {
            name: name.into(),
            parallelism,
        }
    }

    /// Load configuration from `TASKQ_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Missing keys keep their defaults; present but invalid values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup(ENV_QUEUE_NAME) {
            let name = name.trim();
            if name.is_empty() {
                return Err(QueueError::Config(format!("{} is empty", ENV_QUEUE_NAME)));
            }
            config.name = name.to_string();
        }

        if let Some(raw) = lookup(ENV_PARALLELISM) {
            config.parallelism = raw.parse()?;
        }

        Ok(config)
    }
}

/// Point-in-time view of a queue's scheduling counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Tasks accepted by the queue
    pub submitted: usize,
    /// Tasks whose operation has been invoked
    pub started: usize,
    /// Tasks started but not finished
    pub active: usize,
    /// Tasks not yet finished successfully
    pub remaining: usize,
    pub failed: bool,
    /// Outcome fixed (first error, or all done with a handler registered)
    pub settled: bool,
}
