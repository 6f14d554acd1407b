// Parallelism Limit

use crate::error::{QueueError, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// Maximum number of tasks a queue may run at the same time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Every submitted task may start immediately
    #[default]
    Unbounded,

    /// At most this many tasks are active at once
    Max(NonZeroUsize),
}

impl Parallelism {
    /// Bounded limit; zero means unbounded
    pub fn new(max: usize) -> Self {
        Self::from(max)
    }

    /// Whether one more task may start while `active` tasks are running
    pub fn admits(&self, active: usize) -> bool {
        match self {
            Parallelism::Unbounded => true,
            Parallelism::Max(max) => active < max.get(),
        }
    }

    /// Upper bound, `None` when unbounded
    pub fn get(&self) -> Option<usize> {
        match self {
            Parallelism::Unbounded => None,
            Parallelism::Max(max) => Some(max.get()),
        }
    }
}

impl From<usize> for Parallelism {
    fn from(value: usize) -> Self {
        NonZeroUsize::new(value)
            .map(Parallelism::Max)
            .unwrap_or(Parallelism::Unbounded)
    }
}

impl From<Option<usize>> for Parallelism {
    fn from(value: Option<usize>) -> Self {
        value.map(Parallelism::from).unwrap_or_default()
    }
}

impl FromStr for Parallelism {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("unbounded") || trimmed.is_empty() {
            return Ok(Parallelism::Unbounded);
        }
        trimmed
            .parse::<usize>()
            .map(Parallelism::from)
            .map_err(|e| QueueError::Config(format!("invalid parallelism '{}': {}", trimmed, e)))
    }
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parallelism::Unbounded => write!(f, "unbounded"),
            Parallelism::Max(max) => write!(f, "{}", max),
        }
    }
}

// Accepts either a number (0 = unbounded) or the string form
impl<'de> Deserialize<'de> for Parallelism {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(usize),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(Parallelism::from(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
