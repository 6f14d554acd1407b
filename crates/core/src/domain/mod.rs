// Domain Layer - Queue configuration and limits

pub mod limit;
pub mod queue;

// Re-exports
pub use limit::Parallelism;
pub use queue::{
    QueueConfig, QueueId, QueueStats, DEFAULT_QUEUE_NAME, ENV_PARALLELISM, ENV_QUEUE_NAME,
};
