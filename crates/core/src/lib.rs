// taskq Core - Bounded-parallelism task queue with ordered results

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{Completion, TaskQueue};
pub use domain::{Parallelism, QueueConfig, QueueStats};
pub use error::{QueueError, Result};
pub use port::Task;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
