// Application Layer - Task scheduling

pub mod queue;

// Re-exports
pub use queue::{Completion, TaskQueue};
