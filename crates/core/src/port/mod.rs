// Port Layer - Interfaces for work supplied by callers

pub mod task;

// Re-exports
pub use task::{ArgsTask, FnTask, LocalFutureTask, Task};
