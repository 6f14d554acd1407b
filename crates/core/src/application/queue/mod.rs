//! TaskQueue - bounded-parallelism queue with ordered results
//!
//! Tasks start in submission order as soon as a parallelism slot is free.
//! Results are collected by submission index, and the queue settles exactly
//! once: with the first task error, or with every result once all tasks
//! succeeded and a handler is registered.
//!
//! The queue is single-threaded (`!Send`). Tasks may signal completion
//! synchronously from inside their operation; the scheduler absorbs such
//! signals in its running pass instead of recursing.

mod completion;
mod state;

pub use completion::Completion;

use crate::domain::{Parallelism, QueueConfig, QueueStats, DEFAULT_QUEUE_NAME};
use crate::error::QueueError;
use crate::port::{ArgsTask, FnTask, LocalFutureTask, Task};
use state::{Handler, QueueState};
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use tokio::sync::oneshot;

/// Bounded-parallelism task queue
///
/// # Example
/// ```
/// use taskq_core::TaskQueue;
///
/// let queue: TaskQueue<u32, String> = TaskQueue::new(2);
/// queue
///     .defer(|done| done.ok(1))
///     .defer_with((2, 3), |(a, b), done| done.ok(a + b));
///
/// queue.on_complete_all(|outcome| {
///     assert_eq!(outcome, Ok(vec![1, 5]));
/// });
/// ```
pub struct TaskQueue<T, E> {
    state: Rc<RefCell<QueueState<T, E>>>,
}

impl<T: 'static, E: 'static> TaskQueue<T, E> {
    /// Create a queue; a parallelism of 0 means unbounded
    pub fn new(parallelism: usize) -> Self {
        Self::with_parallelism(Parallelism::new(parallelism))
    }

    pub fn unbounded() -> Self {
        Self::with_parallelism(Parallelism::Unbounded)
    }

    pub fn with_parallelism(parallelism: Parallelism) -> Self {
        Self::named(DEFAULT_QUEUE_NAME, parallelism)
    }

    /// Create a queue whose log events carry `name`
    pub fn named(name: impl Into<String>, parallelism: Parallelism) -> Self {
        Self {
            state: Rc::new(RefCell::new(QueueState::new(name.into(), parallelism))),
        }
    }

    pub fn from_config(config: &QueueConfig) -> Self {
        Self::named(config.name.clone(), config.parallelism)
    }

    /// Submit an operation that receives only its completion signal
    pub fn defer<F>(&self, op: F) -> &Self
    where
        F: FnOnce(Completion<T, E>) + 'static,
    {
        self.defer_task(FnTask::new(op))
    }

    /// Submit an operation with fixed arguments passed ahead of the signal
    pub fn defer_with<A, F>(&self, args: A, op: F) -> &Self
    where
        A: 'static,
        F: FnOnce(A, Completion<T, E>) + 'static,
    {
        self.defer_task(ArgsTask::new(args, op))
    }

    /// Submit a future, spawned with `tokio::task::spawn_local` once started
    ///
    /// # Panics
    /// Starting the task panics outside of a `tokio::task::LocalSet`.
    pub fn defer_local<Fut>(&self, future: Fut) -> &Self
    where
        Fut: Future<Output = Result<T, E>> + 'static,
    {
        self.defer_task(LocalFutureTask::new(future))
    }

    /// Submit any task; silently dropped once the queue has failed
    pub fn defer_task(&self, task: impl Task<T, E> + 'static) -> &Self {
        let accepted = self.state.borrow_mut().push(Box::new(task));
        if accepted {
            drive(&self.state);
        }
        self
    }

    /// Register a handler receiving the error first, then each result
    ///
    /// Fires synchronously if the outcome is already known.
    pub fn on_complete<F>(self, handler: F)
    where
        F: FnOnce(Option<E>, std::vec::IntoIter<T>) + 'static,
    {
        self.register(Handler::Each(Box::new(handler)))
    }

    /// Register a handler receiving the first error or all results in order
    ///
    /// Fires synchronously if the outcome is already known.
    pub fn on_complete_all<F>(self, handler: F)
    where
        F: FnOnce(Result<Vec<T>, E>) + 'static,
    {
        self.register(Handler::All(Box::new(handler)))
    }

    /// Future resolving to the queue's outcome
    ///
    /// Resolves to `Err(QueueError::Abandoned)` if the queue is dropped
    /// without settling, i.e. a completion signal was never reported.
    pub fn settled(self) -> impl Future<Output = crate::Result<Result<Vec<T>, E>>> {
        let (tx, rx) = oneshot::channel();
        self.on_complete_all(move |outcome| {
            let _ = tx.send(outcome);
        });
        async move { rx.await.map_err(|_| QueueError::Abandoned) }
    }

    fn register(self, handler: Handler<T, E>) {
        let delivery = self.state.borrow_mut().register(handler);
        if let Some(delivery) = delivery {
            delivery.fire();
        }
    }
}

impl<T, E> TaskQueue<T, E> {
    pub fn stats(&self) -> QueueStats {
        self.state.borrow().stats()
    }

    pub fn parallelism(&self) -> Parallelism {
        self.state.borrow().parallelism()
    }
}

impl<T: 'static, E: 'static> Default for TaskQueue<T, E> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T, E> fmt::Debug for TaskQueue<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TaskQueue")
            .field("name", &state.name())
            .field("parallelism", &state.parallelism())
            .field("stats", &state.stats())
            .finish()
    }
}

/// Start queued tasks while slots are free
///
/// Only one pass runs at a time. A completion arriving during the pass
/// frees its slot and the loop picks up the next task on its next check,
/// so synchronous completions never nest passes.
pub(crate) fn drive<T, E>(state: &Rc<RefCell<QueueState<T, E>>>) {
    if !state.borrow_mut().begin_pass() {
        return;
    }

    loop {
        let next = {
            let mut guard = state.borrow_mut();
            let next = guard.next_runnable();
            if next.is_none() {
                guard.end_pass();
            }
            next
        };

        match next {
            Some((index, task)) => task.run(Completion::new(Rc::clone(state), index)),
            None => break,
        }
    }
}
