// Queue State Machine
//
// Idle -> Scheduling -> Idle ... -> Settled
// Settled is terminal: entered on the first task error, or once every task
// has succeeded and a completion handler is registered.

use crate::domain::{Parallelism, QueueStats};
use crate::port::Task;
use std::mem;
use tracing::{debug, info, warn};

pub(crate) type BoxedTask<T, E> = Box<dyn Task<T, E>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    /// No scheduling pass is running
    Idle,
    /// A scheduling pass is starting tasks; completions only update counters
    Scheduling,
    /// Outcome is final
    Settled,
}

/// Registered completion handler
pub(crate) enum Handler<T, E> {
    /// Error first, then each result as a positional value
    Each(Box<dyn FnOnce(Option<E>, std::vec::IntoIter<T>)>),
    /// Error or the full ordered result list
    All(Box<dyn FnOnce(Result<Vec<T>, E>)>),
}

/// A handler paired with its outcome, ready to fire outside of any borrow
pub(crate) struct Delivery<T, E> {
    handler: Handler<T, E>,
    outcome: Result<Vec<T>, E>,
}

impl<T, E> Delivery<T, E> {
    pub(crate) fn fire(self) {
        match self.handler {
            Handler::Each(handler) => match self.outcome {
                Ok(results) => handler(None, results.into_iter()),
                Err(error) => handler(Some(error), Vec::new().into_iter()),
            },
            Handler::All(handler) => handler(self.outcome),
        }
    }
}

pub(crate) struct QueueState<T, E> {
    name: String,
    parallelism: Parallelism,
    /// Operations not yet started, one slot per submission
    tasks: Vec<Option<BoxedTask<T, E>>>,
    /// Results by submission index
    results: Vec<Option<T>>,
    started: usize,
    active: usize,
    remaining: usize,
    /// First error, held until a handler takes it
    error: Option<E>,
    failed: bool,
    handler: Option<Handler<T, E>>,
    phase: Phase,
}

impl<T, E> QueueState<T, E> {
    pub(crate) fn new(name: String, parallelism: Parallelism) -> Self {
        Self {
            name,
            parallelism,
            tasks: Vec::new(),
            results: Vec::new(),
            started: 0,
            active: 0,
            remaining: 0,
            error: None,
            failed: false,
            handler: None,
            phase: Phase::Idle,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Append a task; returns false when the queue has already settled
    pub(crate) fn push(&mut self, task: BoxedTask<T, E>) -> bool {
        if self.phase == Phase::Settled {
            debug!(
                queue = %self.name,
                failed = self.failed,
                "Submission dropped: queue already settled"
            );
            return false;
        }

        self.tasks.push(Some(task));
        self.results.push(None);
        self.remaining += 1;
        debug!(
            queue = %self.name,
            index = self.tasks.len() - 1,
            remaining = self.remaining,
            "Task submitted"
        );
        true
    }

    /// Enter Scheduling; false if a pass is already running or the queue settled
    pub(crate) fn begin_pass(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Scheduling;
        true
    }

    /// Leave Scheduling unless a completion settled the queue meanwhile
    pub(crate) fn end_pass(&mut self) {
        if self.phase == Phase::Scheduling {
            self.phase = Phase::Idle;
        }
    }

    /// Mark the next unstarted task as started, if a slot is free
    pub(crate) fn next_runnable(&mut self) -> Option<(usize, BoxedTask<T, E>)> {
        if self.phase == Phase::Settled || !self.parallelism.admits(self.active) {
            return None;
        }

        let index = self.started;
        let task = self.tasks.get_mut(index)?.take()?;
        self.started += 1;
        self.active += 1;

        debug!(
            queue = %self.name,
            index,
            active = self.active,
            "Task started"
        );
        Some((index, task))
    }

    pub(crate) fn record_success(&mut self, index: usize, value: T) -> Option<Delivery<T, E>> {
        self.active = self.active.saturating_sub(1);
        if self.phase == Phase::Settled {
            debug!(queue = %self.name, index, "Late completion ignored");
            return None;
        }

        if let Some(slot) = self.results.get_mut(index) {
            *slot = Some(value);
        }
        self.remaining = self.remaining.saturating_sub(1);
        debug!(
            queue = %self.name,
            index,
            active = self.active,
            remaining = self.remaining,
            "Task completed"
        );

        if self.remaining == 0 && self.handler.is_some() {
            self.settle();
            return self.take_delivery();
        }
        None
    }

    pub(crate) fn record_failure(&mut self, index: usize, error: E) -> Option<Delivery<T, E>> {
        self.active = self.active.saturating_sub(1);
        if self.phase == Phase::Settled {
            debug!(queue = %self.name, index, "Late failure ignored");
            return None;
        }

        // Unstarted tasks are never run once the queue failed
        let dropped = self.tasks.iter_mut().filter_map(Option::take).count();
        warn!(
            queue = %self.name,
            index,
            active = self.active,
            dropped,
            "Task failed, queue settling with error"
        );

        self.failed = true;
        self.error = Some(error);
        self.results.clear();
        self.settle();
        self.take_delivery()
    }

    pub(crate) fn register(&mut self, handler: Handler<T, E>) -> Option<Delivery<T, E>> {
        self.handler = Some(handler);
        if self.phase == Phase::Settled || self.remaining == 0 {
            self.settle();
            return self.take_delivery();
        }
        None
    }

    pub(crate) fn stats(&self) -> QueueStats {
        QueueStats {
            submitted: self.tasks.len(),
            started: self.started,
            active: self.active,
            remaining: self.remaining,
            failed: self.failed,
            settled: self.phase == Phase::Settled,
        }
    }

    fn settle(&mut self) {
        if self.phase != Phase::Settled {
            self.phase = Phase::Settled;
            info!(
                queue = %self.name,
                tasks = self.tasks.len(),
                failed = self.failed,
                "Queue settled"
            );
        }
    }

    fn take_delivery(&mut self) -> Option<Delivery<T, E>> {
        if self.phase != Phase::Settled {
            return None;
        }
        // The error is moved out on delivery; never fall back to results
        if self.failed && self.error.is_none() {
            return None;
        }

        let handler = self.handler.take()?;
        let outcome = match self.error.take() {
            Some(error) => Err(error),
            None => Ok(mem::take(&mut self.results).into_iter().flatten().collect()),
        };
        Some(Delivery { handler, outcome })
    }
}
