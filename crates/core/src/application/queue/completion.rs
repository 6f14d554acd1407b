// Completion Signal

use super::drive;
use super::state::QueueState;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// One-shot signal through which a started task reports its outcome
///
/// Every signalling method consumes the value, so a task cannot report
/// twice. Signalling may happen synchronously inside `Task::run` or later.
/// Dropping the signal without reporting stalls the queue.
pub struct Completion<T, E> {
    state: Rc<RefCell<QueueState<T, E>>>,
    index: usize,
    signaled: bool,
}

impl<T, E> Completion<T, E> {
    pub(crate) fn new(state: Rc<RefCell<QueueState<T, E>>>, index: usize) -> Self {
        Self {
            state,
            index,
            signaled: false,
        }
    }

    /// Submission index of the task this signal belongs to
    pub fn index(&self) -> usize {
        self.index
    }

    /// Report the task's outcome
    pub fn complete(mut self, result: Result<T, E>) {
        self.signaled = true;

        let delivery = {
            let mut state = self.state.borrow_mut();
            match result {
                Ok(value) => state.record_success(self.index, value),
                Err(error) => state.record_failure(self.index, error),
            }
        };

        match delivery {
            Some(delivery) => delivery.fire(),
            // Returns at once if a scheduling pass is already running
            None => drive(&self.state),
        }
    }

    pub fn ok(self, value: T) {
        self.complete(Ok(value))
    }

    pub fn err(self, error: E) {
        self.complete(Err(error))
    }
}

impl<T, E> Drop for Completion<T, E> {
    fn drop(&mut self) {
        if !self.signaled {
            match self.state.try_borrow() {
                Ok(state) => warn!(
                    queue = %state.name(),
                    index = self.index,
                    "Completion signal dropped without reporting an outcome"
                ),
                Err(_) => warn!(
                    index = self.index,
                    "Completion signal dropped without reporting an outcome"
                ),
            }
        }
    }
}

impl<T, E> fmt::Debug for Completion<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("index", &self.index)
            .field("signaled", &self.signaled)
            .finish()
    }
}
