// Task Port
// Abstraction over a unit of deferred work submitted to a TaskQueue

use crate::application::queue::Completion;
use std::future::Future;

/// A unit of work that reports its outcome through a completion signal
///
/// Implementations:
/// - FnTask: a closure receiving only the signal
/// - ArgsTask: a closure receiving fixed arguments ahead of the signal
/// - LocalFutureTask: a future driven by `tokio::task::spawn_local`
///
/// The queue calls `run` exactly once, when a parallelism slot is free.
/// `done` may be signalled before `run` returns or at any later point.
pub trait Task<T, E> {
    fn run(self: Box<Self>, done: Completion<T, E>);
}

/// Closure task without extra arguments
pub struct FnTask<F>(F);

impl<F> FnTask<F> {
    pub fn new(op: F) -> Self {
        Self(op)
    }
}

impl<T, E, F> Task<T, E> for FnTask<F>
where
    F: FnOnce(Completion<T, E>),
{
    fn run(self: Box<Self>, done: Completion<T, E>) {
        (self.0)(done)
    }
}

/// Closure task with a fixed argument value forwarded on invocation
///
/// Several arguments are passed as a tuple.
pub struct ArgsTask<A, F> {
    args: A,
    op: F,
}

impl<A, F> ArgsTask<A, F> {
    pub fn new(args: A, op: F) -> Self {
        Self { args, op }
    }
}

impl<T, E, A, F> Task<T, E> for ArgsTask<A, F>
where
    F: FnOnce(A, Completion<T, E>),
{
    fn run(self: Box<Self>, done: Completion<T, E>) {
        let ArgsTask { args, op } = *self;
        op(args, done)
    }
}

/// Future task, spawned onto the current `LocalSet` when started
///
/// # Panics
/// `run` panics when called outside of a `tokio::task::LocalSet`, the same
/// way `tokio::task::spawn_local` does.
pub struct LocalFutureTask<Fut>(Fut);

impl<Fut> LocalFutureTask<Fut> {
    pub fn new(future: Fut) -> Self {
        Self(future)
    }
}

impl<T, E, Fut> Task<T, E> for LocalFutureTask<Fut>
where
    T: 'static,
    E: 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    fn run(self: Box<Self>, done: Completion<T, E>) {
        let future = self.0;
        tokio::task::spawn_local(async move {
            done.complete(future.await);
        });
    }
}
