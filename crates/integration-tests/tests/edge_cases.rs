//! Edge Cases - re-entrancy, settling and abandoned queues

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use taskq_core::{Completion, QueueError, Task, TaskQueue};
use tokio::task::LocalSet;
use tokio::time::sleep;

/// Task that completes synchronously or after a delay, recording its starts
struct Tracked {
    index: usize,
    synchronous: bool,
    starts: Rc<RefCell<Vec<usize>>>,
    active: Rc<Cell<usize>>,
    peak: Rc<Cell<usize>>,
}

impl Task<usize, String> for Tracked {
    fn run(self: Box<Self>, done: Completion<usize, String>) {
        let task = *self;
        task.starts.borrow_mut().push(task.index);
        task.active.set(task.active.get() + 1);
        task.peak.set(task.peak.get().max(task.active.get()));

        if task.synchronous {
            task.active.set(task.active.get() - 1);
            done.ok(task.index);
            return;
        }

        tokio::task::spawn_local(async move {
            sleep(Duration::from_millis(10)).await;
            task.active.set(task.active.get() - 1);
            done.ok(task.index);
        });
    }
}

/// Edge Case 1: p = 2, 5 tasks, 3 of them synchronous
#[tokio::test(start_paused = true)]
async fn test_synchronous_completions_mixed_with_async() {
    LocalSet::new()
        .run_until(async {
            let starts = Rc::new(RefCell::new(Vec::new()));
            let active = Rc::new(Cell::new(0));
            let peak = Rc::new(Cell::new(0));
            let queue: TaskQueue<usize, String> = TaskQueue::new(2);

            for (index, synchronous) in [true, false, true, false, true].into_iter().enumerate() {
                queue.defer_task(Tracked {
                    index,
                    synchronous,
                    starts: Rc::clone(&starts),
                    active: Rc::clone(&active),
                    peak: Rc::clone(&peak),
                });
            }

            let outcome = queue.settled().await.unwrap();

            assert_eq!(*starts.borrow(), vec![0, 1, 2, 3, 4]);
            assert!(peak.get() <= 2);
            assert_eq!(outcome, Ok(vec![0, 1, 2, 3, 4]));
        })
        .await;

    println!("✅ Edge Case 1: no double start, no skipped task");
}

/// Edge Case 2: all tasks synchronous and chained behind one async head
#[tokio::test(start_paused = true)]
async fn test_synchronous_chain_behind_async_head() {
    LocalSet::new()
        .run_until(async {
            let starts = Rc::new(RefCell::new(Vec::new()));
            let active = Rc::new(Cell::new(0));
            let peak = Rc::new(Cell::new(0));
            let queue: TaskQueue<usize, String> = TaskQueue::new(1);

            for index in 0..500 {
                queue.defer_task(Tracked {
                    index,
                    synchronous: index > 0,
                    starts: Rc::clone(&starts),
                    active: Rc::clone(&active),
                    peak: Rc::clone(&peak),
                });
            }
            assert_eq!(queue.stats().started, 1);

            let outcome = queue.settled().await.unwrap();

            assert_eq!(*starts.borrow(), (0..500).collect::<Vec<_>>());
            assert_eq!(peak.get(), 1);
            assert_eq!(outcome, Ok((0..500).collect::<Vec<_>>()));
        })
        .await;

    println!("✅ Edge Case 2: chained synchronous completions");
}

/// Edge Case 3: zero tasks settle immediately
#[test]
fn test_zero_tasks_settle_immediately() {
    let queue: TaskQueue<i32, String> = TaskQueue::new(4);
    let fired = Rc::new(Cell::new(false));
    let flag = Rc::clone(&fired);
    queue.on_complete_all(move |outcome| {
        assert_eq!(outcome, Ok(vec![]));
        flag.set(true);
    });
    assert!(fired.get());

    println!("✅ Edge Case 3: zero tasks");
}

/// Edge Case 4: a dropped completion signal abandons the queue
#[tokio::test]
async fn test_dropped_signal_abandons_queue() {
    let queue: TaskQueue<i32, String> = TaskQueue::new(1);
    queue.defer(|done| done.ok(1)).defer(|done| drop(done));

    let result = queue.settled().await;
    assert!(matches!(result, Err(QueueError::Abandoned)));

    println!("✅ Edge Case 4: abandoned queue reported");
}

/// Edge Case 5: late signals from tasks still running after a failure
#[tokio::test(start_paused = true)]
async fn test_late_signals_after_failure_are_ignored() {
    LocalSet::new()
        .run_until(async {
            let calls = Rc::new(Cell::new(0));
            let queue: TaskQueue<u64, String> = TaskQueue::unbounded();

            for delay in [20u64, 5, 15] {
                queue.defer_local(async move {
                    sleep(Duration::from_millis(delay)).await;
                    if delay == 5 {
                        Err("fast failure".to_string())
                    } else {
                        Ok(delay)
                    }
                });
            }

            let c = Rc::clone(&calls);
            let outcome = Rc::new(RefCell::new(None));
            let o = Rc::clone(&outcome);
            queue.on_complete_all(move |result| {
                c.set(c.get() + 1);
                *o.borrow_mut() = Some(result);
            });

            sleep(Duration::from_millis(50)).await;

            assert_eq!(calls.get(), 1);
            assert_eq!(*outcome.borrow(), Some(Err("fast failure".to_string())));
        })
        .await;

    println!("✅ Edge Case 5: first error is final");
}
