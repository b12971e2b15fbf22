//! Flush semantics of `FunctionQueue`.
//!
//! Covers ordering, flush-once behavior, immediate execution after the flush,
//! and callbacks that enqueue more work while the flush is running.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use scriptorium_hooks::LifecycleEvent;
use scriptorium_hooks::schedule::OnExecuted;
use scriptorium_queue::{FunctionQueue, QueuePhase, Queueable};

type Log = Arc<Mutex<Vec<&'static str>>>;

fn record(log: &Log, entry: &'static str) {
    log.lock().unwrap().push(entry);
}

// ═══════════════════════════════════════════════════════════════════════════════
// FLUSH TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Two queued callbacks both run once and the queue reports executed.
#[tokio::test]
async fn execute_runs_queued_callbacks_once() {
    let queue = FunctionQueue::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = {
        let calls = Arc::clone(&calls);
        queue.enqueue(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            1
        })
    };
    let second = {
        let calls = Arc::clone(&calls);
        queue.enqueue(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            2
        })
    };

    queue.execute().await;

    assert_eq!(first.await, Ok(1));
    assert_eq!(second.await, Ok(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(queue.is_executed());
}

/// A second `execute` runs nothing again.
#[tokio::test]
async fn second_execute_is_noop() {
    let queue = FunctionQueue::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let _done = queue.enqueue(move |_| counter.fetch_add(1, Ordering::SeqCst));

    queue.execute().await;
    queue.execute().await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Synchronous and asynchronous callbacks resolve with their own values.
#[tokio::test]
async fn mixed_callbacks_resolve_with_their_values() {
    let queue = FunctionQueue::new();

    let number = queue.enqueue(|_| 1);
    let text = queue.enqueue(|_| "test");
    let async_number = queue.enqueue_async(|_| async { 1 });
    let async_text = queue.enqueue_async(|_| async { "test" });

    queue.execute().await;

    assert_eq!(number.await, Ok(1));
    assert_eq!(text.await, Ok("test"));
    assert_eq!(async_number.await, Ok(1));
    assert_eq!(async_text.await, Ok("test"));
}

/// Asynchronous callbacks finish before the next one starts.
#[tokio::test]
async fn async_callbacks_run_strictly_in_order() {
    let queue = FunctionQueue::new();
    let log: Log = Arc::default();

    let slow = {
        let log = Arc::clone(&log);
        queue.enqueue_async(move |_| async move {
            record(&log, "slow:start");
            tokio::task::yield_now().await;
            record(&log, "slow:end");
        })
    };
    let fast = {
        let log = Arc::clone(&log);
        queue.enqueue(move |_| record(&log, "fast"))
    };

    queue.execute().await;
    slow.await.unwrap();
    fast.await.unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["slow:start", "slow:end", "fast"]);
}

/// Failures returned by a callback reach only that callback's future.
#[tokio::test]
async fn callback_failure_settles_its_own_future() {
    let queue = FunctionQueue::new();

    let failing = queue.enqueue(|_| Err::<u8, _>("boom"));
    let passing = queue.enqueue(|_| Ok::<_, &str>(3));

    queue.execute().await;

    assert_eq!(failing.await, Ok(Err("boom")));
    assert_eq!(passing.await, Ok(Ok(3)));
}

// ═══════════════════════════════════════════════════════════════════════════════
// AFTER-FLUSH TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Once executed, new callbacks bypass the buffer.
#[tokio::test]
async fn enqueue_after_execute_runs_immediately() {
    let queue = FunctionQueue::new();
    queue.execute().await;

    let result = queue.enqueue(|_| "now");

    assert!(queue.is_empty(), "executed queues never buffer");
    assert_eq!(result.await, Ok("now"));
}

/// Work enqueued by a callback during the flush runs immediately, within the
/// enqueuing callback, instead of being appended to the drained list.
#[tokio::test]
async fn enqueue_during_flush_runs_immediately() {
    let queue = FunctionQueue::new();
    let log: Log = Arc::default();

    let outer = {
        let log = Arc::clone(&log);
        queue.enqueue_async(move |target: FunctionQueue| async move {
            record(&log, "outer");
            assert_eq!(target.phase(), QueuePhase::Flushing);
            assert!(!target.is_executed());

            let nested_log = Arc::clone(&log);
            let nested = target.enqueue(move |_| {
                record(&nested_log, "nested");
                7
            });
            assert!(target.is_empty(), "nested callback must not be buffered");
            nested.await
        })
    };
    let second = {
        let log = Arc::clone(&log);
        queue.enqueue(move |_| record(&log, "second"))
    };

    queue.execute().await;

    assert_eq!(outer.await, Ok(Ok(7)));
    second.await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["outer", "nested", "second"]);
    assert!(queue.is_executed());
}

/// Immediate callbacks run even when nobody awaits their result.
#[tokio::test]
async fn unawaited_callback_after_execute_still_runs() {
    let queue = FunctionQueue::new();
    let calls = Arc::new(AtomicUsize::new(0));
    queue.execute().await;

    let counter = Arc::clone(&calls);
    drop(queue.enqueue(move |_| counter.fetch_add(1, Ordering::SeqCst)));
    let counter = Arc::clone(&calls);
    drop(queue.enqueue_async(move |_| async move {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

/// A callback enqueued during the flush and never awaited still runs, before
/// the enqueuing callback continues.
#[tokio::test]
async fn unawaited_enqueue_during_flush_runs_in_place() {
    let queue = FunctionQueue::new();
    let log: Log = Arc::default();

    let outer = {
        let log = Arc::clone(&log);
        queue.enqueue(move |target: FunctionQueue| {
            record(&log, "outer:start");
            let nested_log = Arc::clone(&log);
            drop(target.enqueue(move |_| record(&nested_log, "nested")));
            record(&log, "outer:end");
        })
    };

    queue.execute().await;

    outer.await.unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["outer:start", "nested", "outer:end"]
    );
}

/// Immediate async work that suspends resumes when its future is awaited.
#[tokio::test]
async fn suspending_immediate_callback_finishes_when_awaited() {
    let queue = FunctionQueue::new();
    let log: Log = Arc::default();
    queue.execute().await;

    let pending = {
        let log = Arc::clone(&log);
        queue.enqueue_async(move |_| async move {
            record(&log, "start");
            tokio::task::yield_now().await;
            record(&log, "end");
            9
        })
    };
    assert_eq!(*log.lock().unwrap(), vec!["start"]);

    assert_eq!(pending.await, Ok(9));
    assert_eq!(*log.lock().unwrap(), vec!["start", "end"]);
}

/// The executed hook reports how many callbacks the flush ran.
#[tokio::test]
async fn executed_event_reports_callback_count() {
    let queue = FunctionQueue::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    queue
        .hooks()
        .register_observer::<OnExecuted, _>("counter", move |event: &LifecycleEvent| {
            sink.lock().unwrap().push(event.clone());
        })
        .unwrap();

    let _a = queue.enqueue(|_| ());
    let _b = queue.enqueue(|_| ());
    queue.execute().await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec![LifecycleEvent::Executed { callbacks: 2 }]
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTY TESTS
// ═══════════════════════════════════════════════════════════════════════════════

/// `proptest` has no async test support, so every case drives the queue with
/// `tokio_test::block_on`.
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn flush_runs_each_callback_once_in_order(
            values in prop::collection::vec(any::<u32>(), 0..32),
            late in 0usize..4,
        ) {
            let (ran, results, late_results) = tokio_test::block_on(async {
                let queue = FunctionQueue::new();
                let ran = Arc::new(Mutex::new(Vec::new()));

                let pending: Vec<_> = values
                    .iter()
                    .map(|&value| {
                        let ran = Arc::clone(&ran);
                        queue.enqueue(move |_| {
                            ran.lock().unwrap().push(value);
                            value
                        })
                    })
                    .collect();

                queue.execute().await;
                queue.execute().await;

                let mut results = Vec::new();
                for future in pending {
                    results.push(future.await.unwrap());
                }

                let mut late_results = Vec::new();
                for index in 0..late {
                    late_results.push(queue.enqueue(move |_| index).await.unwrap());
                }

                let ran = ran.lock().unwrap().clone();
                (ran, results, late_results)
            });

            prop_assert_eq!(&ran, &values);
            prop_assert_eq!(&results, &values);
            prop_assert_eq!(late_results, (0..late).collect::<Vec<_>>());
        }
    }
}
