//! Dispatch queue behavior: bounds, ordering, pacing, isolation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gambit::dispatch::{DispatchError, DispatchQueue};
use gambit::QueueConfig;

fn config(capacity: usize, concurrency: usize, interval_ms: u64) -> QueueConfig {
    QueueConfig {
        capacity,
        concurrency,
        interval_ms,
    }
}

#[tokio::test]
async fn tasks_start_in_admission_order() {
    let queue: DispatchQueue<usize, String> = DispatchQueue::new(&config(10, 1, 10));
    let starts: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

    let mut handles = Vec::new();
    for i in 0..5 {
        let queue = queue.clone();
        let starts = Arc::clone(&starts);
        handles.push(tokio::spawn(async move {
            queue
                .submit(async move {
                    starts.lock().unwrap().push(i);
                    Ok(i)
                })
                .await
        }));
        // Small gap so admission order is deterministic.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), i);
    }

    assert_eq!(*starts.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn in_flight_never_exceeds_concurrency() {
    let queue: DispatchQueue<usize, String> = DispatchQueue::new(&config(10, 2, 10));
    let current = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..6 {
        let queue = queue.clone();
        let current = Arc::clone(&current);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            queue
                .submit(async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
                .await
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert!(peak.load(Ordering::SeqCst) <= 2, "peak in-flight exceeded concurrency");
}

#[tokio::test]
async fn one_failing_task_leaves_siblings_alone() {
    let queue: DispatchQueue<usize, String> = DispatchQueue::new(&config(10, 1, 10));

    let mut handles = Vec::new();
    for i in 0..4 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            queue
                .submit(async move {
                    if i == 1 {
                        Err(format!("task {i} failed"))
                    } else {
                        Ok(i)
                    }
                })
                .await
        }));
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    assert_eq!(outcomes[0].as_ref().unwrap(), &0);
    assert_eq!(
        outcomes[1].as_ref().unwrap_err(),
        &DispatchError::Task("task 1 failed".to_string())
    );
    assert_eq!(outcomes[2].as_ref().unwrap(), &2);
    assert_eq!(outcomes[3].as_ref().unwrap(), &3);
}

#[tokio::test]
async fn overload_rejection_is_synchronous_and_leaves_queue_unchanged() {
    let queue: DispatchQueue<usize, String> = DispatchQueue::new(&config(2, 1, 60_000));

    // One running (leaves the queue), two queued to fill capacity.
    let mut handles = Vec::new();
    for i in 0..3 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            queue
                .submit(async move {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(i)
                })
                .await
        }));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(queue.queued(), 2);

    let before = Instant::now();
    let result = queue.submit(async { Ok(99) }).await;
    assert!(matches!(result, Err(DispatchError::Overloaded)));
    assert!(
        before.elapsed() < Duration::from_millis(50),
        "rejection should not wait for the queue"
    );
    assert_eq!(queue.queued(), 2, "rejected task must not be enqueued");

    for handle in handles {
        handle.abort();
    }
}

async fn panicking_task() -> Result<usize, String> {
    panic!("task body panicked")
}

#[tokio::test]
async fn panicking_task_releases_its_slot() {
    let queue: DispatchQueue<usize, String> = DispatchQueue::new(&config(5, 1, 10));

    let q = queue.clone();
    let first = tokio::spawn(async move { q.submit(panicking_task()).await });

    // With the slot leaked this would never be started and time out.
    let second = tokio::time::timeout(Duration::from_millis(500), queue.submit(async { Ok(7) }))
        .await
        .expect("queue must keep dispatching after a panicking task");
    assert_eq!(second.unwrap(), 7);

    assert!(matches!(
        first.await.unwrap(),
        Err(DispatchError::Cancelled)
    ));
    assert_eq!(queue.in_flight(), 0);
}

/// End-to-end pacing scenario: capacity 5, concurrency 1, interval 100ms,
/// three instant tasks. All resolve, in order, with starts at least an
/// interval apart and never more than one in flight.
#[tokio::test]
async fn serial_queue_paces_starts_by_interval() {
    let queue: DispatchQueue<usize, String> = DispatchQueue::new(&config(5, 1, 100));
    let starts: Arc<Mutex<Vec<(usize, Instant)>>> = Arc::new(Mutex::new(Vec::new()));
    let peak = Arc::new(AtomicUsize::new(0));
    let current = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for i in 0..3 {
        let queue = queue.clone();
        let starts = Arc::clone(&starts);
        let current = Arc::clone(&current);
        let peak = Arc::clone(&peak);
        handles.push(tokio::spawn(async move {
            queue
                .submit(async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    starts.lock().unwrap().push((i, Instant::now()));
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok(i)
                })
                .await
        }));
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap().unwrap(), i);
    }

    let starts = starts.lock().unwrap();
    assert_eq!(starts.len(), 3);
    assert_eq!(
        starts.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![0, 1, 2],
        "started out of submission order"
    );
    for pair in starts.windows(2) {
        let gap = pair[1].1.duration_since(pair[0].1);
        assert!(
            gap >= Duration::from_millis(95),
            "consecutive starts only {gap:?} apart"
        );
    }
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}
