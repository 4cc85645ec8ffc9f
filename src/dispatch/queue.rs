use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::models::config::QueueConfig;

/// Error returned by [`DispatchQueue::submit`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError<E> {
    /// The queue was at capacity; the task was never admitted. Callers should
    /// back off and resubmit later.
    #[error("dispatch queue is at capacity, try again later")]
    Overloaded,

    /// The task ran and failed; its own error, untouched.
    #[error("{0}")]
    Task(E),

    /// The task panicked or was dropped before settling. The caller is
    /// released instead of left waiting.
    #[error("task was cancelled before completing")]
    Cancelled,
}

/// One admitted unit of work awaiting dispatch.
struct QueuedTask<T, E> {
    work: BoxFuture<'static, Result<T, E>>,
    reply: oneshot::Sender<Result<T, E>>,
    admitted_at: Instant,
}

/// Mutable queue state. One critical section guards admission, dispatch, and
/// completion bookkeeping; the guard is never held across an await point.
struct QueueState<T, E> {
    pending: VecDeque<QueuedTask<T, E>>,
    in_flight: usize,
    driver_running: bool,
}

struct Inner<T, E> {
    state: Mutex<QueueState<T, E>>,
    capacity: usize,
    concurrency: usize,
    interval: Duration,
}

/// Bounded FIFO queue that releases opaque async tasks at a controlled rate.
///
/// Tasks are admitted up to `capacity` (synchronous rejection beyond that,
/// never queued-then-dropped) and started by a single logical driver that
/// ticks no more often than `interval`, starting queued tasks in admission
/// order while fewer than `concurrency` are in flight. Task bodies run
/// concurrently with each other; each settles its caller's future with its
/// own result and never affects siblings.
///
/// The driver exits when nothing is queued or running and restarts on the
/// next submission. `concurrency = 1` gives strict one-at-a-time dispatch.
///
/// Cloning is cheap and shares the same queue.
pub struct DispatchQueue<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for DispatchQueue<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> DispatchQueue<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a queue from configuration. Capacity and concurrency are
    /// clamped to at least 1.
    pub fn new(config: &QueueConfig) -> Self {
        let queue = Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    in_flight: 0,
                    driver_running: false,
                }),
                capacity: config.capacity.max(1),
                concurrency: config.concurrency.max(1),
                interval: Duration::from_millis(config.interval_ms),
            }),
        };

        info!(
            capacity = queue.inner.capacity,
            concurrency = queue.inner.concurrency,
            interval_ms = config.interval_ms,
            "dispatch queue initialized"
        );

        queue
    }

    /// Submit a unit of work and await its result.
    ///
    /// Fails immediately with [`DispatchError::Overloaded`] if the queue is at
    /// capacity. Otherwise the task is enqueued at the tail, an idle driver is
    /// restarted, and the call suspends until the task settles. The task's own
    /// error comes back as [`DispatchError::Task`].
    pub async fn submit<F>(&self, work: F) -> Result<T, DispatchError<E>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (reply, result) = oneshot::channel();

        {
            let mut state = self.lock_state();

            if state.pending.len() >= self.inner.capacity {
                debug!(
                    queued = state.pending.len(),
                    capacity = self.inner.capacity,
                    "queue at capacity, rejecting task"
                );
                return Err(DispatchError::Overloaded);
            }

            state.pending.push_back(QueuedTask {
                work: Box::pin(work),
                reply,
                admitted_at: Instant::now(),
            });
            debug!(queued = state.pending.len(), "task admitted");

            if !state.driver_running {
                state.driver_running = true;
                let queue = self.clone();
                tokio::spawn(async move { queue.drive().await });
            }
        }

        match result.await {
            Ok(outcome) => outcome.map_err(DispatchError::Task),
            Err(_) => Err(DispatchError::Cancelled),
        }
    }

    /// Number of tasks admitted but not yet started.
    pub fn queued(&self) -> usize {
        self.lock_state().pending.len()
    }

    /// Number of tasks currently executing.
    pub fn in_flight(&self) -> usize {
        self.lock_state().in_flight
    }

    /// Dispatch loop. One instance runs at a time per queue; each tick starts
    /// queued tasks up to the concurrency limit, then sleeps `interval`.
    async fn drive(self) {
        loop {
            {
                let mut state = self.lock_state();

                while state.in_flight < self.inner.concurrency {
                    let Some(task) = state.pending.pop_front() else {
                        break;
                    };
                    state.in_flight += 1;

                    debug!(
                        queued = state.pending.len(),
                        in_flight = state.in_flight,
                        waited_ms = task.admitted_at.elapsed().as_millis() as u64,
                        "starting task"
                    );

                    // The work runs in its own task so a panicking body
                    // surfaces as a join error here instead of killing the
                    // bookkeeping below and leaking the slot.
                    let work = tokio::spawn(task.work);
                    let queue = self.clone();
                    tokio::spawn(async move {
                        let outcome = work.await;

                        {
                            let mut state = queue.lock_state();
                            state.in_flight -= 1;
                            debug!(
                                queued = state.pending.len(),
                                in_flight = state.in_flight,
                                "task settled"
                            );
                        }

                        match outcome {
                            // The caller may have stopped waiting; that is
                            // its choice, the task still ran exactly once.
                            Ok(result) => {
                                let _ = task.reply.send(result);
                            }
                            // Dropping the reply settles the caller with
                            // Cancelled instead of hanging it.
                            Err(join_err) => {
                                warn!(error = %join_err, "task panicked");
                                drop(task.reply);
                            }
                        }
                    });
                }

                // Checked under the same lock `submit` pushes under, so a
                // concurrent submission either lands before this check or
                // observes `driver_running == false` and restarts the driver.
                if state.pending.is_empty() && state.in_flight == 0 {
                    state.driver_running = false;
                    debug!("dispatch queue drained, stopping driver");
                    return;
                }
            }

            sleep(self.inner.interval).await;
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState<T, E>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
