// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cached, unbounded worker pool.
//!
//! Work is handed to an idle worker when one exists; otherwise a fresh
//! thread is spawned. Workers that stay idle for the keep-alive period
//! exit. Because the pool is unbounded, delayed work simply sleeps on its
//! worker instead of going through a timer.

use crate::logging::error;
use crate::scheduler::{wall_clock_now, Job, Scheduler};
use efflux_core::{BooleanSubscription, Subscription, SubscriptionRef};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

struct Task {
    cancel: Arc<BooleanSubscription>,
    job: Job,
}

impl Task {
    fn run_unless_cancelled(self) {
        if !self.cancel.is_unsubscribed() {
            (self.job)();
        }
    }
}

struct IdleWorker {
    id: u64,
    sender: Sender<Task>,
}

struct IoInner {
    // Hand-off and idle-list membership are updated under one lock, so a
    // worker that finds its entry gone knows its task is already in its
    // channel.
    idle: Mutex<Vec<IdleWorker>>,
    keep_alive: Duration,
    next_id: AtomicU64,
}

impl IoInner {
    fn dispatch(self: &Arc<Self>, task: Task) {
        let mut task = task;
        {
            let mut idle = self.idle.lock();
            while let Some(worker) = idle.pop() {
                match worker.sender.send(task) {
                    Ok(()) => return,
                    // Worker expired between registering and the send.
                    Err(returned) => task = returned.0,
                }
            }
        }
        self.spawn_worker(task);
    }

    fn spawn_worker(self: &Arc<Self>, first_task: Task) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = self.clone();
        let (sender, receiver) = channel::<Task>();
        let spawned = std::thread::Builder::new()
            .name(format!("efflux-io-{id}"))
            .spawn(move || inner.worker_loop(id, sender, &receiver, first_task));
        if let Err(e) = spawned {
            error!("failed to spawn io worker: {e}");
        }
    }

    fn worker_loop(&self, id: u64, sender: Sender<Task>, receiver: &Receiver<Task>, first: Task) {
        let mut task = Some(first);
        loop {
            if let Some(task) = task.take() {
                task.run_unless_cancelled();
            }

            self.idle.lock().push(IdleWorker {
                id,
                sender: sender.clone(),
            });

            match receiver.recv_timeout(self.keep_alive) {
                Ok(next) => task = Some(next),
                Err(RecvTimeoutError::Disconnected) => return,
                Err(RecvTimeoutError::Timeout) => {
                    let still_idle = {
                        let mut idle = self.idle.lock();
                        let before = idle.len();
                        idle.retain(|w| w.id != id);
                        before != idle.len()
                    };
                    if still_idle {
                        // Nobody claimed this worker; let the thread die.
                        return;
                    }
                    // A dispatcher popped the entry under the lock, so the
                    // task is already in the channel.
                    match receiver.try_recv() {
                        Ok(next) => task = Some(next),
                        Err(_) => return,
                    }
                }
            }
        }
    }
}

/// Unbounded cached pool for io-bound work.
///
/// Backs the process-wide `io()` scheduler. Idle workers linger for the
/// keep-alive period and then exit on their own.
pub struct IoScheduler {
    inner: Arc<IoInner>,
}

impl IoScheduler {
    /// Pool with the default sixty-second keep-alive.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keep_alive(DEFAULT_KEEP_ALIVE)
    }

    /// Pool with an explicit idle-worker keep-alive.
    #[must_use]
    pub fn with_keep_alive(keep_alive: Duration) -> Self {
        Self {
            inner: Arc::new(IoInner {
                idle: Mutex::new(Vec::new()),
                keep_alive,
                next_id: AtomicU64::new(0),
            }),
        }
    }
}

impl Default for IoScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for IoScheduler {
    fn schedule(&self, work: Job) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        self.inner.dispatch(Task {
            cancel: cancel.clone(),
            job: work,
        });
        cancel
    }

    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        let flag = cancel.clone();
        let job: Job = Box::new(move || {
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
            if !flag.is_unsubscribed() {
                work();
            }
        });
        self.inner.dispatch(Task {
            cancel: Arc::new(BooleanSubscription::new()),
            job,
        });
        cancel
    }

    fn now(&self) -> Duration {
        wall_clock_now()
    }
}
