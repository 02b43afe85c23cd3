// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fixed-size worker pool.
//!
//! Workers pull from a shared injector queue; delayed work is ordered by a
//! dedicated timer thread and released into the queue when due, so a
//! pending delay never occupies a worker.

use crate::logging::error;
use crate::scheduler::{wall_clock_now, Job, Scheduler};
use efflux_core::{BooleanSubscription, Subscription, SubscriptionRef};
use parking_lot::{Condvar, Mutex};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

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

#[derive(Default)]
struct PoolState {
    queue: VecDeque<Task>,
    shutdown: bool,
}

struct PoolInner {
    state: Mutex<PoolState>,
    work_ready: Condvar,
}

impl PoolInner {
    fn push(&self, task: Task) {
        {
            let mut state = self.state.lock();
            if state.shutdown {
                return;
            }
            state.queue.push_back(task);
        }
        self.work_ready.notify_one();
    }

    fn worker_loop(&self) {
        loop {
            let task = {
                let mut state = self.state.lock();
                loop {
                    if state.shutdown {
                        return;
                    }
                    if let Some(task) = state.queue.pop_front() {
                        break task;
                    }
                    self.work_ready.wait(&mut state);
                }
            };
            task.run_unless_cancelled();
        }
    }
}

struct TimedTask {
    due: Instant,
    seq: u64,
    task: Task,
}

impl PartialEq for TimedTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for TimedTask {}

impl PartialOrd for TimedTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimedTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for earliest-due-first ordering in the max-heap.
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

#[derive(Default)]
struct TimerState {
    heap: BinaryHeap<TimedTask>,
    next_seq: u64,
    shutdown: bool,
}

struct TimerInner {
    state: Mutex<TimerState>,
    changed: Condvar,
}

impl TimerInner {
    fn submit(&self, due: Instant, task: Task) {
        {
            let mut state = self.state.lock();
            if state.shutdown {
                return;
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.heap.push(TimedTask { due, seq, task });
        }
        self.changed.notify_one();
    }

    fn timer_loop(&self, pool: &PoolInner) {
        loop {
            let released = {
                let mut state = self.state.lock();
                if state.shutdown {
                    return;
                }
                match state.heap.peek().map(|t| t.due) {
                    None => {
                        self.changed.wait(&mut state);
                        None
                    }
                    Some(due) => {
                        let now = Instant::now();
                        if due <= now {
                            state.heap.pop().map(|t| t.task)
                        } else {
                            self.changed.wait_for(&mut state, due - now);
                            None
                        }
                    }
                }
            };
            if let Some(task) = released {
                pool.push(task);
            }
        }
    }
}

/// Fixed pool of worker threads, sized by CPU count by default.
///
/// Backs the process-wide `computation()` scheduler. Dropping the pool
/// signals all workers and the timer to exit; queued work that has not
/// started is discarded.
pub struct ThreadPoolScheduler {
    pool: Arc<PoolInner>,
    timer: Arc<TimerInner>,
}

impl ThreadPoolScheduler {
    /// Pool with one worker per available core.
    #[must_use]
    pub fn new() -> Self {
        let threads = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self::with_threads(threads)
    }

    /// Pool with an explicit worker count (at least one).
    #[must_use]
    pub fn with_threads(threads: usize) -> Self {
        let pool = Arc::new(PoolInner {
            state: Mutex::new(PoolState::default()),
            work_ready: Condvar::new(),
        });
        let timer = Arc::new(TimerInner {
            state: Mutex::new(TimerState::default()),
            changed: Condvar::new(),
        });

        for index in 0..threads.max(1) {
            let pool = pool.clone();
            let spawned = std::thread::Builder::new()
                .name(format!("efflux-computation-{index}"))
                .spawn(move || pool.worker_loop());
            if let Err(e) = spawned {
                error!("failed to spawn pool worker: {e}");
            }
        }

        {
            let pool = pool.clone();
            let timer = timer.clone();
            let spawned = std::thread::Builder::new()
                .name("efflux-computation-timer".to_string())
                .spawn(move || timer.timer_loop(&pool));
            if let Err(e) = spawned {
                error!("failed to spawn pool timer: {e}");
            }
        }

        Self { pool, timer }
    }
}

impl Default for ThreadPoolScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ThreadPoolScheduler {
    fn schedule(&self, work: Job) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        self.pool.push(Task {
            cancel: cancel.clone(),
            job: work,
        });
        cancel
    }

    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef {
        if delay.is_zero() {
            return self.schedule(work);
        }
        let cancel = Arc::new(BooleanSubscription::new());
        self.timer.submit(
            Instant::now() + delay,
            Task {
                cancel: cancel.clone(),
                job: work,
            },
        );
        cancel
    }

    fn now(&self) -> Duration {
        wall_clock_now()
    }
}

impl Drop for ThreadPoolScheduler {
    fn drop(&mut self) {
        {
            let mut state = self.pool.state.lock();
            state.shutdown = true;
            state.queue.clear();
        }
        self.pool.work_ready.notify_all();
        {
            let mut state = self.timer.state.lock();
            state.shutdown = true;
            state.heap.clear();
        }
        self.timer.changed.notify_all();
    }
}
