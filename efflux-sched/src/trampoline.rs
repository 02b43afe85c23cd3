// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Current-thread scheduler with a trampoline.
//!
//! Work scheduled while no work is running starts draining immediately;
//! work scheduled from inside a running action is queued and runs after
//! the current action returns. This turns recursive scheduling into a
//! loop instead of reentrant calls.

use crate::scheduler::{wall_clock_now, Job, Scheduler};
use efflux_core::{BooleanSubscription, Subscription, SubscriptionRef};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct QueuedJob {
    due: Instant,
    seq: u64,
    job: Job,
    cancel: Arc<BooleanSubscription>,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want earliest due first,
        // FIFO among equal due times.
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

#[derive(Default)]
struct TrampolineQueue {
    draining: bool,
    next_seq: u64,
    heap: BinaryHeap<QueuedJob>,
}

thread_local! {
    static QUEUE: RefCell<TrampolineQueue> = RefCell::new(TrampolineQueue::default());
}

/// Schedules work on the thread that calls `schedule`, trampolined.
///
/// Each thread has its own queue; delays are honored by sleeping the
/// draining thread once the queue reaches the delayed entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrampolineScheduler;

impl TrampolineScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn enqueue(due: Instant, job: Job, cancel: Arc<BooleanSubscription>) {
        let should_drain = QUEUE.with(|q| {
            let mut queue = q.borrow_mut();
            let seq = queue.next_seq;
            queue.next_seq += 1;
            queue.heap.push(QueuedJob {
                due,
                seq,
                job,
                cancel,
            });
            if queue.draining {
                false
            } else {
                queue.draining = true;
                true
            }
        });

        if should_drain {
            Self::drain();
        }
    }

    fn drain() {
        loop {
            let next = QUEUE.with(|q| {
                let mut queue = q.borrow_mut();
                match queue.heap.pop() {
                    Some(entry) => Some(entry),
                    None => {
                        queue.draining = false;
                        None
                    }
                }
            });

            let Some(entry) = next else { break };

            let now = Instant::now();
            if entry.due > now {
                std::thread::sleep(entry.due - now);
            }
            if !entry.cancel.is_unsubscribed() {
                (entry.job)();
            }
        }
    }
}

impl Scheduler for TrampolineScheduler {
    fn schedule(&self, work: Job) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        Self::enqueue(Instant::now(), work, cancel.clone());
        cancel
    }

    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        Self::enqueue(Instant::now() + delay, work, cancel.clone());
        cancel
    }

    fn now(&self) -> Duration {
        wall_clock_now()
    }
}
