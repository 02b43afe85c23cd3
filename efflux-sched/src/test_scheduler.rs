// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Virtual-time scheduler for deterministic tests.
//!
//! Work is queued against a virtual clock that only moves when the test
//! calls [`advance_by`](TestScheduler::advance_by),
//! [`advance_to`](TestScheduler::advance_to) or
//! [`trigger_actions`](TestScheduler::trigger_actions). Due work runs on
//! the calling thread, ordered by due time and FIFO among equal due times.
//!
//! # Examples
//!
//! ```
//! use efflux_sched::TestScheduler;
//! use efflux_sched::Scheduler;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let scheduler = TestScheduler::new();
//! let fired = Arc::new(AtomicUsize::new(0));
//! let counter = fired.clone();
//! scheduler.schedule_delayed(
//!     Box::new(move || {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!     }),
//!     Duration::from_secs(2),
//! );
//!
//! scheduler.advance_by(Duration::from_secs(1));
//! assert_eq!(fired.load(Ordering::SeqCst), 0);
//! scheduler.advance_by(Duration::from_secs(1));
//! assert_eq!(fired.load(Ordering::SeqCst), 1);
//! ```

use crate::scheduler::{Job, Scheduler};
use efflux_core::{BooleanSubscription, Subscription, SubscriptionRef};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

struct Scheduled {
    due: Duration,
    seq: u64,
    job: Job,
    cancel: Arc<BooleanSubscription>,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for earliest-due-first, FIFO among equal due times.
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

#[derive(Default)]
struct TestState {
    time: Duration,
    next_seq: u64,
    queue: BinaryHeap<Scheduled>,
}

/// Scheduler with a manually advanced virtual clock.
///
/// Cloning is cheap; all clones share the same clock and queue, so a test
/// can hand one clone to an operator and keep another to drive time.
#[derive(Clone, Default)]
pub struct TestScheduler {
    state: Arc<Mutex<TestState>>,
}

impl TestScheduler {
    /// A scheduler whose clock starts at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current virtual time.
    #[must_use]
    pub fn time(&self) -> Duration {
        self.state.lock().time
    }

    /// Move the clock forward, running everything that comes due.
    pub fn advance_by(&self, delta: Duration) {
        let target = self.state.lock().time + delta;
        self.advance_to(target);
    }

    /// Move the clock to an absolute virtual time, running everything
    /// that comes due on the way. Moving backwards only runs work already
    /// due.
    pub fn advance_to(&self, target: Duration) {
        loop {
            let next = {
                let mut state = self.state.lock();
                let due_next = state.queue.peek().map(|entry| entry.due);
                match due_next {
                    Some(due) if due <= target => {
                        // The clock sits at the job's due time while it runs.
                        state.time = state.time.max(due);
                        state.queue.pop()
                    }
                    _ => {
                        state.time = state.time.max(target);
                        break;
                    }
                }
            };
            if let Some(entry) = next {
                if !entry.cancel.is_unsubscribed() {
                    (entry.job)();
                }
            }
        }
    }

    /// Run all work due at the current virtual time without advancing it.
    pub fn trigger_actions(&self) {
        let time = self.time();
        self.advance_to(time);
    }

    fn enqueue(&self, due: Duration, job: Job) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        state.queue.push(Scheduled {
            due,
            seq,
            job,
            cancel: cancel.clone(),
        });
        cancel
    }
}

impl Scheduler for TestScheduler {
    fn schedule(&self, work: Job) -> SubscriptionRef {
        let due = self.state.lock().time;
        self.enqueue(due, work)
    }

    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef {
        let due = self.state.lock().time + delay;
        self.enqueue(due, work)
    }

    fn now(&self) -> Duration {
        self.state.lock().time
    }
}
