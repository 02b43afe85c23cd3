// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::logging::error;
use crate::scheduler::{wall_clock_now, Job, Scheduler};
use efflux_core::{unsubscribed, BooleanSubscription, Subscription, SubscriptionRef};
use std::sync::Arc;
use std::time::Duration;

/// Spawns one dedicated OS thread per unit of work.
///
/// Delayed work sleeps on its own thread, so a pending delay never blocks
/// anyone else. Cancellation is checked after the delay, right before the
/// work runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NewThreadScheduler;

impl NewThreadScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn spawn(work: Job, delay: Duration) -> SubscriptionRef {
        let cancel = Arc::new(BooleanSubscription::new());
        let flag = cancel.clone();
        let spawned = std::thread::Builder::new()
            .name("efflux-new-thread".to_string())
            .spawn(move || {
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                if !flag.is_unsubscribed() {
                    work();
                }
            });

        match spawned {
            Ok(_) => cancel,
            Err(e) => {
                error!("failed to spawn scheduler thread: {e}");
                unsubscribed()
            }
        }
    }
}

impl Scheduler for NewThreadScheduler {
    fn schedule(&self, work: Job) -> SubscriptionRef {
        Self::spawn(work, Duration::ZERO)
    }

    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef {
        Self::spawn(work, delay)
    }

    fn now(&self) -> Duration {
        wall_clock_now()
    }
}
