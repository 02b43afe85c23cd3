// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::scheduler::{wall_clock_now, Job, Scheduler};
use efflux_core::{unsubscribed, SubscriptionRef};
use std::time::Duration;

/// Runs work synchronously on the calling thread.
///
/// Delayed work sleeps the calling thread first. By the time a schedule
/// call returns, the work has already run, so the returned subscription is
/// always in the unsubscribed state and cancellation is not possible.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl ImmediateScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, work: Job) -> SubscriptionRef {
        work();
        unsubscribed()
    }

    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        work();
        unsubscribed()
    }

    fn now(&self) -> Duration {
        wall_clock_now()
    }
}
