// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The scheduler abstraction.
//!
//! A [`Scheduler`] decides where and when a unit of work runs: inline on
//! the caller, trampolined on the current thread, on a fresh thread, on a
//! pooled worker, or at a virtual instant under test control. Time- and
//! concurrency-aware operators take a [`SchedulerRef`] and never spawn
//! threads themselves.
//!
//! Cancelling the subscription returned by a schedule call prevents the
//! work from running if it has not started; work that is already running
//! is never interrupted.

use efflux_core::{SerialSubscription, Subscription, SubscriptionRef};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A unit of work handed to a scheduler.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where and when work runs.
pub trait Scheduler: Send + Sync {
    /// Run work as soon as this scheduler allows.
    fn schedule(&self, work: Job) -> SubscriptionRef;

    /// Run work after the given delay.
    fn schedule_delayed(&self, work: Job, delay: Duration) -> SubscriptionRef;

    /// The scheduler's clock, as a duration since its epoch.
    ///
    /// Real schedulers report wall-clock time since the Unix epoch; the
    /// test scheduler reports its virtual clock.
    fn now(&self) -> Duration;
}

/// Shared handle to a type-erased scheduler.
pub type SchedulerRef = Arc<dyn Scheduler>;

pub(crate) fn wall_clock_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Run work repeatedly: once after `initial`, then every `period`.
///
/// Rescheduling is fixed-delay (the next tick is scheduled when the
/// previous one finishes), so a slow tick shifts subsequent ticks rather
/// than piling them up. Disposing the returned subscription stops the
/// cycle.
///
/// Requires a deferring scheduler; the immediate scheduler runs scheduled
/// work inline and would never return from the first tick.
pub fn schedule_periodic<F>(
    scheduler: &SchedulerRef,
    initial: Duration,
    period: Duration,
    work: F,
) -> SubscriptionRef
where
    F: Fn() + Send + Sync + 'static,
{
    let serial = SerialSubscription::new();
    // Serializes each schedule/set pair so an early-firing tick cannot
    // have its successor disposed by a late `set` of the previous unit.
    let reschedule_lock = Arc::new(Mutex::new(()));
    schedule_tick(
        scheduler.clone(),
        serial.clone(),
        reschedule_lock,
        Arc::new(work),
        initial,
        period,
    );
    serial.handle()
}

fn schedule_tick(
    scheduler: SchedulerRef,
    serial: SerialSubscription,
    reschedule_lock: Arc<Mutex<()>>,
    work: Arc<dyn Fn() + Send + Sync>,
    delay: Duration,
    period: Duration,
) {
    if serial.is_unsubscribed() {
        return;
    }

    let tick = {
        let scheduler = scheduler.clone();
        let serial = serial.clone();
        let reschedule_lock = reschedule_lock.clone();
        let work = work.clone();
        Box::new(move || {
            if serial.is_unsubscribed() {
                return;
            }
            (*work)();
            schedule_tick(scheduler, serial, reschedule_lock, work, period, period);
        })
    };

    let guard = reschedule_lock.lock();
    let unit = scheduler.schedule_delayed(tick, delay);
    serial.set(unit);
    drop(guard);
}
