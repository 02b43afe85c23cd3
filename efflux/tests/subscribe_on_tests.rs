// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::schedulers::{self, SchedulerRef, TestScheduler};
use efflux::{empty_subscription, Observable, Observer, Subscriber, Subscription};
use efflux_test_utils::RecordingObserver;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_subscription_is_deferred_to_the_scheduler() {
    // Arrange
    let scheduler = TestScheduler::new();
    let handle: SchedulerRef = Arc::new(scheduler.clone());
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2])
        .subscribe_on(&handle)
        .subscribe(recording.observer_ref());

    // Assert: the producer has not run yet.
    assert_eq!(recording.value_count(), 0);
    scheduler.trigger_actions();
    assert_eq!(recording.values(), vec![1, 2]);
    assert!(recording.is_completed());
}

#[test]
fn test_producer_runs_on_the_scheduler_thread() {
    // Arrange
    let producer_thread = Arc::new(Mutex::new(None));
    let seen_on = producer_thread.clone();
    let source = Observable::create(move |subscriber: &Subscriber<i32>| {
        *seen_on.lock() = Some(std::thread::current().id());
        subscriber.on_next(1)?;
        subscriber.on_completed()?;
        Ok(empty_subscription())
    });
    let recording = RecordingObserver::new();

    // Act
    source
        .subscribe_on(&schedulers::new_thread())
        .subscribe(recording.observer_ref());

    // Assert
    assert!(recording.wait_for_terminal(Duration::from_secs(5)));
    let producer = producer_thread.lock().expect("producer thread recorded");
    assert_ne!(producer, std::thread::current().id());
}

#[test]
fn test_unsubscribing_before_the_scheduler_runs_prevents_subscription() {
    // Arrange
    let scheduler = TestScheduler::new();
    let handle: SchedulerRef = Arc::new(scheduler.clone());
    let recording = RecordingObserver::new();

    // Act
    let subscription = Observable::from_iter(vec![1, 2])
        .subscribe_on(&handle)
        .subscribe(recording.observer_ref());
    subscription.unsubscribe();
    scheduler.trigger_actions();

    // Assert
    assert_eq!(recording.value_count(), 0);
    assert!(!recording.is_terminated());
}
