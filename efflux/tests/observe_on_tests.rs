// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::schedulers::{self, SchedulerRef, TestScheduler};
use efflux::{Observable, Observer, PublishSubject, Subject, Subscription};
use efflux_test_utils::RecordingObserver;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn virtual_pair() -> (TestScheduler, SchedulerRef) {
    let scheduler = TestScheduler::new();
    let handle: SchedulerRef = Arc::new(scheduler.clone());
    (scheduler, handle)
}

#[test]
fn test_emissions_wait_for_the_scheduler() {
    // Arrange
    let (scheduler, handle) = virtual_pair();
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .observe_on(&handle)
        .subscribe(recording.observer_ref());

    // Assert: nothing moves until the virtual worker runs.
    assert_eq!(recording.value_count(), 0);
    scheduler.trigger_actions();
    assert_eq!(recording.values(), vec![1, 2, 3]);
    assert!(recording.is_completed());
}

#[test]
fn test_order_is_preserved_across_the_handoff() -> anyhow::Result<()> {
    // Arrange
    let (scheduler, handle) = virtual_pair();
    let subject = PublishSubject::new();
    let recording = RecordingObserver::new();
    subject
        .observable()
        .observe_on(&handle)
        .subscribe(recording.observer_ref());

    // Act: interleave pushes and drains.
    subject.on_next(1)?;
    subject.on_next(2)?;
    scheduler.trigger_actions();
    subject.on_next(3)?;
    subject.on_completed()?;
    scheduler.trigger_actions();

    // Assert
    assert_eq!(recording.values(), vec![1, 2, 3]);
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_unsubscribe_discards_the_queue() -> anyhow::Result<()> {
    // Arrange
    let (scheduler, handle) = virtual_pair();
    let subject = PublishSubject::new();
    let recording = RecordingObserver::new();
    let subscription = subject
        .observable()
        .observe_on(&handle)
        .subscribe(recording.observer_ref());

    // Act: values are queued, then the consumer walks away.
    subject.on_next(1)?;
    subject.on_next(2)?;
    subscription.unsubscribe();
    scheduler.trigger_actions();

    // Assert
    assert_eq!(recording.value_count(), 0);
    Ok(())
}

#[test]
fn test_downstream_runs_on_the_scheduler_thread() {
    // Arrange
    let recording = RecordingObserver::new();
    let worker_thread = Arc::new(Mutex::new(None));
    let seen_on = worker_thread.clone();

    // Act
    Observable::from_iter(vec![1, 2])
        .observe_on(&schedulers::new_thread())
        .map(move |value| {
            *seen_on.lock() = Some(std::thread::current().id());
            Ok(value)
        })
        .subscribe(recording.observer_ref());

    // Assert
    assert!(recording.wait_for_terminal(Duration::from_secs(5)));
    assert_eq!(recording.values(), vec![1, 2]);
    let worker = worker_thread.lock().expect("worker thread recorded");
    assert_ne!(worker, std::thread::current().id());
}
