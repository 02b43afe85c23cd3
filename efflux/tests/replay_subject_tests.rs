// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::schedulers::{SchedulerRef, TestScheduler};
use efflux::{EffluxError, Observer, ReplaySubject, Subject};
use efflux_test_utils::RecordingObserver;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_late_subscriber_replays_the_full_history() -> anyhow::Result<()> {
    // Arrange
    let subject = ReplaySubject::unbounded();
    subject.on_next(1)?;
    subject.on_next(2)?;

    // Act
    let recording = RecordingObserver::new();
    subject.observable().subscribe(recording.observer_ref());
    subject.on_next(3)?;

    // Assert: replay then live, in order, with no gap.
    assert_eq!(recording.values(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_capacity_bound_drops_the_oldest() -> anyhow::Result<()> {
    // Arrange
    let subject = ReplaySubject::with_capacity(2);
    for value in 1..=5 {
        subject.on_next(value)?;
    }

    // Act
    let recording = RecordingObserver::new();
    subject.observable().subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![4, 5]);
    assert_eq!(subject.buffered_len(), 2);
    Ok(())
}

#[test]
fn test_window_bound_drops_expired_entries() -> anyhow::Result<()> {
    // Arrange
    let scheduler = TestScheduler::new();
    let handle: SchedulerRef = Arc::new(scheduler.clone());
    let subject = ReplaySubject::with_window(Duration::from_secs(2), handle);
    subject.on_next(1)?;
    scheduler.advance_by(Duration::from_secs(3));
    subject.on_next(2)?;

    // Act
    let recording = RecordingObserver::new();
    subject.observable().subscribe(recording.observer_ref());

    // Assert: the first value fell out of the window.
    assert_eq!(recording.values(), vec![2]);
    Ok(())
}

#[test]
fn test_terminal_event_is_replayed_after_the_buffer() -> anyhow::Result<()> {
    // Arrange
    let subject = ReplaySubject::unbounded();
    subject.on_next(1)?;
    subject.on_error(EffluxError::stream_error("stored"))?;

    // Act
    let recording = RecordingObserver::new();
    subject.observable().subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1]);
    let err = recording.error().expect("terminal error replays");
    assert!(err.to_string().contains("stored"));
    Ok(())
}

#[test]
fn test_values_after_terminal_are_ignored() -> anyhow::Result<()> {
    // Arrange
    let subject = ReplaySubject::unbounded();
    subject.on_next(1)?;
    subject.on_completed()?;

    // Act
    subject.on_next(2)?;
    let recording = RecordingObserver::new();
    subject.observable().subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1]);
    assert!(recording.is_completed());
    Ok(())
}
