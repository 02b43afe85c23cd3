// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::schedulers::{SchedulerRef, TestScheduler};
use efflux::{EffluxError, Observable, Observer, PublishSubject, Subject};
use efflux_test_utils::RecordingObserver;
use std::sync::Arc;
use std::time::Duration;

fn virtual_pair() -> (TestScheduler, SchedulerRef) {
    let scheduler = TestScheduler::new();
    let handle: SchedulerRef = Arc::new(scheduler.clone());
    (scheduler, handle)
}

#[test]
fn test_count_buffers_fill_and_flush() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4, 5])
        .buffer(2)
        .subscribe(recording.observer_ref());

    // Assert: full chunks plus the non-empty partial at completion.
    assert_eq!(recording.values(), vec![vec![1, 2], vec![3, 4], vec![5]]);
    assert!(recording.is_completed());
}

#[test]
fn test_exact_fit_leaves_no_partial() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4])
        .buffer(2)
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![vec![1, 2], vec![3, 4]]);
}

#[test]
fn test_zero_count_is_an_argument_error() {
    // Arrange
    let recording = RecordingObserver::<Vec<i32>>::new();

    // Act
    Observable::from_iter(vec![1])
        .buffer(0)
        .subscribe(recording.observer_ref());

    // Assert
    let err = recording.error().expect("zero count must be rejected");
    assert!(matches!(err, EffluxError::Argument { .. }));
}

#[test]
fn test_skip_smaller_than_count_overlaps() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4])
        .buffer_with_skip(2, 1)
        .subscribe(recording.observer_ref());

    // Assert: sliding windows of two, then the shrinking tail.
    assert_eq!(
        recording.values(),
        vec![vec![1, 2], vec![2, 3], vec![3, 4], vec![4]]
    );
}

#[test]
fn test_skip_larger_than_count_gaps() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4, 5, 6])
        .buffer_with_skip(1, 3)
        .subscribe(recording.observer_ref());

    // Assert: one value kept out of every three.
    assert_eq!(recording.values(), vec![vec![1], vec![4]]);
}

#[test]
fn test_interval_closes_emit_even_empty_buffers() -> anyhow::Result<()> {
    // Arrange
    let (scheduler, handle) = virtual_pair();
    let subject = PublishSubject::new();
    let recording = RecordingObserver::new();
    subject
        .observable()
        .buffer_with_time(Duration::from_secs(1), &handle)
        .subscribe(recording.observer_ref());

    // Act
    subject.on_next(1)?;
    subject.on_next(2)?;
    scheduler.advance_by(Duration::from_secs(1));
    scheduler.advance_by(Duration::from_secs(1));
    subject.on_next(3)?;
    subject.on_completed()?;

    // Assert: a filled close, an empty close, and the final partial.
    assert_eq!(
        recording.values(),
        vec![vec![1, 2], Vec::<i32>::new(), vec![3]]
    );
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_count_closes_beat_the_interval() -> anyhow::Result<()> {
    // Arrange
    let (scheduler, handle) = virtual_pair();
    let subject = PublishSubject::new();
    let recording = RecordingObserver::new();
    subject
        .observable()
        .buffer_with_time_or_count(Duration::from_secs(10), 2, &handle)
        .subscribe(recording.observer_ref());

    // Act
    subject.on_next(1)?;
    subject.on_next(2)?;
    subject.on_next(3)?;
    scheduler.advance_by(Duration::from_secs(10));

    // Assert: the pair closed by count, the tail by the interval.
    assert_eq!(recording.values(), vec![vec![1, 2], vec![3]]);
    Ok(())
}

#[test]
fn test_shifted_windows_overlap() -> anyhow::Result<()> {
    // Arrange: windows of two seconds, opening every second.
    let (scheduler, handle) = virtual_pair();
    let subject = PublishSubject::new();
    let recording = RecordingObserver::new();
    subject
        .observable()
        .buffer_with_time_shifted(Duration::from_secs(2), Duration::from_secs(1), &handle)
        .subscribe(recording.observer_ref());

    // Act
    subject.on_next('a')?;
    scheduler.advance_by(Duration::from_secs(1));
    subject.on_next('b')?;
    scheduler.advance_by(Duration::from_secs(1));
    subject.on_next('c')?;
    scheduler.advance_by(Duration::from_secs(1));
    subject.on_completed()?;

    // Assert: each window holds what arrived during its two seconds; the
    // window still open at completion is flushed.
    assert_eq!(
        recording.values(),
        vec![vec!['a', 'b'], vec!['b', 'c'], vec!['c']]
    );
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_boundary_observables_open_and_close_chunks() -> anyhow::Result<()> {
    // Arrange
    let source = PublishSubject::new();
    let openings = PublishSubject::<i32>::new();
    let close_first = PublishSubject::<()>::new();
    let close_second = PublishSubject::<()>::new();
    let recording = RecordingObserver::new();

    let closer_a = close_first.clone();
    let closer_b = close_second.clone();
    source
        .observable()
        .buffer_with_boundaries(&openings.observable(), move |opening| {
            Ok(if *opening == 1 {
                closer_a.observable()
            } else {
                closer_b.observable()
            })
        })
        .subscribe(recording.observer_ref());

    // Act
    openings.on_next(1)?;
    source.on_next("x")?;
    openings.on_next(2)?;
    source.on_next("y")?;
    close_first.on_next(())?;
    source.on_next("z")?;
    source.on_completed()?;

    // Assert: the first chunk closed by its boundary, the second flushed
    // at completion.
    assert_eq!(recording.values(), vec![vec!["x", "y"], vec!["y", "z"]]);
    assert!(recording.is_completed());
    Ok(())
}
