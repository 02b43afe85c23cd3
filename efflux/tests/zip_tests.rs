// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable, Observer, PublishSubject, Subject};
use efflux_test_utils::{RecordingObserver, TestError};

#[test]
fn test_zip_pairs_positionally() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::zip(
        Observable::from_iter(vec![1, 2, 3]),
        Observable::from_iter(vec!["a", "b", "c"]),
        |n, s| Ok(format!("{n}{s}")),
    )
    .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec!["1a", "2b", "3c"]);
    assert!(recording.is_completed());
}

#[test]
fn test_zip_completes_when_the_shorter_input_ends() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::zip(
        Observable::from_iter(vec![1, 2]),
        Observable::from_iter(vec![10, 20, 30, 40]),
        |a, b| Ok(a + b),
    )
    .subscribe(recording.observer_ref());

    // Assert: the leftover 30 and 40 are discarded.
    assert_eq!(recording.values(), vec![11, 22]);
    assert!(recording.is_completed());
}

#[test]
fn test_zip_waits_for_both_sides() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::zip(left.observable(), right.observable(), |a: i32, b: i32| {
        Ok(a * b)
    })
    .subscribe(recording.observer_ref());

    // Act / Assert
    left.on_next(2)?;
    left.on_next(3)?;
    assert_eq!(recording.value_count(), 0);
    right.on_next(10)?;
    assert_eq!(recording.values(), vec![20]);
    right.on_next(10)?;
    assert_eq!(recording.values(), vec![20, 30]);
    Ok(())
}

#[test]
fn test_zip_input_completing_with_buffered_values_keeps_pairing() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::zip(left.observable(), right.observable(), |a: i32, b: i32| {
        Ok(a + b)
    })
    .subscribe(recording.observer_ref());

    // Act: the left side finishes with values still queued.
    left.on_next(1)?;
    left.on_next(2)?;
    left.on_completed()?;
    right.on_next(10)?;
    right.on_next(20)?;

    // Assert: queued leftovers paired, then completion.
    assert_eq!(recording.values(), vec![11, 22]);
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_zip3_combines_three_inputs() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::zip3(
        Observable::from_iter(vec![1, 2]),
        Observable::from_iter(vec![10, 20]),
        Observable::from_iter(vec![100, 200]),
        |a, b, c| Ok(a + b + c),
    )
    .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![111, 222]);
}

#[test]
fn test_zip_combiner_fault_terminates() {
    // Arrange
    let recording = RecordingObserver::<i32>::new();

    // Act
    Observable::zip(
        Observable::from_iter(vec![1, 2]),
        Observable::from_iter(vec![3, 4]),
        |_, _| Err(EffluxError::user_error(TestError::new("combiner"))),
    )
    .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.value_count(), 0);
    assert!(recording.error().is_some());
}

#[test]
fn test_sequence_equal_compares_elementwise() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::sequence_equal(
        Observable::from_iter(vec![1, 2, 3]),
        Observable::from_iter(vec![1, 2, 4]),
    )
    .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![true, true, false]);
    assert!(recording.is_completed());
}

#[test]
fn test_sequence_equal_is_symmetric() {
    // Arrange
    let forward = RecordingObserver::new();
    let backward = RecordingObserver::new();
    let left = Observable::from_iter(vec![7, 8]);
    let right = Observable::from_iter(vec![7, 9]);

    // Act
    Observable::sequence_equal(left.clone(), right.clone())
        .subscribe(forward.observer_ref());
    Observable::sequence_equal(right, left).subscribe(backward.observer_ref());

    // Assert
    assert_eq!(forward.values(), backward.values());
}
