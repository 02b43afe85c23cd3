// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable, Observer, PublishSubject, Subject};
use efflux_test_utils::RecordingObserver;

#[test]
fn test_no_emission_until_every_input_produced() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::combine_latest(left.observable(), right.observable(), |a: i32, b: i32| {
        Ok(a + b)
    })
    .subscribe(recording.observer_ref());

    // Act / Assert
    left.on_next(1)?;
    left.on_next(2)?;
    assert_eq!(recording.value_count(), 0);
    right.on_next(10)?;
    assert_eq!(recording.values(), vec![12]);
    Ok(())
}

#[test]
fn test_any_input_triggers_with_latest_of_the_other() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::combine_latest(left.observable(), right.observable(), |a: i32, b: i32| {
        Ok((a, b))
    })
    .subscribe(recording.observer_ref());

    // Act
    left.on_next(1)?;
    right.on_next(10)?;
    left.on_next(2)?;
    right.on_next(20)?;

    // Assert
    assert_eq!(recording.values(), vec![(1, 10), (2, 10), (2, 20)]);
    Ok(())
}

#[test]
fn test_completes_when_all_inputs_complete() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::combine_latest(left.observable(), right.observable(), |a: i32, b: i32| {
        Ok(a + b)
    })
    .subscribe(recording.observer_ref());

    // Act
    left.on_next(1)?;
    right.on_next(2)?;
    left.on_completed()?;
    assert!(!recording.is_terminated());
    right.on_completed()?;

    // Assert
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_any_input_error_terminates_immediately() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::<i32>::new();
    let right = PublishSubject::<i32>::new();
    let recording = RecordingObserver::<i32>::new();
    Observable::combine_latest(left.observable(), right.observable(), |a, b| Ok(a + b))
        .subscribe(recording.observer_ref());

    // Act
    left.on_error(EffluxError::stream_error("left died"))?;

    // Assert
    assert!(recording.error().is_some());
    Ok(())
}

#[test]
fn test_combine_latest3_needs_all_three() -> anyhow::Result<()> {
    // Arrange
    let a = PublishSubject::new();
    let b = PublishSubject::new();
    let c = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::combine_latest3(
        a.observable(),
        b.observable(),
        c.observable(),
        |x: i32, y: i32, z: i32| Ok(x + y + z),
    )
    .subscribe(recording.observer_ref());

    // Act
    a.on_next(1)?;
    b.on_next(10)?;
    assert_eq!(recording.value_count(), 0);
    c.on_next(100)?;

    // Assert
    assert_eq!(recording.values(), vec![111]);
    Ok(())
}
