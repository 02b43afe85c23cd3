// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable, Observer, PublishSubject, Subject};
use efflux_test_utils::RecordingObserver;

#[test]
fn test_new_inner_supersedes_previous() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<Observable<i32>>::new();
    let first = PublishSubject::<i32>::new();
    let second = PublishSubject::<i32>::new();
    let recording = RecordingObserver::new();
    Observable::switch_on_next(outer.observable()).subscribe(recording.observer_ref());

    // Act
    outer.on_next(first.observable())?;
    first.on_next(1)?;
    outer.on_next(second.observable())?;
    first.on_next(99)?;
    second.on_next(2)?;

    // Assert: the superseded inner's late value is dropped.
    assert_eq!(recording.values(), vec![1, 2]);
    Ok(())
}

#[test]
fn test_completes_after_outer_and_latest_inner() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<Observable<i32>>::new();
    let inner = PublishSubject::<i32>::new();
    let recording = RecordingObserver::new();
    Observable::switch_on_next(outer.observable()).subscribe(recording.observer_ref());

    // Act
    outer.on_next(inner.observable())?;
    inner.on_next(5)?;
    outer.on_completed()?;
    assert!(!recording.is_terminated());
    inner.on_completed()?;

    // Assert
    assert_eq!(recording.values(), vec![5]);
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_inner_error_terminates_downstream() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<Observable<i32>>::new();
    let inner = PublishSubject::<i32>::new();
    let recording = RecordingObserver::new();
    Observable::switch_on_next(outer.observable()).subscribe(recording.observer_ref());

    // Act
    outer.on_next(inner.observable())?;
    inner.on_error(EffluxError::stream_error("inner broke"))?;

    // Assert
    assert!(recording.error().is_some());
    Ok(())
}

#[test]
fn test_inner_completion_alone_does_not_complete() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<Observable<i32>>::new();
    let recording = RecordingObserver::new();
    Observable::switch_on_next(outer.observable()).subscribe(recording.observer_ref());

    // Act
    outer.on_next(Observable::just(1))?;
    // The inner just(1) completed synchronously.

    // Assert
    assert_eq!(recording.values(), vec![1]);
    assert!(!recording.is_terminated());
    Ok(())
}
