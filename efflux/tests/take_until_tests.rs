// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable, Observer, PublishSubject, Subject};
use efflux_test_utils::RecordingObserver;

#[test]
fn test_values_flow_until_the_gate_fires() -> anyhow::Result<()> {
    // Arrange
    let source = PublishSubject::new();
    let gate = PublishSubject::new();
    let recording = RecordingObserver::new();
    source
        .observable()
        .take_until(&gate.observable())
        .subscribe(recording.observer_ref());

    // Act
    source.on_next(1)?;
    source.on_next(2)?;
    gate.on_next(())?;
    source.on_next(3)?;

    // Assert
    assert_eq!(recording.values(), vec![1, 2]);
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_gate_error_propagates() -> anyhow::Result<()> {
    // Arrange
    let source = PublishSubject::<i32>::new();
    let gate = PublishSubject::<()>::new();
    let recording = RecordingObserver::new();
    source
        .observable()
        .take_until(&gate.observable())
        .subscribe(recording.observer_ref());

    // Act
    gate.on_error(EffluxError::stream_error("gate broke"))?;

    // Assert
    assert!(recording.error().is_some());
    Ok(())
}

#[test]
fn test_gate_completion_counts_as_its_first_event() -> anyhow::Result<()> {
    // Arrange
    let source = PublishSubject::<i32>::new();
    let gate = PublishSubject::<()>::new();
    let recording = RecordingObserver::new();
    source
        .observable()
        .take_until(&gate.observable())
        .subscribe(recording.observer_ref());

    // Act
    source.on_next(1)?;
    gate.on_completed()?;
    source.on_next(2)?;

    // Assert
    assert_eq!(recording.values(), vec![1]);
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_source_completion_disposes_the_gate_subscription() -> anyhow::Result<()> {
    // Arrange
    let gate = PublishSubject::<()>::new();
    let recording = RecordingObserver::new();
    Observable::from_iter(vec![1, 2])
        .take_until(&gate.observable())
        .subscribe(recording.observer_ref());

    // Act: the gate firing after the fact must do nothing.
    gate.on_next(())?;

    // Assert
    assert_eq!(recording.values(), vec![1, 2]);
    assert_eq!(recording.events().len(), 3);
    Ok(())
}
