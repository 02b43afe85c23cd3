// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable, Observer, PublishSubject, Subject};
use efflux_test_utils::RecordingObserver;
use std::time::Duration;

#[test]
fn test_merge_forwards_everything() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::merge(vec![
        Observable::from_iter(vec![1, 2]),
        Observable::from_iter(vec![3, 4]),
    ])
    .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1, 2, 3, 4]);
    assert!(recording.is_completed());
}

#[test]
fn test_merge_first_error_terminates() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::merge(vec![
        Observable::error(EffluxError::stream_error("boom")),
        Observable::from_iter(vec![1, 2]),
    ])
    .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.value_count(), 0);
    assert!(recording.error().is_some());
}

#[test]
fn test_merge_delay_error_finishes_other_sources_first() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::merge_delay_error(vec![
        Observable::error(EffluxError::stream_error("first failure")),
        Observable::from_iter(vec![1, 2]),
        Observable::error(EffluxError::stream_error("second failure")),
    ])
    .subscribe(recording.observer_ref());

    // Assert: all values delivered, then one aggregate error.
    assert_eq!(recording.values(), vec![1, 2]);
    let err = recording.error().expect("aggregate error expected");
    assert!(matches!(err, EffluxError::Composite { count: 2, .. }));
}

#[test]
fn test_flat_map_expands_each_value() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .flat_map(|x| Ok(Observable::from_iter(vec![x, x * 10])))
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1, 10, 2, 20, 3, 30]);
    assert!(recording.is_completed());
}

#[test]
fn test_merge_completes_only_after_every_source() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::merge(vec![left.observable(), right.observable()])
        .subscribe(recording.observer_ref());

    // Act
    left.on_next(1)?;
    left.on_completed()?;
    right.on_next(2)?;
    assert!(!recording.is_terminated());
    right.on_completed()?;

    // Assert
    assert_eq!(recording.values(), vec![1, 2]);
    assert!(recording.is_completed());
    Ok(())
}

#[test]
fn test_merge_serializes_concurrent_producers() -> anyhow::Result<()> {
    // Arrange
    let left = PublishSubject::new();
    let right = PublishSubject::new();
    let recording = RecordingObserver::new();
    Observable::merge(vec![left.observable(), right.observable()])
        .subscribe(recording.observer_ref());

    // Act: two threads push through the merge concurrently.
    let feeders: Vec<_> = [(left, 0), (right, 1000)]
        .into_iter()
        .map(|(subject, base)| {
            std::thread::spawn(move || {
                for i in 0..100 {
                    let _ = subject.on_next(base + i);
                }
                let _ = subject.on_completed();
            })
        })
        .collect();
    for feeder in feeders {
        feeder.join().expect("feeder must finish");
    }

    // Assert
    assert!(recording.wait_for_terminal(Duration::from_secs(5)));
    assert_eq!(recording.value_count(), 200);
    assert!(recording.is_completed());
    // Per-source order survives the interleaving.
    let values = recording.values();
    let lows: Vec<i32> = values.iter().copied().filter(|v| *v < 1000).collect();
    let highs: Vec<i32> = values.iter().copied().filter(|v| *v >= 1000).collect();
    assert_eq!(lows, (0..100).collect::<Vec<_>>());
    assert_eq!(highs, (1000..1100).collect::<Vec<_>>());
    Ok(())
}
