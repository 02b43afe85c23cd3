// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{empty_subscription, Observable, Observer, Subscriber, Subscription};
use efflux_test_utils::RecordingObserver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_skip_drops_leading_values() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4])
        .skip(2)
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![3, 4]);
    assert!(recording.is_completed());
}

#[test]
fn test_take_completes_early_and_stops_the_producer() {
    // Arrange: producer counts how far it actually got.
    let emitted = Arc::new(AtomicUsize::new(0));
    let produced = emitted.clone();
    let source = Observable::create(move |subscriber: &Subscriber<usize>| {
        for value in 0..100 {
            if subscriber.is_unsubscribed() {
                break;
            }
            produced.fetch_add(1, Ordering::SeqCst);
            subscriber.on_next(value)?;
        }
        if !subscriber.is_unsubscribed() {
            subscriber.on_completed()?;
        }
        Ok(empty_subscription())
    });
    let recording = RecordingObserver::new();

    // Act
    source.take(2).subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![0, 1]);
    assert!(recording.is_completed());
    // The producer noticed the cancellation after at most one extra step.
    assert!(emitted.load(Ordering::SeqCst) <= 3);
}

#[test]
fn test_take_zero_completes_immediately() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .take(0)
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.value_count(), 0);
    assert!(recording.is_completed());
}

#[test]
fn test_take_while_completes_on_first_mismatch() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 2, 1])
        .take_while(|x| Ok(*x < 3))
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1, 2]);
    assert!(recording.is_completed());
}

#[test]
fn test_take_while_with_index_sees_positions() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![10, 20, 30, 40])
        .take_while_with_index(|_, index| Ok(index < 2))
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![10, 20]);
    assert!(recording.is_completed());
}

#[test]
fn test_take_last_needs_completion() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4, 5])
        .take_last(2)
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![4, 5]);
    assert!(recording.is_completed());
}

#[test]
fn test_take_last_on_short_sequence_emits_everything() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![9])
        .take_last(5)
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![9]);
    assert!(recording.is_completed());
}
