// Copyright 2025 Umberto Gotti
// SPDX-License-Identifier: Apache-2.0

use efflux::{EffluxError, Observable};
use efflux_test_utils::{RecordingObserver, TestError};

#[test]
fn test_map_selector_fault_terminates_with_error() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .map(|x| {
            if x == 2 {
                Err(EffluxError::user_error(TestError::new("selector blew up")))
            } else {
                Ok(x)
            }
        })
        .subscribe(recording.observer_ref());

    // Assert: values before the fault are preserved, then the error.
    assert_eq!(recording.values(), vec![1]);
    assert!(recording.error().is_some());
    assert!(!recording.is_completed());
}

#[test]
fn test_filter_predicate_fault_terminates_with_error() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .filter(|x| {
            if *x == 3 {
                Err(EffluxError::user_error(TestError::new("predicate failed")))
            } else {
                Ok(true)
            }
        })
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1, 2]);
    assert!(recording.error().is_some());
}

#[test]
fn test_upstream_error_passes_through_map() {
    // Arrange
    let recording = RecordingObserver::<i32>::new();

    // Act
    Observable::<i32>::error(EffluxError::stream_error("upstream"))
        .map(|x| Ok(x + 1))
        .subscribe(recording.observer_ref());

    // Assert
    let err = recording.error().expect("error must pass through");
    assert!(err.to_string().contains("upstream"));
}
