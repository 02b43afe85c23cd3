// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable};
use efflux_test_utils::{RecordingObserver, TestError};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_values_are_routed_by_key() {
    // Arrange
    let groups: Arc<Mutex<Vec<(i32, RecordingObserver<i32>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = groups.clone();

    // Act
    Observable::from_iter(vec![1, 2, 3, 4, 5, 6])
        .group_by(|value| Ok(value % 2))
        .subscribe_next(move |group| {
            let recording = RecordingObserver::new();
            group.observable().subscribe(recording.observer_ref());
            sink.lock().push((*group.key(), recording));
            Ok(())
        });

    // Assert
    let groups = groups.lock();
    assert_eq!(groups.len(), 2);
    let odd = &groups.iter().find(|(key, _)| *key == 1).expect("odd group").1;
    let even = &groups.iter().find(|(key, _)| *key == 0).expect("even group").1;
    assert_eq!(odd.values(), vec![1, 3, 5]);
    assert_eq!(even.values(), vec![2, 4, 6]);
    assert!(odd.is_completed() && even.is_completed());
}

#[test]
fn test_groups_buffer_for_late_subscribers() {
    // Arrange: collect the groups first, subscribe afterwards.
    let groups: Arc<Mutex<Vec<efflux::GroupedObservable<i32, i32>>>> =
        Arc::new(Mutex::new(Vec::new()));
    let sink = groups.clone();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .group_by(|value| Ok(value % 2))
        .subscribe_next(move |group| {
            sink.lock().push(group);
            Ok(())
        });

    // Assert: subscribing after upstream completion still sees the values.
    let recording = RecordingObserver::new();
    groups.lock()[0].observable().subscribe(recording.observer_ref());
    assert_eq!(recording.values(), vec![1, 3]);
    assert!(recording.is_completed());
}

#[test]
fn test_key_selector_fault_fails_groups_and_downstream() {
    // Arrange
    let group_errors = Arc::new(Mutex::new(0usize));
    let seen = group_errors.clone();
    let downstream = Arc::new(Mutex::new(None::<EffluxError>));
    let downstream_error = downstream.clone();

    // Act
    Observable::from_iter(vec![1, 2, 3])
        .group_by(move |value| {
            if *value == 3 {
                Err(EffluxError::user_error(TestError::new("bad key")))
            } else {
                Ok(*value)
            }
        })
        .subscribe_next_error(
            move |group| {
                let counter = seen.clone();
                group.observable().subscribe_next_error(
                    |_| Ok(()),
                    move |_| {
                        *counter.lock() += 1;
                        Ok(())
                    },
                );
                Ok(())
            },
            move |err| {
                *downstream_error.lock() = Some(err);
                Ok(())
            },
        );

    // Assert
    assert!(downstream.lock().is_some());
    assert_eq!(*group_errors.lock(), 2);
}
