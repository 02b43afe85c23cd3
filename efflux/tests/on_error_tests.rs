// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux::{EffluxError, Observable};
use efflux_test_utils::RecordingObserver;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn failing_after(values: Vec<i32>, message: &str) -> Observable<i32> {
    Observable::from_iter(values)
        .concat_with(&Observable::error(EffluxError::stream_error(message)))
}

#[test]
fn test_on_error_return_replaces_the_error_with_a_value() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    failing_after(vec![1, 2], "fallback me")
        .on_error_return(|_| Ok(-1))
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1, 2, -1]);
    assert!(recording.is_completed());
    assert!(recording.error().is_none());
}

#[test]
fn test_on_error_resume_next_continues_with_the_other_stream() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    failing_after(vec![1], "switch over")
        .on_error_resume_next(&Observable::from_iter(vec![8, 9]))
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![1, 8, 9]);
    assert!(recording.is_completed());
}

#[test]
fn test_on_error_resume_next_with_selects_from_the_error() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    failing_after(vec![], "pick 42")
        .on_error_resume_next_with(|err| {
            assert!(err.to_string().contains("pick 42"));
            Ok(Observable::just(42))
        })
        .subscribe(recording.observer_ref());

    // Assert
    assert_eq!(recording.values(), vec![42]);
    assert!(recording.is_completed());
}

#[test]
fn test_resume_stream_errors_pass_through() {
    // Arrange
    let recording = RecordingObserver::new();

    // Act
    failing_after(vec![1], "first")
        .on_error_resume_next(&failing_after(vec![2], "second"))
        .subscribe(recording.observer_ref());

    // Assert: resumption happens once; the second error is terminal.
    assert_eq!(recording.values(), vec![1, 2]);
    let err = recording.error().expect("second error must surface");
    assert!(err.to_string().contains("second"));
}

#[test]
fn test_on_exception_resume_next_skips_non_user_faults() {
    // Arrange
    let resumed = RecordingObserver::new();
    let passed_through = RecordingObserver::new();
    let fallback = Observable::just(7);

    // Act: a plain stream error resumes.
    failing_after(vec![], "user level")
        .on_exception_resume_next(&fallback)
        .subscribe(resumed.observer_ref());
    // An unhandled marker does not.
    Observable::<i32>::error(EffluxError::unhandled(EffluxError::stream_error("fatal")))
        .on_exception_resume_next(&fallback)
        .subscribe(passed_through.observer_ref());

    // Assert
    assert_eq!(resumed.values(), vec![7]);
    assert!(resumed.is_completed());
    assert_eq!(passed_through.value_count(), 0);
    assert!(passed_through.error().is_some());
}

#[test]
fn test_finally_runs_after_completion_and_after_error() {
    // Arrange
    let runs = Arc::new(AtomicUsize::new(0));

    // Act
    let counter = runs.clone();
    Observable::from_iter(vec![1]).finally_do(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .subscribe_next(|_| Ok(()));

    let counter = runs.clone();
    failing_after(vec![], "doomed")
        .finally_do(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .subscribe_next_error(|_| Ok(()), |_| Ok(()));

    // Assert
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
