// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux_core::{EffluxError, ResultExt};

#[derive(Debug, thiserror::Error)]
#[error("parse failed: {0}")]
struct ParseFailure(String);

#[test]
fn test_constructor_helpers() {
    // Act
    let stream = EffluxError::stream_error("pipeline stalled");
    let user = EffluxError::user_error(ParseFailure("x".into()));
    let argument = EffluxError::argument_error("count must be positive");

    // Assert
    assert_eq!(stream.to_string(), "Stream error: pipeline stalled");
    assert!(user.to_string().contains("parse failed"));
    assert!(argument.to_string().contains("count must be positive"));
}

#[test]
fn test_unhandled_marker_is_idempotent() {
    // Arrange
    let original = EffluxError::stream_error("failure");

    // Act
    let unhandled = EffluxError::unhandled(original);
    let twice = EffluxError::unhandled(unhandled.clone());

    // Assert
    assert!(unhandled.is_unhandled());
    assert!(matches!(twice, EffluxError::Unhandled { ref source } if !source.is_unhandled()));
}

#[test]
fn test_composite_unwraps_single_error() {
    // Act
    let single = EffluxError::composite(vec![EffluxError::stream_error("only")]);
    let multiple = EffluxError::composite(vec![
        EffluxError::stream_error("first"),
        EffluxError::stream_error("second"),
    ]);

    // Assert
    assert!(matches!(single, EffluxError::Stream { .. }));
    assert!(matches!(multiple, EffluxError::Composite { count: 2, .. }));
}

#[test]
fn test_clone_demotes_user_error_to_text() {
    // Arrange
    let user = EffluxError::user_error(ParseFailure("y".into()));

    // Act
    let cloned = user.clone();

    // Assert
    assert!(matches!(cloned, EffluxError::Stream { ref context } if context.contains("parse failed")));
}

#[test]
fn test_user_fault_classification() {
    // Assert
    assert!(EffluxError::stream_error("x").is_user_fault());
    assert!(EffluxError::user_error(ParseFailure("z".into())).is_user_fault());
    assert!(!EffluxError::unhandled(EffluxError::stream_error("x")).is_user_fault());
    assert!(!EffluxError::composite(vec![
        EffluxError::stream_error("a"),
        EffluxError::stream_error("b"),
    ])
    .is_user_fault());
}

#[test]
fn test_context_rewrites_user_errors() {
    // Arrange
    let result: Result<(), ParseFailure> = Err(ParseFailure("token".into()));

    // Act
    let with_context = result
        .map_err(EffluxError::user_error)
        .context("reading header");

    // Assert
    let err = with_context.expect_err("must stay an error");
    assert!(err.to_string().contains("reading header"));
}
