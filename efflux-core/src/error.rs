// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for the efflux reactive streaming library.
//!
//! This module defines a root [`EffluxError`] type with specific variants for
//! the different failure modes a push-based stream can surface: producer and
//! stage faults, wrapped user-callback errors, aggregated errors, the
//! distinguished unhandled-error marker and invalid operator arguments.
//!
//! Errors travel through a stream as the payload of `on_error`; once an
//! observer has received one, the sequence is over.
//!
//! # Examples
//!
//! ```
//! use efflux_core::{EffluxError, Result};
//!
//! fn checked_divide(a: i32, b: i32) -> Result<i32> {
//!     if b == 0 {
//!         return Err(EffluxError::stream_error("division by zero"));
//!     }
//!     Ok(a / b)
//! }
//! ```

/// Root error type for all efflux operations.
///
/// This enum encompasses every error condition that can occur during
/// subscription, emission and operator processing.
#[derive(Debug, thiserror::Error)]
pub enum EffluxError {
    /// A producer or operator stage failed.
    ///
    /// General-purpose variant for stream faults described by text.
    #[error("Stream error: {context}")]
    Stream {
        /// Description of what went wrong.
        context: String,
    },

    /// An error produced by user code.
    ///
    /// Wraps errors returned by user-provided callbacks (selectors,
    /// predicates, accumulators, observers) so they can be propagated
    /// through the stream unchanged.
    #[error("User error: {0}")]
    User(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Multiple errors occurred.
    ///
    /// Produced when several failures must be reported as one terminal
    /// event: `merge_delay_error` aggregation, or a primary error paired
    /// with the secondary error its handler raised.
    #[error("Multiple errors occurred: {count} errors")]
    Composite {
        /// Number of aggregated errors.
        count: usize,
        /// The individual errors, in the order they were observed.
        errors: Vec<EffluxError>,
    },

    /// An `on_error` was delivered to an observer with no error handler.
    ///
    /// This marker is what propagates out of the emitting thread when a
    /// subscriber supplied only an `on_next` callback. The wrapped source
    /// is the error the stream originally tried to deliver.
    #[error("Unhandled stream error: {source}")]
    Unhandled {
        /// The error nobody handled.
        source: Box<EffluxError>,
    },

    /// An operator was constructed with an invalid argument.
    #[error("Invalid argument: {context}")]
    Argument {
        /// Which argument was rejected and why.
        context: String,
    },
}

impl EffluxError {
    /// Create a stream error with the given context.
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::Stream {
            context: context.into(),
        }
    }

    /// Wrap a user error.
    pub fn user_error(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::User(Box::new(error))
    }

    /// Create an invalid-argument error with the given context.
    pub fn argument_error(context: impl Into<String>) -> Self {
        Self::Argument {
            context: context.into(),
        }
    }

    /// Mark an error as unhandled.
    ///
    /// Used by the safety wrapper when a subscriber provided no error
    /// handler. Already-unhandled errors are returned as-is.
    #[must_use]
    pub fn unhandled(error: EffluxError) -> Self {
        match error {
            unhandled @ Self::Unhandled { .. } => unhandled,
            other => Self::Unhandled {
                source: Box::new(other),
            },
        }
    }

    /// Aggregate several errors into a `Composite`.
    ///
    /// A single error is returned unchanged rather than wrapped.
    #[must_use]
    pub fn composite(mut errors: Vec<EffluxError>) -> Self {
        if errors.len() == 1 {
            return errors.remove(0);
        }
        Self::Composite {
            count: errors.len(),
            errors,
        }
    }

    /// Whether this is the distinguished unhandled-error marker.
    #[must_use]
    pub const fn is_unhandled(&self) -> bool {
        matches!(self, Self::Unhandled { .. })
    }

    /// Whether this error originated in user code or an ordinary stream
    /// fault, as opposed to the unhandled marker or an aggregate.
    ///
    /// `on_exception_resume_next` resumes only for these.
    #[must_use]
    pub const fn is_user_fault(&self) -> bool {
        matches!(self, Self::User(_) | Self::Stream { .. })
    }
}

/// Specialized `Result` type for efflux operations.
pub type Result<T> = std::result::Result<T, EffluxError>;

/// Helper trait for adding context to `Result`s.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Errors
    /// Returns `Err(EffluxError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<EffluxError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let context = context.into();
            match e.into() {
                EffluxError::User(inner) => EffluxError::Stream {
                    context: format!("{context}: {inner}"),
                },
                other => other,
            }
        })
    }
}

impl Clone for EffluxError {
    fn clone(&self) -> Self {
        match self {
            Self::Stream { context } => Self::Stream {
                context: context.clone(),
            },
            // The boxed user error cannot be cloned; demote it to its text form.
            Self::User(e) => Self::Stream {
                context: format!("User error: {e}"),
            },
            Self::Composite { count, errors } => Self::Composite {
                count: *count,
                errors: errors.clone(),
            },
            Self::Unhandled { source } => Self::Unhandled {
                source: source.clone(),
            },
            Self::Argument { context } => Self::Argument {
                context: context.clone(),
            },
        }
    }
}
