// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Reified stream events.
//!
//! A [`Notification`] is one event of a stream turned into a first-class
//! value: a payload, a terminal error, or a completion. `materialize`
//! turns a stream into its notifications, `dematerialize` inverts that,
//! and internal queues (such as the one inside `observe_on`) use
//! notifications to carry terminal events alongside values.

use crate::error::{EffluxError, Result};
use crate::observer::Observer;

/// A single stream event as a value.
#[derive(Debug, Clone)]
pub enum Notification<T> {
    /// A value emission.
    Next(T),
    /// The terminal error of the sequence.
    Error(EffluxError),
    /// The normal completion of the sequence.
    Completed,
}

impl<T> Notification<T> {
    /// Returns `true` if this is a `Next`.
    pub const fn is_next(&self) -> bool {
        matches!(self, Notification::Next(_))
    }

    /// Returns `true` if this is an `Error`.
    pub const fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }

    /// Returns `true` if this is a `Completed`.
    pub const fn is_completed(&self) -> bool {
        matches!(self, Notification::Completed)
    }

    /// Returns `true` for either terminal case.
    pub const fn is_terminal(&self) -> bool {
        !self.is_next()
    }

    /// Converts to `Option<T>`, discarding terminal events.
    pub fn into_value(self) -> Option<T> {
        match self {
            Notification::Next(v) => Some(v),
            _ => None,
        }
    }

    /// Maps the contained value, leaving terminal events unchanged.
    pub fn map<U, F>(self, f: F) -> Notification<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Notification::Next(v) => Notification::Next(f(v)),
            Notification::Error(e) => Notification::Error(e),
            Notification::Completed => Notification::Completed,
        }
    }

    /// Replays this event onto an observer.
    ///
    /// # Errors
    /// Propagates whatever the observer operation returns.
    pub fn accept(self, observer: &dyn Observer<T>) -> Result<()> {
        match self {
            Notification::Next(v) => observer.on_next(v),
            Notification::Error(e) => observer.on_error(e),
            Notification::Completed => observer.on_completed(),
        }
    }
}

impl<T: PartialEq> PartialEq for Notification<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Notification::Next(a), Notification::Next(b)) => a == b,
            (Notification::Completed, Notification::Completed) => true,
            // Errors are never equal
            _ => false,
        }
    }
}
