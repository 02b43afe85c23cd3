// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The observer protocol: the sink side of a reactive stream.
//!
//! An [`Observer`] receives a sequence of `on_next` calls followed by at
//! most one terminal `on_completed` or `on_error`. The grammar is enforced
//! by the safety wrapper in the `efflux-rx` crate, not by implementors.
//!
//! Operations return `Result`: an `Err` signals that the *observer itself*
//! failed to process the event (the push-based analog of a consumer
//! callback throwing). The safety wrapper converts such faults into
//! `on_error` on the same observer, or routes them to the process-wide
//! error hook when they occur in a terminal handler.

use crate::error::{EffluxError, Result};
use std::sync::Arc;

/// A sink receiving the events of one stream execution.
///
/// Implementations must be callable from any thread; delivery to a single
/// observer is serialized by the library.
pub trait Observer<T>: Send + Sync {
    /// Receive the next value of the sequence.
    ///
    /// # Errors
    /// `Err` signals a consumer fault; the safety wrapper converts it into
    /// `on_error` on this same observer.
    fn on_next(&self, value: T) -> Result<()>;

    /// Receive the terminal error of the sequence.
    ///
    /// # Errors
    /// `Err` signals that the handler itself failed, or that no error
    /// handler was installed ([`EffluxError::Unhandled`]).
    fn on_error(&self, error: EffluxError) -> Result<()>;

    /// Receive the normal completion of the sequence.
    ///
    /// # Errors
    /// `Err` signals that the completion handler failed; the fault is
    /// routed to the process-wide error hook.
    fn on_completed(&self) -> Result<()>;

    /// Marker capability: whether this observer already enforces the
    /// emission grammar itself.
    ///
    /// The subscribe dispatch skips the safety wrapper for observers that
    /// return `true` (internal operator stages and wrappers). Detection is
    /// always through this marker, never through type names.
    fn is_safe(&self) -> bool {
        false
    }
}

/// Shared handle to a type-erased observer.
pub type ObserverRef<T> = Arc<dyn Observer<T>>;

type NextFn<T> = Box<dyn Fn(T) -> Result<()> + Send + Sync>;
type ErrorFn = Box<dyn Fn(EffluxError) -> Result<()> + Send + Sync>;
type CompletedFn = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Observer synthesized from up to three closures.
///
/// Created by the `subscribe_next` / `subscribe_next_error` /
/// `subscribe_all` convenience overloads. When no error closure was
/// supplied, `on_error` reports the distinguished unhandled marker, which
/// the safety wrapper propagates out of the emitting thread.
pub struct FnObserver<T> {
    next: NextFn<T>,
    error: Option<ErrorFn>,
    completed: Option<CompletedFn>,
}

impl<T> FnObserver<T> {
    /// Observer with only an `on_next` handler.
    ///
    /// Errors delivered to this observer take the unhandled-error path.
    pub fn from_next<N>(next: N) -> Self
    where
        N: Fn(T) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            error: None,
            completed: None,
        }
    }

    /// Observer with `on_next` and `on_error` handlers.
    pub fn from_next_error<N, E>(next: N, error: E) -> Self
    where
        N: Fn(T) -> Result<()> + Send + Sync + 'static,
        E: Fn(EffluxError) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            error: Some(Box::new(error)),
            completed: None,
        }
    }

    /// Observer with all three handlers.
    pub fn from_all<N, E, C>(next: N, error: E, completed: C) -> Self
    where
        N: Fn(T) -> Result<()> + Send + Sync + 'static,
        E: Fn(EffluxError) -> Result<()> + Send + Sync + 'static,
        C: Fn() -> Result<()> + Send + Sync + 'static,
    {
        Self {
            next: Box::new(next),
            error: Some(Box::new(error)),
            completed: Some(Box::new(completed)),
        }
    }
}

impl<T> Observer<T> for FnObserver<T>
where
    T: Send,
{
    fn on_next(&self, value: T) -> Result<()> {
        (self.next)(value)
    }

    fn on_error(&self, error: EffluxError) -> Result<()> {
        match &self.error {
            Some(handler) => handler(error),
            None => Err(EffluxError::unhandled(error)),
        }
    }

    fn on_completed(&self) -> Result<()> {
        match &self.completed {
            Some(handler) => handler(),
            None => Ok(()),
        }
    }
}
