// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Duplex stream endpoints.
//!
//! A subject is both an [`Observer`] (events are pushed into it) and a
//! stream (observers subscribe to its [`observable`](Subject::observable)
//! side). Subjects are the fan-out relays behind `publish`, `replay`,
//! `cache` and `group_by`.
//!
//! All subjects share two guarantees:
//!
//! - every observer sees a common prefix order of the events pushed in;
//! - the subscriber registry lock is never held while downstream
//!   callbacks run.
//!
//! ## Implementations
//!
//! - [`PublishSubject`]: live events only; terminal state is latched for
//!   late subscribers.
//! - [`ReplaySubject`]: buffered events (unbounded, count- or
//!   time-bounded) replayed before joining the live stream.
//! - [`BehaviorSubject`]: the latest value only, optionally seeded.

mod behavior;
mod publish;
mod replay;

pub use behavior::BehaviorSubject;
pub use publish::PublishSubject;
pub use replay::ReplaySubject;

use crate::observable::Observable;
use efflux_core::{EffluxError, Observer, Result};

/// A stream that is also an observer.
pub trait Subject<T>: Observer<T> {
    /// The outbound side: an observable delivering this subject's events.
    fn observable(&self) -> Observable<T>;
}

/// Latched terminal state, replayed to late subscribers.
#[derive(Clone)]
pub(crate) enum TerminalEvent {
    Error(EffluxError),
    Completed,
}

impl TerminalEvent {
    pub(crate) fn deliver<T>(&self, observer: &dyn Observer<T>) -> Result<()> {
        match self {
            TerminalEvent::Error(e) => observer.on_error(e.clone()),
            TerminalEvent::Completed => observer.on_completed(),
        }
    }
}
