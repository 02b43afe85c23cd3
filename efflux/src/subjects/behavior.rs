// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subjects::{ReplaySubject, Subject};
use efflux_core::{EffluxError, Observer, Result};

/// Latest-value subject: new subscribers immediately receive the most
/// recent value (or the seed), then the live stream.
///
/// Built on a capacity-one replay core, so the ordering and late-terminal
/// guarantees of [`ReplaySubject`] apply unchanged.
pub struct BehaviorSubject<T: Send + Sync + 'static> {
    replay: ReplaySubject<T>,
}

impl<T: Clone + Send + Sync + 'static> BehaviorSubject<T> {
    /// Subject that emits nothing until the first value is pushed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replay: ReplaySubject::with_capacity(1),
        }
    }

    /// Subject seeded with an initial value.
    #[must_use]
    pub fn with_seed(seed: T) -> Self {
        let subject = Self::new();
        let _ = subject.replay.on_next(seed);
        subject
    }
}

impl<T: Clone + Send + Sync + 'static> Default for BehaviorSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            replay: self.replay.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observer<T> for BehaviorSubject<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.replay.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.replay.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.replay.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> for BehaviorSubject<T> {
    fn observable(&self) -> Observable<T> {
        self.replay.observable()
    }
}
