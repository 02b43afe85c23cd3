// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct SkipStage<T> {
    child: Subscriber<T>,
    remaining: AtomicUsize,
}

impl<T: Send + Sync> Observer<T> for SkipStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let remaining = self.remaining.load(Ordering::Acquire);
        if remaining > 0 {
            self.remaining.store(remaining - 1, Ordering::Release);
            return Ok(());
        }
        self.child.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn skip<T>(source: &Observable<T>, count: usize) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(SkipStage {
            child: child.clone(),
            remaining: AtomicUsize::new(count),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
