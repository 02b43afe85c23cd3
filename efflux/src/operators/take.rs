// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{empty as empty_subscription, EffluxError, Observer, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct TakeStage<T> {
    child: Subscriber<T>,
    limit: usize,
    taken: AtomicUsize,
}

impl<T: Send + Sync> Observer<T> for TakeStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let taken = self.taken.fetch_add(1, Ordering::AcqRel);
        if taken >= self.limit {
            return Ok(());
        }
        self.child.on_next(value)?;
        if taken + 1 == self.limit {
            // Completion also disposes the shared composite, which is
            // what stops the upstream producer.
            self.child.on_completed()?;
        }
        Ok(())
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

pub(crate) fn take<T>(source: &Observable<T>, count: usize) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        if count == 0 {
            child.on_completed()?;
            return Ok(empty_subscription());
        }
        let stage = Arc::new(TakeStage {
            child: child.clone(),
            limit: count,
            taken: AtomicUsize::new(0),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
