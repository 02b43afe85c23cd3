// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type IndexedPredicate<T> = Arc<dyn Fn(&T, usize) -> Result<bool> + Send + Sync>;

struct TakeWhileStage<T> {
    child: Subscriber<T>,
    predicate: IndexedPredicate<T>,
    index: AtomicUsize,
}

impl<T: Send + Sync> Observer<T> for TakeWhileStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let index = self.index.fetch_add(1, Ordering::AcqRel);
        match (self.predicate)(&value, index) {
            Ok(true) => self.child.on_next(value),
            Ok(false) => self.child.on_completed(),
            Err(err) => self.child.on_error(err),
        }
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

pub(crate) fn take_while<T, P>(source: &Observable<T>, predicate: P) -> Observable<T>
where
    T: Send + Sync + 'static,
    P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
{
    take_while_with_index(source, move |value, _| predicate(value))
}

pub(crate) fn take_while_with_index<T, P>(source: &Observable<T>, predicate: P) -> Observable<T>
where
    T: Send + Sync + 'static,
    P: Fn(&T, usize) -> Result<bool> + Send + Sync + 'static,
{
    let source = source.clone();
    let predicate: IndexedPredicate<T> = Arc::new(predicate);
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(TakeWhileStage {
            child: child.clone(),
            predicate: predicate.clone(),
            index: AtomicUsize::new(0),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
