// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> Result<bool> + Send + Sync>;

struct FilterStage<T> {
    child: Subscriber<T>,
    predicate: Predicate<T>,
}

impl<T: Send + Sync> Observer<T> for FilterStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        match (self.predicate)(&value) {
            Ok(true) => self.child.on_next(value),
            Ok(false) => Ok(()),
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

pub(crate) fn filter<T, P>(source: &Observable<T>, predicate: P) -> Observable<T>
where
    T: Send + Sync + 'static,
    P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
{
    let source = source.clone();
    let predicate: Predicate<T> = Arc::new(predicate);
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(FilterStage {
            child: child.clone(),
            predicate: predicate.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
