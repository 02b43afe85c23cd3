// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use std::sync::Arc;

type Selector<T, U> = Arc<dyn Fn(T) -> Result<U> + Send + Sync>;

struct MapStage<T, U> {
    child: Subscriber<U>,
    selector: Selector<T, U>,
}

impl<T, U> Observer<T> for MapStage<T, U>
where
    T: Send + Sync,
    U: Send + Sync,
{
    fn on_next(&self, value: T) -> Result<()> {
        match (self.selector)(value) {
            Ok(mapped) => self.child.on_next(mapped),
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

pub(crate) fn map<T, U, F>(source: &Observable<T>, selector: F) -> Observable<U>
where
    T: Send + Sync + 'static,
    U: Send + Sync + 'static,
    F: Fn(T) -> Result<U> + Send + Sync + 'static,
{
    let source = source.clone();
    let selector: Selector<T, U> = Arc::new(selector);
    Observable::new(move |child: &Subscriber<U>| {
        let stage = Arc::new(MapStage {
            child: child.clone(),
            selector: selector.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
