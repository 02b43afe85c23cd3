// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use std::sync::Arc;

type Predicate<T> = Arc<dyn Fn(&T) -> Result<bool> + Send + Sync>;

struct AllStage<T> {
    child: Subscriber<bool>,
    predicate: Predicate<T>,
}

impl<T: Send + Sync> Observer<T> for AllStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        match (self.predicate)(&value) {
            Ok(true) => Ok(()),
            Ok(false) => {
                // Short-circuit: the answer is known.
                self.child.on_next(false)?;
                self.child.on_completed()
            }
            Err(err) => self.child.on_error(err),
        }
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.child.on_next(true)?;
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn all<T, P>(source: &Observable<T>, predicate: P) -> Observable<bool>
where
    T: Send + Sync + 'static,
    P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
{
    let source = source.clone();
    let predicate: Predicate<T> = Arc::new(predicate);
    Observable::new(move |child: &Subscriber<bool>| {
        let stage = Arc::new(AllStage {
            child: child.clone(),
            predicate: predicate.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
