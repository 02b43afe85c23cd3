// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Notification, Observer, Result};
use std::sync::Arc;

// Terminal events become values followed by a completion, so the
// materialized stream always ends normally.
struct MaterializeStage<T> {
    child: Subscriber<Notification<T>>,
}

impl<T: Send + Sync> Observer<T> for MaterializeStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.child.on_next(Notification::Next(value))
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.child.on_next(Notification::Error(err))?;
        self.child.on_completed()
    }

    fn on_completed(&self) -> Result<()> {
        self.child.on_next(Notification::Completed)?;
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct DematerializeStage<T> {
    child: Subscriber<T>,
}

impl<T: Send + Sync> Observer<Notification<T>> for DematerializeStage<T> {
    fn on_next(&self, event: Notification<T>) -> Result<()> {
        match event {
            Notification::Next(value) => self.child.on_next(value),
            Notification::Error(err) => self.child.on_error(err),
            Notification::Completed => self.child.on_completed(),
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

pub(crate) fn materialize<T>(source: &Observable<T>) -> Observable<Notification<T>>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<Notification<T>>| {
        let stage = Arc::new(MaterializeStage {
            child: child.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}

pub(crate) fn dematerialize<T>(source: &Observable<Notification<T>>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(DematerializeStage {
            child: child.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
