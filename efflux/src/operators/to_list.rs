// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::sync::Arc;

type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

struct ToListStage<T> {
    child: Subscriber<Vec<T>>,
    collected: Mutex<Vec<T>>,
    comparator: Option<Comparator<T>>,
}

impl<T: Send + Sync> Observer<T> for ToListStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.collected.lock().push(value);
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.collected.lock().clear();
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        let mut collected = std::mem::take(&mut *self.collected.lock());
        if let Some(comparator) = &self.comparator {
            collected.sort_by(|a, b| (**comparator)(a, b));
        }
        self.child.on_next(collected)?;
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn to_list<T>(source: &Observable<T>) -> Observable<Vec<T>>
where
    T: Send + Sync + 'static,
{
    build(source, None)
}

pub(crate) fn to_sorted_list_by<T, F>(source: &Observable<T>, comparator: F) -> Observable<Vec<T>>
where
    T: Send + Sync + 'static,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    build(source, Some(Arc::new(comparator)))
}

fn build<T>(source: &Observable<T>, comparator: Option<Comparator<T>>) -> Observable<Vec<T>>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<Vec<T>>| {
        let stage = Arc::new(ToListStage {
            child: child.clone(),
            collected: Mutex::new(Vec::new()),
            comparator: comparator.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
