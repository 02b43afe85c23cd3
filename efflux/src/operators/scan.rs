// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use parking_lot::Mutex;
use std::sync::Arc;

type Accumulator<U, T> = Arc<dyn Fn(U, T) -> Result<U> + Send + Sync>;

struct ScanSeededStage<T, U> {
    child: Subscriber<U>,
    accumulator: Accumulator<U, T>,
    acc: Mutex<U>,
}

impl<T, U> Observer<T> for ScanSeededStage<T, U>
where
    T: Send + Sync,
    U: Clone + Send + Sync,
{
    fn on_next(&self, value: T) -> Result<()> {
        let current = self.acc.lock().clone();
        match (self.accumulator)(current, value) {
            Ok(next) => {
                *self.acc.lock() = next.clone();
                self.child.on_next(next)
            }
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

struct ScanStage<T> {
    child: Subscriber<T>,
    accumulator: Accumulator<T, T>,
    acc: Mutex<Option<T>>,
}

impl<T: Clone + Send + Sync> Observer<T> for ScanStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let current = self.acc.lock().take();
        let next = match current {
            // First value: passes through as the initial accumulation.
            None => value,
            Some(acc) => match (self.accumulator)(acc, value) {
                Ok(next) => next,
                Err(err) => return self.child.on_error(err),
            },
        };
        *self.acc.lock() = Some(next.clone());
        self.child.on_next(next)
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

pub(crate) fn scan<T, F>(source: &Observable<T>, accumulator: F) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
{
    let source = source.clone();
    let accumulator: Accumulator<T, T> = Arc::new(accumulator);
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(ScanStage {
            child: child.clone(),
            accumulator: accumulator.clone(),
            acc: Mutex::new(None),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}

pub(crate) fn scan_seeded<T, U, F>(source: &Observable<T>, seed: U, accumulator: F) -> Observable<U>
where
    T: Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: Fn(U, T) -> Result<U> + Send + Sync + 'static,
{
    let source = source.clone();
    let accumulator: Accumulator<U, T> = Arc::new(accumulator);
    Observable::new(move |child: &Subscriber<U>| {
        let stage = Arc::new(ScanSeededStage {
            child: child.clone(),
            accumulator: accumulator.clone(),
            acc: Mutex::new(seed.clone()),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
