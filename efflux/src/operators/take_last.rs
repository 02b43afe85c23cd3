// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result, Subscription};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct TakeLastStage<T> {
    child: Subscriber<T>,
    limit: usize,
    window: Mutex<VecDeque<T>>,
}

impl<T: Send + Sync> Observer<T> for TakeLastStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let mut window = self.window.lock();
        window.push_back(value);
        if window.len() > self.limit {
            window.pop_front();
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.window.lock().clear();
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        let drained: Vec<T> = self.window.lock().drain(..).collect();
        for value in drained {
            if self.child.is_unsubscribed() {
                return Ok(());
            }
            self.child.on_next(value)?;
        }
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn take_last<T>(source: &Observable<T>, count: usize) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(TakeLastStage {
            child: child.clone(),
            limit: count,
            window: Mutex::new(VecDeque::new()),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
