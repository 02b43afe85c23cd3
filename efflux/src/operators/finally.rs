// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use parking_lot::Mutex;
use std::sync::Arc;

struct FinallyStage<T> {
    child: Subscriber<T>,
    action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl<T> FinallyStage<T> {
    fn run_action(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }
}

impl<T: Send + Sync> Observer<T> for FinallyStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.child.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        let result = self.child.on_error(err);
        self.run_action();
        result
    }

    fn on_completed(&self) -> Result<()> {
        let result = self.child.on_completed();
        self.run_action();
        result
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn finally_do<T, F>(source: &Observable<T>, action: F) -> Observable<T>
where
    T: Send + Sync + 'static,
    F: Fn() + Send + Sync + 'static,
{
    let source = source.clone();
    let action = Arc::new(action);
    Observable::new(move |child: &Subscriber<T>| {
        let action = action.clone();
        let stage = Arc::new(FinallyStage {
            child: child.clone(),
            action: Mutex::new(Some(Box::new(move || (*action)()))),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
