// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{
    CompositeSubscription, EffluxError, Observer, Result, SerialSubscription, Subscription,
};
use parking_lot::Mutex;
use std::sync::Arc;

// Subscribes the sources one at a time; each completion advances to the
// next. The serial subscription decouples the per-source lifetime from
// the downstream composite, which must survive across sources.
struct ConcatCoordinator<T> {
    child: Subscriber<T>,
    sources: Mutex<std::vec::IntoIter<Observable<T>>>,
    serial: SerialSubscription,
}

impl<T: Send + Sync + 'static> ConcatCoordinator<T> {
    fn advance(self: &Arc<Self>) -> Result<()> {
        let next = self.sources.lock().next();
        match next {
            None => self.child.on_completed(),
            Some(source) => {
                if self.serial.is_unsubscribed() {
                    return Ok(());
                }
                let stage = Arc::new(ConcatStage {
                    coordinator: self.clone(),
                });
                let parent = Subscriber::with_shared(stage, CompositeSubscription::new());
                // Hand the serial this source before subscribing: a source
                // completing synchronously advances from inside the call,
                // and a late `set` would dispose its successor.
                self.serial.set(parent.to_subscription());
                let subscription = source.unsafe_subscribe(&parent)?;
                parent.add(subscription);
                Ok(())
            }
        }
    }
}

struct ConcatStage<T> {
    coordinator: Arc<ConcatCoordinator<T>>,
}

impl<T: Send + Sync + 'static> Observer<T> for ConcatStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.coordinator.child.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.coordinator.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        // Synchronous sources recurse here once per source; the depth is
        // bounded by the number of sources.
        self.coordinator.advance()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn concat<T>(sources: Vec<Observable<T>>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    Observable::new(move |child: &Subscriber<T>| {
        let coordinator = Arc::new(ConcatCoordinator {
            child: child.clone(),
            sources: Mutex::new(sources.clone().into_iter()),
            serial: SerialSubscription::new(),
        });
        coordinator.advance()?;
        Ok(coordinator.serial.handle())
    })
}
