// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fan-in: interleave the emissions of every inner observable.
//!
//! Inner sources may emit from different threads; delivery to the
//! downstream observer is serialized at this stage. Plain merge
//! terminates on the first inner error; delay-error mode holds errors
//! back and emits them as one aggregate after every source terminated.

use crate::observable::Observable;
use crate::serialized::SerializedObserver;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, ObserverRef, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct MergeCoordinator<T> {
    child: Subscriber<T>,
    downstream: Arc<SerializedObserver<T>>,
    // The outer source plus every live inner.
    active: AtomicUsize,
    delay_errors: bool,
    held_errors: Mutex<Vec<EffluxError>>,
}

impl<T: Send + Sync + 'static> MergeCoordinator<T> {
    fn source_finished(&self) -> Result<()> {
        if self.active.fetch_sub(1, Ordering::AcqRel) != 1 {
            return Ok(());
        }
        let held = std::mem::take(&mut *self.held_errors.lock());
        if held.is_empty() {
            self.downstream.on_completed()
        } else {
            self.downstream.on_error(EffluxError::composite(held))
        }
    }

    fn source_errored(&self, err: EffluxError) -> Result<()> {
        if self.delay_errors {
            self.held_errors.lock().push(err);
            self.source_finished()
        } else {
            self.downstream.on_error(err)
        }
    }
}

struct OuterStage<T> {
    coordinator: Arc<MergeCoordinator<T>>,
}

impl<T: Send + Sync + 'static> Observer<Observable<T>> for OuterStage<T> {
    fn on_next(&self, inner: Observable<T>) -> Result<()> {
        let coordinator = &self.coordinator;
        coordinator.active.fetch_add(1, Ordering::AcqRel);
        let stage = Arc::new(InnerStage {
            coordinator: coordinator.clone(),
        });
        let parent = Subscriber::with_shared(stage, coordinator.child.composite().clone());
        match inner.unsafe_subscribe(&parent) {
            Ok(subscription) => {
                coordinator.child.add(subscription);
                Ok(())
            }
            Err(err) => coordinator.source_errored(err),
        }
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.coordinator.source_errored(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.coordinator.source_finished()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct InnerStage<T> {
    coordinator: Arc<MergeCoordinator<T>>,
}

impl<T: Send + Sync + 'static> Observer<T> for InnerStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.coordinator.downstream.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.coordinator.source_errored(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.coordinator.source_finished()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn merge_observable<T>(
    source: &Observable<Observable<T>>,
    delay_errors: bool,
) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let downstream = Arc::new(SerializedObserver::new(
            Arc::new(child.clone()) as ObserverRef<T>
        ));
        let coordinator = Arc::new(MergeCoordinator {
            child: child.clone(),
            downstream,
            active: AtomicUsize::new(1),
            delay_errors,
            held_errors: Mutex::new(Vec::new()),
        });
        let outer = Arc::new(OuterStage { coordinator });
        let parent = Subscriber::with_shared(outer, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
