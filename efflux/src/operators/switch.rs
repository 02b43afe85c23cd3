// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Forward only the most recent inner observable.
//!
//! Each inner arrival bumps an epoch and swaps the serial subscription,
//! disposing the previous inner. Events from a superseded inner are
//! dropped by the epoch check. The result completes once the outer has
//! completed and the latest inner has too.

use crate::observable::Observable;
use crate::serialized::SerializedObserver;
use crate::subscriber::Subscriber;
use efflux_core::{
    CompositeSubscription, EffluxError, Observer, ObserverRef, Result, SerialSubscription,
};
use parking_lot::Mutex;
use std::sync::Arc;

struct SwitchState {
    epoch: u64,
    inner_active: bool,
    outer_done: bool,
    terminated: bool,
}

struct SwitchCoordinator<T> {
    downstream: Arc<SerializedObserver<T>>,
    serial: SerialSubscription,
    state: Mutex<SwitchState>,
}

struct OuterStage<T> {
    coordinator: Arc<SwitchCoordinator<T>>,
}

impl<T: Send + Sync + 'static> Observer<Observable<T>> for OuterStage<T> {
    fn on_next(&self, inner: Observable<T>) -> Result<()> {
        let coordinator = &self.coordinator;
        let epoch = {
            let mut state = coordinator.state.lock();
            if state.terminated {
                return Ok(());
            }
            state.epoch += 1;
            state.inner_active = true;
            state.epoch
        };
        let stage = Arc::new(InnerStage {
            coordinator: coordinator.clone(),
            epoch,
        });
        let parent = Subscriber::with_shared(stage, CompositeSubscription::new());
        // Swapping the serial disposes the superseded inner.
        coordinator.serial.set(parent.to_subscription());
        match inner.unsafe_subscribe(&parent) {
            Ok(subscription) => {
                parent.add(subscription);
                Ok(())
            }
            Err(err) => coordinator.downstream.on_error(err),
        }
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.coordinator.state.lock().terminated = true;
        self.coordinator.downstream.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        let finished = {
            let mut state = self.coordinator.state.lock();
            state.outer_done = true;
            !state.inner_active && !state.terminated
        };
        if finished {
            self.coordinator.downstream.on_completed()
        } else {
            Ok(())
        }
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct InnerStage<T> {
    coordinator: Arc<SwitchCoordinator<T>>,
    epoch: u64,
}

impl<T> InnerStage<T> {
    fn is_current(&self) -> bool {
        let state = self.coordinator.state.lock();
        !state.terminated && state.epoch == self.epoch
    }
}

impl<T: Send + Sync + 'static> Observer<T> for InnerStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        if self.is_current() {
            self.coordinator.downstream.on_next(value)?;
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        if self.is_current() {
            self.coordinator.state.lock().terminated = true;
            return self.coordinator.downstream.on_error(err);
        }
        Ok(())
    }

    fn on_completed(&self) -> Result<()> {
        let finished = {
            let mut state = self.coordinator.state.lock();
            if state.terminated || state.epoch != self.epoch {
                return Ok(());
            }
            state.inner_active = false;
            state.outer_done
        };
        if finished {
            self.coordinator.downstream.on_completed()
        } else {
            Ok(())
        }
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn switch_on_next<T>(source: &Observable<Observable<T>>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let serial = SerialSubscription::new();
        child.add(serial.handle());
        let coordinator = Arc::new(SwitchCoordinator {
            downstream: Arc::new(SerializedObserver::new(
                Arc::new(child.clone()) as ObserverRef<T>
            )),
            serial: serial.clone(),
            state: Mutex::new(SwitchState {
                epoch: 0,
                inner_active: false,
                outer_done: false,
                terminated: false,
            }),
        });
        let outer = Arc::new(OuterStage { coordinator });
        let parent = Subscriber::with_shared(outer, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
