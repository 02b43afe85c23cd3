// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use std::sync::Arc;

struct ForwardStage<T> {
    child: Subscriber<T>,
}

impl<T: Send + Sync> Observer<T> for ForwardStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.child.on_next(value)
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

// The gate's first event of any kind completes the result; its error
// propagates. Terminating through the shared composite also disposes the
// main subscription.
struct GateStage<T, U> {
    child: Subscriber<T>,
    _marker: std::marker::PhantomData<fn(U)>,
}

impl<T: Send + Sync, U: Send + Sync> Observer<U> for GateStage<T, U> {
    fn on_next(&self, _value: U) -> Result<()> {
        self.child.on_completed()
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

pub(crate) fn take_until<T, U>(source: &Observable<T>, gate: &Observable<U>) -> Observable<T>
where
    T: Send + Sync + 'static,
    U: Send + Sync + 'static,
{
    let source = source.clone();
    let gate = gate.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let gate_stage = Arc::new(GateStage {
            child: child.clone(),
            _marker: std::marker::PhantomData,
        });
        let gate_parent = Subscriber::with_shared(gate_stage, child.composite().clone());
        let gate_subscription = gate.unsafe_subscribe(&gate_parent)?;
        child.add(gate_subscription);

        let stage = Arc::new(ForwardStage {
            child: child.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
