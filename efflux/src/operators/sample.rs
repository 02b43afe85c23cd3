// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result, Subscription, SubscriptionRef};
use efflux_sched::{schedule_periodic, SchedulerRef};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

struct SampleStage<T> {
    child: Subscriber<T>,
    latest: Arc<Mutex<Option<T>>>,
    timer: SubscriptionRef,
}

impl<T: Send + Sync> Observer<T> for SampleStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        *self.latest.lock() = Some(value);
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.timer.unsubscribe();
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.timer.unsubscribe();
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

// Each tick takes the latest value, so a tick without fresh input emits
// nothing and a value is never emitted twice.
pub(crate) fn sample<T>(
    source: &Observable<T>,
    period: Duration,
    scheduler: &SchedulerRef,
) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    let scheduler = scheduler.clone();
    Observable::new(move |child: &Subscriber<T>| {
        if period.is_zero() {
            return Err(EffluxError::argument_error("sample period must be positive"));
        }
        let latest = Arc::new(Mutex::new(None::<T>));
        let tick_latest = latest.clone();
        let tick_child = child.clone();
        let timer = schedule_periodic(&scheduler, period, period, move || {
            let value = tick_latest.lock().take();
            if let Some(value) = value {
                let _ = tick_child.on_next(value);
            }
        });
        child.add(timer.clone());

        let stage = Arc::new(SampleStage {
            child: child.clone(),
            latest,
            timer,
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
