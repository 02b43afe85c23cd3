// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Scheduler handoff for emissions.
//!
//! Upstream events are queued and drained one at a time on a
//! scheduler-owned worker, preserving upstream order. At most one drain
//! is scheduled at a time, so downstream delivery never interleaves.
//! Unsubscription cancels the pending drain and discards the queue.

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Notification, Observer, Result, SerialSubscription, Subscription};
use efflux_sched::SchedulerRef;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct HandoffState<T> {
    queue: VecDeque<Notification<T>>,
    scheduled: bool,
}

struct ObserveOnStage<T> {
    child: Subscriber<T>,
    scheduler: SchedulerRef,
    pending: SerialSubscription,
    // Serializes schedule/set pairs so a drain that finishes quickly
    // cannot have its successor's unit disposed by a late `set`.
    reschedule: Mutex<()>,
    state: Mutex<HandoffState<T>>,
}

impl<T: Send + Sync + 'static> ObserveOnStage<T> {
    fn enqueue(self: &Arc<Self>, event: Notification<T>) -> Result<()> {
        {
            let mut state = self.state.lock();
            if self.child.is_unsubscribed() {
                return Ok(());
            }
            state.queue.push_back(event);
            if state.scheduled {
                return Ok(());
            }
            state.scheduled = true;
        }
        let stage = self.clone();
        let guard = self.reschedule.lock();
        let unit = self.scheduler.schedule(Box::new(move || stage.drain()));
        self.pending.set(unit);
        drop(guard);
        Ok(())
    }

    fn drain(&self) {
        loop {
            let event = {
                let mut state = self.state.lock();
                if self.child.is_unsubscribed() {
                    state.queue.clear();
                    state.scheduled = false;
                    return;
                }
                match state.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        state.scheduled = false;
                        return;
                    }
                }
            };
            let _ = event.accept(&self.child);
        }
    }
}

// The stage is shared with the scheduled drain job, so the observer seat
// holds it behind an Arc.
struct HandoffObserver<T> {
    stage: Arc<ObserveOnStage<T>>,
}

impl<T: Send + Sync + 'static> Observer<T> for HandoffObserver<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.stage.enqueue(Notification::Next(value))
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.stage.enqueue(Notification::Error(err))
    }

    fn on_completed(&self) -> Result<()> {
        self.stage.enqueue(Notification::Completed)
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn observe_on<T>(source: &Observable<T>, scheduler: &SchedulerRef) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    let scheduler = scheduler.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let pending = SerialSubscription::new();
        child.add(pending.handle());
        let stage = Arc::new(ObserveOnStage {
            child: child.clone(),
            scheduler: scheduler.clone(),
            pending,
            reschedule: Mutex::new(()),
            state: Mutex::new(HandoffState {
                queue: VecDeque::new(),
                scheduled: false,
            }),
        });
        let parent = Subscriber::with_shared(
            Arc::new(HandoffObserver { stage }),
            child.composite().clone(),
        );
        source.unsafe_subscribe(&parent)
    })
}
