// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{from_action, Observer, SerialSubscription, Subscription};
use efflux_sched::SchedulerRef;

// Defers the subscribe call itself to the scheduler. The worker links the
// upstream subscription into the downstream composite through an action
// that re-enters the scheduler on disposal, so unsubscription also runs
// on the scheduler.
pub(crate) fn subscribe_on<T>(source: &Observable<T>, scheduler: &SchedulerRef) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    let scheduler = scheduler.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let serial = SerialSubscription::new();
        let source = source.clone();
        let scheduler_for_unsubscribe = scheduler.clone();
        let worker_child = child.clone();
        let unit = scheduler.schedule(Box::new(move || {
            if worker_child.is_unsubscribed() {
                return;
            }
            match source.unsafe_subscribe(&worker_child) {
                Ok(upstream) => {
                    let scheduler = scheduler_for_unsubscribe.clone();
                    worker_child.add(from_action(move || {
                        scheduler.schedule(Box::new(move || upstream.unsubscribe()));
                    }));
                }
                Err(err) => {
                    let _ = worker_child.on_error(err);
                }
            }
        }));
        serial.set(unit);
        Ok(serial.handle())
    })
}
