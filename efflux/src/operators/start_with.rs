// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{empty as empty_subscription, Observer, Subscription};

pub(crate) fn start_with<T>(source: &Observable<T>, values: Vec<T>) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        for value in values.iter().cloned() {
            if child.is_unsubscribed() {
                return Ok(empty_subscription());
            }
            child.on_next(value)?;
        }
        source.unsafe_subscribe(child)
    })
}
