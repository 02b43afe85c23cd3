// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Source constructors: observables built from plain values, iterators,
//! ranges, channel receivers and deferred factories.
//!
//! Every source checks for cancellation between emissions, so a consumer
//! that unsubscribes mid-sequence stops the producer at the next step.

use crate::observable::Observable;
use efflux_core::{empty as empty_subscription, EffluxError, Observer, Subscription};
use parking_lot::Mutex;
use std::sync::mpsc::Receiver;

pub(crate) fn just<T>(value: T) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    Observable::new(move |subscriber| {
        if !subscriber.is_unsubscribed() {
            subscriber.on_next(value.clone())?;
            subscriber.on_completed()?;
        }
        Ok(empty_subscription())
    })
}

pub(crate) fn from_iter<T, I>(items: I) -> Observable<T>
where
    T: Send + Sync + 'static,
    I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
{
    Observable::new(move |subscriber| {
        for item in items.clone() {
            if subscriber.is_unsubscribed() {
                return Ok(empty_subscription());
            }
            subscriber.on_next(item)?;
        }
        if !subscriber.is_unsubscribed() {
            subscriber.on_completed()?;
        }
        Ok(empty_subscription())
    })
}

pub(crate) fn range(start: i64, count: u64) -> Observable<i64> {
    Observable::new(move |subscriber| {
        let mut current = start;
        for _ in 0..count {
            if subscriber.is_unsubscribed() {
                return Ok(empty_subscription());
            }
            subscriber.on_next(current)?;
            current += 1;
        }
        if !subscriber.is_unsubscribed() {
            subscriber.on_completed()?;
        }
        Ok(empty_subscription())
    })
}

pub(crate) fn empty<T>() -> Observable<T>
where
    T: Send + Sync + 'static,
{
    Observable::new(|subscriber| {
        subscriber.on_completed()?;
        Ok(empty_subscription())
    })
}

pub(crate) fn never<T>() -> Observable<T>
where
    T: Send + Sync + 'static,
{
    Observable::new(|_subscriber| Ok(empty_subscription()))
}

pub(crate) fn error<T>(err: EffluxError) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    Observable::new(move |subscriber| {
        subscriber.on_error(err.clone())?;
        Ok(empty_subscription())
    })
}

pub(crate) fn defer<T, F>(factory: F) -> Observable<T>
where
    T: Send + Sync + 'static,
    F: Fn() -> crate::Result<Observable<T>> + Send + Sync + 'static,
{
    Observable::new(move |subscriber| {
        let source = factory()?;
        source.unsafe_subscribe(subscriber)
    })
}

/// Drains a standard channel receiver on the subscribing thread.
///
/// The receiver can feed exactly one subscription; a second subscriber
/// receives an argument error. Draining blocks the subscribing thread
/// until the channel closes; use `subscribe_on` to move the drain onto a
/// scheduler.
pub(crate) fn from_receiver<T>(receiver: Receiver<T>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let slot = Mutex::new(Some(receiver));
    Observable::new(move |subscriber| {
        let Some(receiver) = slot.lock().take() else {
            return Err(EffluxError::argument_error(
                "receiver already drained by an earlier subscriber",
            ));
        };
        while let Ok(item) = receiver.recv() {
            if subscriber.is_unsubscribed() {
                return Ok(empty_subscription());
            }
            subscriber.on_next(item)?;
        }
        if !subscriber.is_unsubscribed() {
            subscriber.on_completed()?;
        }
        Ok(empty_subscription())
    })
}
