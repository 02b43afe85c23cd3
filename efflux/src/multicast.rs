// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Sharing one upstream subscription among many observers.
//!
//! A [`ConnectableObservable`] routes subscribers to a subject without
//! touching the upstream; [`connect`](ConnectableObservable::connect)
//! subscribes the subject to the upstream exactly once until the
//! connection is disposed. Disposing it resets the epoch: the next
//! `connect` builds a fresh subject from the factory and re-subscribes.
//! Subscribers from a previous epoch stay on their old subject.
//!
//! `cache` is the connect-once, never-disconnect variant built on an
//! unbounded replay subject.

use crate::observable::Observable;
use crate::subjects::{ReplaySubject, Subject};
use efflux_core::{from_action, EffluxError, Observer, ObserverRef, Result, Subscription, SubscriptionRef};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type SubjectRef<T> = Arc<dyn Subject<T>>;

// Adapter feeding upstream events into the subject; marked safe so the
// subscribe dispatch does not re-wrap the relay.
struct SubjectObserver<T: Send + Sync + 'static> {
    subject: SubjectRef<T>,
}

impl<T: Send + Sync + 'static> Observer<T> for SubjectObserver<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.subject.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.subject.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.subject.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct MulticastState<T: Send + Sync + 'static> {
    subject: Option<SubjectRef<T>>,
    connection: Option<SubscriptionRef>,
}

/// A stream whose upstream subscription is deferred until `connect`.
pub struct ConnectableObservable<T: Send + Sync + 'static> {
    source: Observable<T>,
    factory: Arc<dyn Fn() -> SubjectRef<T> + Send + Sync>,
    state: Arc<Mutex<MulticastState<T>>>,
    // Serializes concurrent connect calls.
    connect_lock: Arc<Mutex<()>>,
}

impl<T: Send + Sync + 'static> Clone for ConnectableObservable<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            factory: self.factory.clone(),
            state: self.state.clone(),
            connect_lock: self.connect_lock.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> ConnectableObservable<T> {
    fn current_subject(&self) -> SubjectRef<T> {
        let mut state = self.state.lock();
        match &state.subject {
            Some(subject) => subject.clone(),
            None => {
                let subject = (*self.factory)();
                state.subject = Some(subject.clone());
                subject
            }
        }
    }

    /// The subscriber-facing side: attaches observers to the current
    /// epoch's subject without subscribing the upstream.
    pub fn observable(&self) -> Observable<T> {
        let connectable = self.clone();
        Observable::new(move |subscriber| {
            connectable
                .current_subject()
                .observable()
                .unsafe_subscribe(subscriber)
        })
    }

    /// Subscribe an observer to the current epoch's subject.
    pub fn subscribe(&self, observer: ObserverRef<T>) -> SubscriptionRef {
        self.observable().subscribe(observer)
    }

    /// Subscribe the subject to the upstream, once per epoch.
    ///
    /// While a connection is live, further calls return the existing
    /// handle. Disposing the handle unsubscribes the upstream and resets
    /// the epoch so a later `connect` starts afresh.
    pub fn connect(&self) -> SubscriptionRef {
        let _guard = self.connect_lock.lock();
        {
            let state = self.state.lock();
            if let Some(connection) = &state.connection {
                if !connection.is_unsubscribed() {
                    return connection.clone();
                }
            }
        }

        let subject = self.current_subject();
        let relay: ObserverRef<T> = Arc::new(SubjectObserver { subject });
        let upstream = self.source.subscribe(relay);

        let state_handle = self.state.clone();
        let upstream_handle = upstream.clone();
        let connection = from_action(move || {
            upstream_handle.unsubscribe();
            let mut state = state_handle.lock();
            state.subject = None;
            state.connection = None;
        });
        self.state.lock().connection = Some(connection.clone());
        connection
    }
}

pub(crate) fn multicast<T, S, F>(source: &Observable<T>, factory: F) -> ConnectableObservable<T>
where
    T: Send + Sync + 'static,
    S: Subject<T> + Send + Sync + 'static,
    F: Fn() -> S + Send + Sync + 'static,
{
    ConnectableObservable {
        source: source.clone(),
        factory: Arc::new(move || Arc::new(factory()) as SubjectRef<T>),
        state: Arc::new(Mutex::new(MulticastState {
            subject: None,
            connection: None,
        })),
        connect_lock: Arc::new(Mutex::new(())),
    }
}

pub(crate) fn cache<T>(source: &Observable<T>) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    let source = source.clone();
    let subject = ReplaySubject::unbounded();
    let connected = Arc::new(AtomicBool::new(false));
    Observable::new(move |subscriber| {
        // Register before the first connect so the triggering subscriber
        // cannot miss synchronous emissions.
        let subscription = subject.observable().unsafe_subscribe(subscriber)?;
        if !connected.swap(true, Ordering::AcqRel) {
            let relay: ObserverRef<T> = Arc::new(subject.clone());
            // The upstream subscription lives for the cache's lifetime.
            let _ = source.subscribe(relay);
        }
        Ok(subscription)
    })
}
