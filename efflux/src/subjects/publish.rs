// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::serialized::SerializedObserver;
use crate::subjects::{Subject, TerminalEvent};
use efflux_core::{
    empty as empty_subscription, from_action, EffluxError, Observer, ObserverRef, Result,
};
use parking_lot::Mutex;
use std::sync::Arc;

struct Registered<T> {
    id: u64,
    observer: ObserverRef<T>,
}

struct PublishState<T> {
    observers: Vec<Registered<T>>,
    terminal: Option<TerminalEvent>,
    next_id: u64,
}

struct PublishInner<T> {
    state: Mutex<PublishState<T>>,
}

// Fan-out core: snapshots the registry under the lock, delivers outside it.
struct FanOut<T> {
    inner: Arc<PublishInner<T>>,
}

impl<T> FanOut<T> {
    fn snapshot(&self) -> Option<Vec<ObserverRef<T>>> {
        let state = self.inner.state.lock();
        if state.terminal.is_some() {
            return None;
        }
        Some(state.observers.iter().map(|r| r.observer.clone()).collect())
    }

    fn terminate(&self, terminal: TerminalEvent) -> Option<Vec<ObserverRef<T>>> {
        let mut state = self.inner.state.lock();
        if state.terminal.is_some() {
            return None;
        }
        state.terminal = Some(terminal);
        Some(
            state
                .observers
                .drain(..)
                .map(|r| r.observer)
                .collect::<Vec<_>>(),
        )
    }
}

impl<T: Clone + Send + Sync> Observer<T> for FanOut<T> {
    fn on_next(&self, value: T) -> Result<()> {
        if let Some(targets) = self.snapshot() {
            for target in targets {
                let _ = target.on_next(value.clone());
            }
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        if let Some(targets) = self.terminate(TerminalEvent::Error(err.clone())) {
            for target in targets {
                let _ = target.on_error(err.clone());
            }
        }
        Ok(())
    }

    fn on_completed(&self) -> Result<()> {
        if let Some(targets) = self.terminate(TerminalEvent::Completed) {
            for target in targets {
                let _ = target.on_completed();
            }
        }
        Ok(())
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Hot fan-out subject: subscribers receive only events pushed after they
/// subscribed.
///
/// Inbound delivery is serialized, so concurrent producers cannot
/// interleave events, and every subscriber sees the same order. Once a
/// terminal event is pushed it is latched: later subscribers receive it
/// immediately on subscribe.
pub struct PublishSubject<T: Send + Sync + 'static> {
    inner: Arc<PublishInner<T>>,
    inbound: Arc<SerializedObserver<T>>,
}

impl<T: Clone + Send + Sync + 'static> PublishSubject<T> {
    /// A subject with no subscribers and no latched terminal.
    #[must_use]
    pub fn new() -> Self {
        let inner = Arc::new(PublishInner {
            state: Mutex::new(PublishState {
                observers: Vec::new(),
                terminal: None,
                next_id: 0,
            }),
        });
        let fan_out: ObserverRef<T> = Arc::new(FanOut {
            inner: inner.clone(),
        });
        Self {
            inner,
            inbound: Arc::new(SerializedObserver::new(fan_out)),
        }
    }

    /// Number of currently subscribed observers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().observers.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for PublishSubject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> Clone for PublishSubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            inbound: self.inbound.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observer<T> for PublishSubject<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.inbound.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.inbound.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.inbound.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> for PublishSubject<T> {
    fn observable(&self) -> Observable<T> {
        let inner = self.inner.clone();
        Observable::new(move |subscriber| {
            let observer: ObserverRef<T> = Arc::new(subscriber.clone());
            let latched = {
                let mut state = inner.state.lock();
                match state.terminal.clone() {
                    Some(terminal) => Some(terminal),
                    None => {
                        let id = state.next_id;
                        state.next_id += 1;
                        state.observers.push(Registered { id, observer });
                        // The removal closure references the subject weakly,
                        // breaking the subject/subscriber cycle.
                        let weak = Arc::downgrade(&inner);
                        return Ok(from_action(move || {
                            if let Some(inner) = weak.upgrade() {
                                inner.state.lock().observers.retain(|r| r.id != id);
                            }
                        }));
                    }
                }
            };
            if let Some(terminal) = latched {
                terminal.deliver(observer.as_ref())?;
            }
            Ok(empty_subscription())
        })
    }
}
