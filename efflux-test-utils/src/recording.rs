// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux_core::{EffluxError, Notification, Observer, ObserverRef, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

struct Recorded<T> {
    events: Vec<Notification<T>>,
    terminated: bool,
}

/// Observer that records every event it receives.
///
/// Cloning is cheap; all clones share the same log. Waiting helpers block
/// on a condvar with a timeout, so asynchronous producers can be asserted
/// against without sleeps.
pub struct RecordingObserver<T> {
    state: Arc<(Mutex<Recorded<T>>, Condvar)>,
}

impl<T> Clone for RecordingObserver<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> Default for RecordingObserver<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RecordingObserver<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new((
                Mutex::new(Recorded {
                    events: Vec::new(),
                    terminated: false,
                }),
                Condvar::new(),
            )),
        }
    }

    fn record(&self, event: Notification<T>) {
        let (lock, condvar) = &*self.state;
        let mut recorded = lock.lock();
        if event.is_terminal() {
            recorded.terminated = true;
        }
        recorded.events.push(event);
        condvar.notify_all();
    }

    /// Number of `on_next` events received so far.
    #[must_use]
    pub fn value_count(&self) -> usize {
        let (lock, _) = &*self.state;
        lock.lock().events.iter().filter(|e| e.is_next()).count()
    }

    /// Whether a terminal event has been received.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        let (lock, _) = &*self.state;
        lock.lock().terminated
    }

    /// Whether the sequence completed normally.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        let (lock, _) = &*self.state;
        lock.lock().events.iter().any(Notification::is_completed)
    }

    /// The terminal error, if one arrived.
    #[must_use]
    pub fn error(&self) -> Option<EffluxError> {
        let (lock, _) = &*self.state;
        lock.lock().events.iter().find_map(|e| match e {
            Notification::Error(err) => Some(err.clone()),
            _ => None,
        })
    }

    /// Block until a terminal event arrives; `false` on timeout.
    #[must_use]
    pub fn wait_for_terminal(&self, timeout: Duration) -> bool {
        let (lock, condvar) = &*self.state;
        let mut recorded = lock.lock();
        while !recorded.terminated {
            if condvar.wait_for(&mut recorded, timeout).timed_out() {
                return recorded.terminated;
            }
        }
        true
    }

    /// Block until at least `count` values arrived; `false` on timeout.
    #[must_use]
    pub fn wait_for_values(&self, count: usize, timeout: Duration) -> bool {
        let (lock, condvar) = &*self.state;
        let mut recorded = lock.lock();
        loop {
            let seen = recorded.events.iter().filter(|e| e.is_next()).count();
            if seen >= count {
                return true;
            }
            if condvar.wait_for(&mut recorded, timeout).timed_out() {
                return recorded.events.iter().filter(|e| e.is_next()).count() >= count;
            }
        }
    }
}

impl<T: Clone> RecordingObserver<T> {
    /// Every event received so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<Notification<T>> {
        let (lock, _) = &*self.state;
        lock.lock().events.clone()
    }

    /// The `on_next` payloads received so far, in order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        let (lock, _) = &*self.state;
        lock.lock()
            .events
            .iter()
            .filter_map(|e| match e {
                Notification::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }
}

impl<T: Send + Sync + 'static> RecordingObserver<T> {
    /// A shared observer handle for `subscribe`.
    #[must_use]
    pub fn observer_ref(&self) -> ObserverRef<T> {
        Arc::new(self.clone())
    }
}

impl<T: Send + Sync> Observer<T> for RecordingObserver<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.record(Notification::Next(value));
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.record(Notification::Error(err));
        Ok(())
    }

    fn on_completed(&self) -> Result<()> {
        self.record(Notification::Completed);
        Ok(())
    }
}
