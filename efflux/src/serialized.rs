// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Serialized event delivery.
//!
//! A [`SerializedObserver`] lets any number of threads push events while
//! the downstream observer sees them one at a time, in arrival order.
//! Events are queued under a short-held lock; whichever thread finds the
//! emitter flag clear becomes the drainer and delivers queued events with
//! the lock released, so downstream callbacks never run under the lock
//! and never interleave. Reentrant pushes from inside a downstream
//! callback are queued and drained by the same loop instead of recursing.

use efflux_core::{EffluxError, Notification, Observer, ObserverRef, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;

struct SerializeState<T> {
    queue: VecDeque<Notification<T>>,
    emitting: bool,
    // Set once a terminal event is queued; everything after is dropped.
    done: bool,
}

/// Wrapper forcing serialized, non-reentrant delivery.
pub struct SerializedObserver<T> {
    downstream: ObserverRef<T>,
    state: Mutex<SerializeState<T>>,
}

impl<T: Send + Sync> SerializedObserver<T> {
    /// Serialize delivery to the given downstream observer.
    #[must_use]
    pub fn new(downstream: ObserverRef<T>) -> Self {
        Self {
            downstream,
            state: Mutex::new(SerializeState {
                queue: VecDeque::new(),
                emitting: false,
                done: false,
            }),
        }
    }

    fn push(&self, event: Notification<T>) {
        let is_terminal = event.is_terminal();
        {
            let mut state = self.state.lock();
            if state.done {
                drop(state);
                // A second terminal error still reaches the side-band hook.
                if let Notification::Error(err) = event {
                    efflux_core::hooks::hooks().handle_error(&err);
                }
                return;
            }
            if is_terminal {
                state.done = true;
            }
            state.queue.push_back(event);
            if state.emitting {
                return;
            }
            state.emitting = true;
        }
        self.drain();
    }

    fn drain(&self) {
        loop {
            let event = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(event) => event,
                    None => {
                        state.emitting = false;
                        return;
                    }
                }
            };
            // Downstream is the safety layer (or another stage); its
            // faults are handled there, not here.
            let _ = event.accept(self.downstream.as_ref());
        }
    }
}

impl<T: Send + Sync> Observer<T> for SerializedObserver<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.push(Notification::Next(value));
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.push(Notification::Error(err));
        Ok(())
    }

    fn on_completed(&self) -> Result<()> {
        self.push(Notification::Completed);
        Ok(())
    }

    fn is_safe(&self) -> bool {
        true
    }
}
