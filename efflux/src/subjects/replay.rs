// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subjects::{Subject, TerminalEvent};
use efflux_core::{from_action, EffluxError, Observer, ObserverRef, Result};
use efflux_sched::SchedulerRef;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

enum ReplayBound {
    Unbounded,
    Count(usize),
    Window(Duration, SchedulerRef),
}

struct Entry<T> {
    at: Duration,
    value: T,
}

// Per-subscriber drain cursor. `index` counts positions in the global
// sequence; `emitting` is true exactly while one thread delivers to this
// subscriber, which is what keeps replay and live events from
// interleaving or re-ordering.
struct SlotState {
    index: usize,
    emitting: bool,
    done: bool,
}

struct ReplaySlot<T> {
    observer: ObserverRef<T>,
    drain: Mutex<SlotState>,
}

struct ReplayState<T> {
    entries: VecDeque<Entry<T>>,
    // Global index of entries[0]; grows as bounded buffers trim.
    base: usize,
    terminal: Option<TerminalEvent>,
    subscribers: Vec<Arc<ReplaySlot<T>>>,
}

struct ReplayInner<T> {
    state: Mutex<ReplayState<T>>,
    bound: ReplayBound,
}

enum Step<T> {
    Value(T),
    Terminal(TerminalEvent),
}

impl<T: Clone + Send + Sync + 'static> ReplayInner<T> {
    fn clock(&self) -> Duration {
        match &self.bound {
            ReplayBound::Window(_, scheduler) => scheduler.now(),
            _ => Duration::ZERO,
        }
    }

    fn trim(&self, state: &mut ReplayState<T>, now: Duration) {
        match &self.bound {
            ReplayBound::Unbounded => {}
            ReplayBound::Count(capacity) => {
                while state.entries.len() > *capacity {
                    state.entries.pop_front();
                    state.base += 1;
                }
            }
            ReplayBound::Window(window, _) => {
                while state
                    .entries
                    .front()
                    .is_some_and(|entry| entry.at + *window < now)
                {
                    state.entries.pop_front();
                    state.base += 1;
                }
            }
        }
    }

    // Deliver everything the slot has not yet seen. One thread at a time
    // drains a given slot; concurrent pushers bail out and trust the
    // active drainer to pick up what they appended.
    fn drain(&self, slot: &Arc<ReplaySlot<T>>) {
        loop {
            let step = {
                let state = self.state.lock();
                let mut cursor = slot.drain.lock();
                if cursor.emitting || cursor.done {
                    return;
                }
                if cursor.index < state.base {
                    cursor.index = state.base;
                }
                let position = cursor.index - state.base;
                if position < state.entries.len() {
                    cursor.index += 1;
                    cursor.emitting = true;
                    Step::Value(state.entries[position].value.clone())
                } else if let Some(terminal) = state.terminal.clone() {
                    cursor.done = true;
                    cursor.emitting = true;
                    Step::Terminal(terminal)
                } else {
                    return;
                }
            };

            match step {
                Step::Value(value) => {
                    let _ = slot.observer.on_next(value);
                    slot.drain.lock().emitting = false;
                }
                Step::Terminal(terminal) => {
                    let _ = terminal.deliver(slot.observer.as_ref());
                    self.state
                        .lock()
                        .subscribers
                        .retain(|s| !Arc::ptr_eq(s, slot));
                    return;
                }
            }
        }
    }

    fn push(&self, value: T) {
        let slots = {
            let mut state = self.state.lock();
            if state.terminal.is_some() {
                return;
            }
            let now = self.clock();
            state.entries.push_back(Entry { at: now, value });
            self.trim(&mut state, now);
            state.subscribers.clone()
        };
        for slot in slots {
            self.drain(&slot);
        }
    }

    fn terminate(&self, terminal: TerminalEvent) {
        let slots = {
            let mut state = self.state.lock();
            if state.terminal.is_some() {
                return;
            }
            state.terminal = Some(terminal);
            state.subscribers.clone()
        };
        for slot in slots {
            self.drain(&slot);
        }
    }
}

/// Buffering fan-out subject: subscribers replay the buffered history in
/// order and then join the live stream with no gap and no reordering.
///
/// The buffer is unbounded by default, or bounded by count or by a time
/// window measured against a scheduler clock. The terminal event is
/// buffered too.
pub struct ReplaySubject<T: Send + Sync + 'static> {
    inner: Arc<ReplayInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> ReplaySubject<T> {
    /// Subject replaying its entire history.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::with_bound(ReplayBound::Unbounded)
    }

    /// Subject replaying at most the last `capacity` values.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "replay capacity must be at least 1");
        Self::with_bound(ReplayBound::Count(capacity))
    }

    /// Subject replaying the values pushed within the trailing window,
    /// measured against the given scheduler's clock.
    #[must_use]
    pub fn with_window(window: Duration, scheduler: SchedulerRef) -> Self {
        Self::with_bound(ReplayBound::Window(window, scheduler))
    }

    fn with_bound(bound: ReplayBound) -> Self {
        Self {
            inner: Arc::new(ReplayInner {
                state: Mutex::new(ReplayState {
                    entries: VecDeque::new(),
                    base: 0,
                    terminal: None,
                    subscribers: Vec::new(),
                }),
                bound,
            }),
        }
    }

    /// Number of values currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ReplaySubject<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T: Send + Sync + 'static> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Observer<T> for ReplaySubject<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.inner.push(value);
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.inner.terminate(TerminalEvent::Error(err));
        Ok(())
    }

    fn on_completed(&self) -> Result<()> {
        self.inner.terminate(TerminalEvent::Completed);
        Ok(())
    }

    fn is_safe(&self) -> bool {
        true
    }
}

impl<T: Clone + Send + Sync + 'static> Subject<T> for ReplaySubject<T> {
    fn observable(&self) -> Observable<T> {
        let inner = self.inner.clone();
        Observable::new(move |subscriber| {
            let slot = Arc::new(ReplaySlot {
                observer: Arc::new(subscriber.clone()) as ObserverRef<T>,
                drain: Mutex::new(SlotState {
                    index: 0,
                    emitting: false,
                    done: false,
                }),
            });
            inner.state.lock().subscribers.push(slot.clone());
            inner.drain(&slot);

            let weak = Arc::downgrade(&inner);
            let removal_slot = slot.clone();
            Ok(from_action(move || {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .state
                        .lock()
                        .subscribers
                        .retain(|s| !Arc::ptr_eq(s, &removal_slot));
                }
            }))
        })
    }
}
