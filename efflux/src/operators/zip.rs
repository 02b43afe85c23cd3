// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Strict positional pairing of two sequences.
//!
//! The i-th output is produced only once both inputs delivered their i-th
//! value. The result completes as soon as an input has completed with an
//! empty queue; buffered leftovers of the other input are discarded. An
//! input completing while its queue still holds values keeps pairing
//! until that queue drains.

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct ZipState<A, B> {
    left: VecDeque<A>,
    right: VecDeque<B>,
    left_done: bool,
    right_done: bool,
    emitting: bool,
    terminated: bool,
}

enum Step<A, B> {
    Pair(A, B),
    Complete,
    Idle,
}

struct ZipCoordinator<A, B, C> {
    child: Subscriber<C>,
    combiner: Arc<dyn Fn(A, B) -> Result<C> + Send + Sync>,
    state: Mutex<ZipState<A, B>>,
}

impl<A, B, C> ZipCoordinator<A, B, C>
where
    A: Send + Sync,
    B: Send + Sync,
    C: Send + Sync,
{
    // Single-drainer loop: pairs are popped and delivered by one thread
    // at a time, which keeps output order aligned with input order.
    fn drain(&self) -> Result<()> {
        loop {
            let step = {
                let mut state = self.state.lock();
                if state.emitting || state.terminated {
                    return Ok(());
                }
                match (state.left.pop_front(), state.right.pop_front()) {
                    (Some(a), Some(b)) => {
                        state.emitting = true;
                        Step::Pair(a, b)
                    }
                    (a, b) => {
                        if let Some(a) = a {
                            state.left.push_front(a);
                        }
                        if let Some(b) = b {
                            state.right.push_front(b);
                        }
                        let exhausted = (state.left_done && state.left.is_empty())
                            || (state.right_done && state.right.is_empty());
                        if exhausted {
                            state.terminated = true;
                            Step::Complete
                        } else {
                            Step::Idle
                        }
                    }
                }
            };

            match step {
                Step::Pair(a, b) => {
                    match (self.combiner)(a, b) {
                        Ok(combined) => self.child.on_next(combined)?,
                        Err(err) => {
                            self.state.lock().terminated = true;
                            return self.child.on_error(err);
                        }
                    }
                    self.state.lock().emitting = false;
                }
                Step::Complete => return self.child.on_completed(),
                Step::Idle => return Ok(()),
            }
        }
    }

    fn errored(&self, err: EffluxError) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.terminated {
                return Ok(());
            }
            state.terminated = true;
        }
        self.child.on_error(err)
    }
}

struct LeftStage<A, B, C> {
    coordinator: Arc<ZipCoordinator<A, B, C>>,
}

impl<A, B, C> Observer<A> for LeftStage<A, B, C>
where
    A: Send + Sync,
    B: Send + Sync,
    C: Send + Sync,
{
    fn on_next(&self, value: A) -> Result<()> {
        {
            let mut state = self.coordinator.state.lock();
            if state.terminated {
                return Ok(());
            }
            state.left.push_back(value);
        }
        self.coordinator.drain()
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.coordinator.errored(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.coordinator.state.lock().left_done = true;
        self.coordinator.drain()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct RightStage<A, B, C> {
    coordinator: Arc<ZipCoordinator<A, B, C>>,
}

impl<A, B, C> Observer<B> for RightStage<A, B, C>
where
    A: Send + Sync,
    B: Send + Sync,
    C: Send + Sync,
{
    fn on_next(&self, value: B) -> Result<()> {
        {
            let mut state = self.coordinator.state.lock();
            if state.terminated {
                return Ok(());
            }
            state.right.push_back(value);
        }
        self.coordinator.drain()
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.coordinator.errored(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.coordinator.state.lock().right_done = true;
        self.coordinator.drain()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn zip<A, B, C, F>(a: Observable<A>, b: Observable<B>, combiner: F) -> Observable<C>
where
    A: Send + Sync + 'static,
    B: Send + Sync + 'static,
    C: Send + Sync + 'static,
    F: Fn(A, B) -> Result<C> + Send + Sync + 'static,
{
    let combiner: Arc<dyn Fn(A, B) -> Result<C> + Send + Sync> = Arc::new(combiner);
    Observable::new(move |child: &Subscriber<C>| {
        let coordinator = Arc::new(ZipCoordinator {
            child: child.clone(),
            combiner: combiner.clone(),
            state: Mutex::new(ZipState {
                left: VecDeque::new(),
                right: VecDeque::new(),
                left_done: false,
                right_done: false,
                emitting: false,
                terminated: false,
            }),
        });

        let left = Arc::new(LeftStage {
            coordinator: coordinator.clone(),
        });
        let left_parent = Subscriber::with_shared(left, child.composite().clone());
        let left_subscription = a.unsafe_subscribe(&left_parent)?;
        child.add(left_subscription);

        let right = Arc::new(RightStage {
            coordinator: coordinator.clone(),
        });
        let right_parent = Subscriber::with_shared(right, child.composite().clone());
        let right_subscription = b.unsafe_subscribe(&right_parent)?;
        child.add(right_subscription);

        Ok(efflux_core::empty())
    })
}
