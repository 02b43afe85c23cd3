// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Combine the most recent value of each input.
//!
//! Once every input has produced at least one value, any further emission
//! from either side produces one combined output holding the latest pair.
//! Combined snapshots are queued under the state lock and delivered by a
//! single-drainer loop, so output order follows snapshot order even when
//! the inputs emit from different threads.

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct LatestState<A, B> {
    left: Option<A>,
    right: Option<B>,
    left_done: bool,
    right_done: bool,
    pending: VecDeque<(A, B)>,
    emitting: bool,
    terminated: bool,
}

enum Step<A, B> {
    Pair(A, B),
    Complete,
    Idle,
}

struct CombineCoordinator<A, B, C> {
    child: Subscriber<C>,
    combiner: Arc<dyn Fn(A, B) -> Result<C> + Send + Sync>,
    state: Mutex<LatestState<A, B>>,
}

impl<A, B, C> CombineCoordinator<A, B, C>
where
    A: Clone + Send + Sync,
    B: Clone + Send + Sync,
    C: Send + Sync,
{
    fn drain(&self) -> Result<()> {
        loop {
            let step = {
                let mut state = self.state.lock();
                if state.emitting || state.terminated {
                    return Ok(());
                }
                match state.pending.pop_front() {
                    Some((a, b)) => {
                        state.emitting = true;
                        Step::Pair(a, b)
                    }
                    None => {
                        if state.left_done && state.right_done {
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
    coordinator: Arc<CombineCoordinator<A, B, C>>,
}

impl<A, B, C> Observer<A> for LeftStage<A, B, C>
where
    A: Clone + Send + Sync,
    B: Clone + Send + Sync,
    C: Send + Sync,
{
    fn on_next(&self, value: A) -> Result<()> {
        {
            let mut state = self.coordinator.state.lock();
            if state.terminated {
                return Ok(());
            }
            state.left = Some(value.clone());
            if let Some(right) = state.right.clone() {
                state.pending.push_back((value, right));
            }
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
    coordinator: Arc<CombineCoordinator<A, B, C>>,
}

impl<A, B, C> Observer<B> for RightStage<A, B, C>
where
    A: Clone + Send + Sync,
    B: Clone + Send + Sync,
    C: Send + Sync,
{
    fn on_next(&self, value: B) -> Result<()> {
        {
            let mut state = self.coordinator.state.lock();
            if state.terminated {
                return Ok(());
            }
            state.right = Some(value.clone());
            if let Some(left) = state.left.clone() {
                state.pending.push_back((left, value));
            }
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

pub(crate) fn combine_latest<A, B, C, F>(
    a: Observable<A>,
    b: Observable<B>,
    combiner: F,
) -> Observable<C>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Send + Sync + 'static,
    F: Fn(A, B) -> Result<C> + Send + Sync + 'static,
{
    let combiner: Arc<dyn Fn(A, B) -> Result<C> + Send + Sync> = Arc::new(combiner);
    Observable::new(move |child: &Subscriber<C>| {
        let coordinator = Arc::new(CombineCoordinator {
            child: child.clone(),
            combiner: combiner.clone(),
            state: Mutex::new(LatestState {
                left: None,
                right: None,
                left_done: false,
                right_done: false,
                pending: VecDeque::new(),
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
