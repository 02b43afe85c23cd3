// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Grouping operators: collect values into lists and emit each list
//! atomically when it closes.
//!
//! Closing policies: element count (with optional overlap via `skip`),
//! elapsed interval, interval-or-count, shifted overlapping windows, and
//! opening/closing boundary observables. Interval-driven closes may emit
//! empty lists; the trailing partial list at upstream completion is
//! emitted only when non-empty. Time-based variants serialize downstream
//! delivery because ticks and upstream values arrive on different
//! threads.

use crate::observable::Observable;
use crate::serialized::SerializedObserver;
use crate::subscriber::Subscriber;
use efflux_core::{
    CompositeSubscription, EffluxError, Observer, ObserverRef, Result, SerialSubscription,
    Subscription,
};
use efflux_sched::{schedule_periodic, SchedulerRef};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ---- count / count+skip -----------------------------------------------

struct CountState<T> {
    chunks: VecDeque<Vec<T>>,
    index: usize,
}

struct CountBufferStage<T> {
    child: Subscriber<Vec<T>>,
    count: usize,
    skip: usize,
    state: Mutex<CountState<T>>,
}

impl<T: Clone + Send + Sync> Observer<T> for CountBufferStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let ready = {
            let mut state = self.state.lock();
            if state.index % self.skip == 0 {
                state.chunks.push_back(Vec::with_capacity(self.count));
            }
            state.index += 1;
            for chunk in state.chunks.iter_mut() {
                chunk.push(value.clone());
            }
            let mut ready = Vec::new();
            while state
                .chunks
                .front()
                .is_some_and(|chunk| chunk.len() >= self.count)
            {
                if let Some(chunk) = state.chunks.pop_front() {
                    ready.push(chunk);
                }
            }
            ready
        };
        for chunk in ready {
            self.child.on_next(chunk)?;
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.state.lock().chunks.clear();
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        let remaining: Vec<Vec<T>> = self.state.lock().chunks.drain(..).collect();
        for chunk in remaining {
            if !chunk.is_empty() {
                self.child.on_next(chunk)?;
            }
        }
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn with_count<T>(source: &Observable<T>, count: usize, skip: usize) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<Vec<T>>| {
        if count == 0 || skip == 0 {
            return Err(EffluxError::argument_error(
                "buffer count and skip must be positive",
            ));
        }
        let stage = Arc::new(CountBufferStage {
            child: child.clone(),
            count,
            skip,
            state: Mutex::new(CountState {
                chunks: VecDeque::new(),
                index: 0,
            }),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}

// ---- timespan / timespan+count ----------------------------------------

struct IntervalState<T> {
    current: Vec<T>,
    done: bool,
}

struct IntervalBufferStage<T> {
    out: Arc<SerializedObserver<Vec<T>>>,
    timer: SerialSubscription,
    max_count: Option<usize>,
    state: Mutex<IntervalState<T>>,
}

impl<T: Send + Sync> IntervalBufferStage<T> {
    fn tick(&self) {
        let chunk = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            std::mem::take(&mut state.current)
        };
        // Interval closes emit the chunk even when empty.
        let _ = self.out.on_next(chunk);
    }
}

impl<T: Send + Sync> Observer<T> for IntervalBufferStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let full = {
            let mut state = self.state.lock();
            if state.done {
                return Ok(());
            }
            state.current.push(value);
            match self.max_count {
                Some(count) if state.current.len() >= count => {
                    Some(std::mem::take(&mut state.current))
                }
                _ => None,
            }
        };
        if let Some(chunk) = full {
            self.out.on_next(chunk)?;
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        {
            let mut state = self.state.lock();
            state.done = true;
            state.current.clear();
        }
        self.timer.unsubscribe();
        self.out.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        let remaining = {
            let mut state = self.state.lock();
            state.done = true;
            std::mem::take(&mut state.current)
        };
        self.timer.unsubscribe();
        if !remaining.is_empty() {
            self.out.on_next(remaining)?;
        }
        self.out.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn with_time<T>(
    source: &Observable<T>,
    timespan: Duration,
    scheduler: &SchedulerRef,
) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    interval_impl(source, timespan, None, scheduler)
}

pub(crate) fn with_time_or_count<T>(
    source: &Observable<T>,
    timespan: Duration,
    count: usize,
    scheduler: &SchedulerRef,
) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    interval_impl(source, timespan, Some(count), scheduler)
}

fn interval_impl<T>(
    source: &Observable<T>,
    timespan: Duration,
    max_count: Option<usize>,
    scheduler: &SchedulerRef,
) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let source = source.clone();
    let scheduler = scheduler.clone();
    Observable::new(move |child: &Subscriber<Vec<T>>| {
        if timespan.is_zero() {
            return Err(EffluxError::argument_error(
                "buffer timespan must be positive",
            ));
        }
        if max_count == Some(0) {
            return Err(EffluxError::argument_error("buffer count must be positive"));
        }
        let timer = SerialSubscription::new();
        child.add(timer.handle());
        let stage = Arc::new(IntervalBufferStage {
            out: Arc::new(SerializedObserver::new(
                Arc::new(child.clone()) as ObserverRef<Vec<T>>
            )),
            timer: timer.clone(),
            max_count,
            state: Mutex::new(IntervalState {
                current: Vec::new(),
                done: false,
            }),
        });
        let tick_stage = stage.clone();
        timer.set(schedule_periodic(&scheduler, timespan, timespan, move || {
            tick_stage.tick();
        }));
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}

// ---- overlapping chunks (timeshift / boundaries) ----------------------

struct MultiState<T> {
    chunks: VecDeque<(u64, Vec<T>)>,
    next_id: u64,
    done: bool,
}

struct MultiBufferStage<T> {
    out: Arc<SerializedObserver<Vec<T>>>,
    timers: CompositeSubscription,
    state: Mutex<MultiState<T>>,
}

impl<T: Clone + Send + Sync> MultiBufferStage<T> {
    fn open(&self) -> Option<u64> {
        let mut state = self.state.lock();
        if state.done {
            return None;
        }
        let id = state.next_id;
        state.next_id += 1;
        state.chunks.push_back((id, Vec::new()));
        Some(id)
    }

    fn close(&self, id: u64) {
        let chunk = {
            let mut state = self.state.lock();
            if state.done {
                return;
            }
            let position = state.chunks.iter().position(|(chunk_id, _)| *chunk_id == id);
            position.and_then(|position| state.chunks.remove(position))
        };
        if let Some((_, chunk)) = chunk {
            let _ = self.out.on_next(chunk);
        }
    }

    fn fail(&self, err: EffluxError) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.done {
                return Ok(());
            }
            state.done = true;
            state.chunks.clear();
        }
        self.timers.unsubscribe();
        self.out.on_error(err)
    }
}

impl<T: Clone + Send + Sync> Observer<T> for MultiBufferStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        let mut state = self.state.lock();
        if state.done {
            return Ok(());
        }
        for (_, chunk) in state.chunks.iter_mut() {
            chunk.push(value.clone());
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.fail(err)
    }

    fn on_completed(&self) -> Result<()> {
        let remaining: Vec<Vec<T>> = {
            let mut state = self.state.lock();
            state.done = true;
            state.chunks.drain(..).map(|(_, chunk)| chunk).collect()
        };
        self.timers.unsubscribe();
        for chunk in remaining {
            if !chunk.is_empty() {
                self.out.on_next(chunk)?;
            }
        }
        self.out.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn with_time_shifted<T>(
    source: &Observable<T>,
    timespan: Duration,
    timeshift: Duration,
    scheduler: &SchedulerRef,
) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
{
    let source = source.clone();
    let scheduler = scheduler.clone();
    Observable::new(move |child: &Subscriber<Vec<T>>| {
        if timespan.is_zero() || timeshift.is_zero() {
            return Err(EffluxError::argument_error(
                "buffer timespan and timeshift must be positive",
            ));
        }
        let timers = CompositeSubscription::new();
        child.add(timers.handle());
        let stage = Arc::new(MultiBufferStage {
            out: Arc::new(SerializedObserver::new(
                Arc::new(child.clone()) as ObserverRef<Vec<T>>
            )),
            timers: timers.clone(),
            state: Mutex::new(MultiState {
                chunks: VecDeque::new(),
                next_id: 0,
                done: false,
            }),
        });

        let open_with_deadline: Arc<dyn Fn() + Send + Sync> = {
            let stage = stage.clone();
            let scheduler = scheduler.clone();
            let timers = timers.clone();
            Arc::new(move || {
                if let Some(id) = stage.open() {
                    let close_stage = stage.clone();
                    let unit = scheduler
                        .schedule_delayed(Box::new(move || close_stage.close(id)), timespan);
                    timers.add(unit);
                }
            })
        };

        // First chunk opens immediately; later ones every timeshift.
        (*open_with_deadline)();
        let opener = open_with_deadline.clone();
        timers.add(schedule_periodic(
            &scheduler,
            timeshift,
            timeshift,
            move || (*opener)(),
        ));

        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}

// Closing observables fire once per opened chunk; the first event of any
// kind closes it.
struct ClosingStage<T: Send + Sync + 'static, C> {
    stage: Arc<MultiBufferStage<T>>,
    id: u64,
    used: AtomicBool,
    _marker: std::marker::PhantomData<fn(C)>,
}

impl<T, C> ClosingStage<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: Send + Sync,
{
    fn fire(&self) {
        if !self.used.swap(true, Ordering::AcqRel) {
            self.stage.close(self.id);
        }
    }
}

impl<T, C> Observer<C> for ClosingStage<T, C>
where
    T: Clone + Send + Sync + 'static,
    C: Send + Sync,
{
    fn on_next(&self, _value: C) -> Result<()> {
        self.fire();
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.stage.fail(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.fire();
        Ok(())
    }

    fn is_safe(&self) -> bool {
        true
    }
}

struct OpeningStage<T: Send + Sync + 'static, O, C> {
    stage: Arc<MultiBufferStage<T>>,
    child: Subscriber<Vec<T>>,
    closing_selector: Arc<dyn Fn(&O) -> Result<Observable<C>> + Send + Sync>,
}

impl<T, O, C> Observer<O> for OpeningStage<T, O, C>
where
    T: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    fn on_next(&self, opening: O) -> Result<()> {
        let closing = match (self.closing_selector)(&opening) {
            Ok(closing) => closing,
            Err(err) => return self.stage.fail(err),
        };
        let Some(id) = self.stage.open() else {
            return Ok(());
        };
        let closing_stage = Arc::new(ClosingStage {
            stage: self.stage.clone(),
            id,
            used: AtomicBool::new(false),
            _marker: std::marker::PhantomData,
        });
        let parent = Subscriber::with_shared(closing_stage, self.child.composite().clone());
        match closing.unsafe_subscribe(&parent) {
            Ok(subscription) => {
                self.child.add(subscription);
                Ok(())
            }
            Err(err) => self.stage.fail(err),
        }
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.stage.fail(err)
    }

    fn on_completed(&self) -> Result<()> {
        // No further chunks open; the upstream drives termination.
        Ok(())
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn with_boundaries<T, O, C, F>(
    source: &Observable<T>,
    openings: &Observable<O>,
    closing_selector: F,
) -> Observable<Vec<T>>
where
    T: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
    C: Send + Sync + 'static,
    F: Fn(&O) -> Result<Observable<C>> + Send + Sync + 'static,
{
    let source = source.clone();
    let openings = openings.clone();
    let closing_selector: Arc<dyn Fn(&O) -> Result<Observable<C>> + Send + Sync> =
        Arc::new(closing_selector);
    Observable::new(move |child: &Subscriber<Vec<T>>| {
        let stage = Arc::new(MultiBufferStage {
            out: Arc::new(SerializedObserver::new(
                Arc::new(child.clone()) as ObserverRef<Vec<T>>
            )),
            timers: CompositeSubscription::new(),
            state: Mutex::new(MultiState {
                chunks: VecDeque::new(),
                next_id: 0,
                done: false,
            }),
        });

        let opening_stage = Arc::new(OpeningStage {
            stage: stage.clone(),
            child: child.clone(),
            closing_selector: closing_selector.clone(),
        });
        let opening_parent = Subscriber::with_shared(opening_stage, child.composite().clone());
        let opening_subscription = openings.unsafe_subscribe(&opening_parent)?;
        child.add(opening_subscription);

        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
