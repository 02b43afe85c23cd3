// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The observable: an inert description of a push-based sequence.
//!
//! An [`Observable`] owns an on-subscribe function invoked once per
//! subscriber; each subscribe creates an independent execution whose
//! lifetime ends at the terminal event or at unsubscription, whichever
//! comes first. Operators never run anything at construction time; the
//! whole chain is walked when `subscribe` is called, each stage wrapping
//! the downstream observer and handing its subscription upward.
//!
//! # Examples
//!
//! ```
//! use efflux::Observable;
//!
//! let doubled = Observable::from_iter(vec![1, 2, 3])
//!     .map(|x| Ok(x * 2))
//!     .to_list();
//!
//! doubled.subscribe_next(|list| {
//!     assert_eq!(list, vec![2, 4, 6]);
//!     Ok(())
//! });
//! ```

use crate::multicast::{self, ConnectableObservable};
use crate::operators;
use crate::safety::SafeObserver;
use crate::serialized::SerializedObserver;
use crate::sources;
use crate::subjects::{PublishSubject, ReplaySubject, Subject};
use crate::subscriber::Subscriber;
use crate::Timestamped;
use efflux_core::hooks::hooks;
use efflux_core::{
    CompositeSubscription, EffluxError, FnObserver, Notification, Observer, ObserverRef, Result,
    SubscriptionRef,
};
use efflux_sched::SchedulerRef;
use std::cmp::Ordering;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

/// The producer function run once per subscriber.
///
/// Returning `Err` is the synchronous-failure path: the dispatch routes
/// the error to the subscriber's `on_error`.
pub type OnSubscribeFn<T> = dyn Fn(&Subscriber<T>) -> Result<SubscriptionRef> + Send + Sync;

/// An immutable description of a push-based sequence of `T`.
///
/// Cloning is cheap and shares the producer function; two subscribers
/// always get two independent executions unless the observable was
/// explicitly shared through [`publish`](Observable::publish),
/// [`replay`](Observable::replay) or [`cache`](Observable::cache).
pub struct Observable<T> {
    on_subscribe: Arc<OnSubscribeFn<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: self.on_subscribe.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> Observable<T> {
    /// Wrap a producer function.
    pub fn new<F>(on_subscribe: F) -> Self
    where
        F: Fn(&Subscriber<T>) -> Result<SubscriptionRef> + Send + Sync + 'static,
    {
        Self {
            on_subscribe: Arc::new(on_subscribe),
        }
    }

    /// Wrap a producer function. Alias of [`new`](Observable::new) for
    /// call sites that read better with the Rx vocabulary.
    pub fn create<F>(on_subscribe: F) -> Self
    where
        F: Fn(&Subscriber<T>) -> Result<SubscriptionRef> + Send + Sync + 'static,
    {
        Self::new(on_subscribe)
    }

    // ---- subscribe dispatch -------------------------------------------

    /// Subscribe an observer, returning the handle that cancels the
    /// execution.
    ///
    /// Observers that do not report [`is_safe`](Observer::is_safe) are
    /// wrapped in the serializing safety layer bound to this execution's
    /// composite subscription. A synchronous producer failure is routed
    /// to `on_error`; the composite is returned either way, after passing
    /// through the process-wide hooks.
    pub fn subscribe(&self, observer: ObserverRef<T>) -> SubscriptionRef {
        hooks().on_subscribe_start();
        let composite = CompositeSubscription::new();
        let target: ObserverRef<T> = if observer.is_safe() {
            observer
        } else {
            let safe = SafeObserver::new(observer, composite.handle());
            Arc::new(SerializedObserver::new(Arc::new(safe)))
        };
        let subscriber = Subscriber::with_shared(target, composite.clone());
        match (self.on_subscribe)(&subscriber) {
            Ok(subscription) => {
                composite.add(subscription);
                hooks().on_subscribe_return(composite.handle())
            }
            Err(err) => {
                let err = hooks().on_subscribe_error(err);
                if let Err(secondary) = subscriber.on_error(err) {
                    hooks().handle_error(&secondary);
                }
                composite.handle()
            }
        }
    }

    /// Subscribe with an `on_next` closure only.
    ///
    /// An error reaching this subscriber has no handler: it is reported
    /// to the process-wide hook and then propagated out of the emitting
    /// thread as a panic carrying the distinguished unhandled marker.
    pub fn subscribe_next<N>(&self, next: N) -> SubscriptionRef
    where
        N: Fn(T) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnObserver::from_next(next)))
    }

    /// Subscribe with `on_next` and `on_error` closures.
    pub fn subscribe_next_error<N, E>(&self, next: N, error: E) -> SubscriptionRef
    where
        N: Fn(T) -> Result<()> + Send + Sync + 'static,
        E: Fn(EffluxError) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnObserver::from_next_error(next, error)))
    }

    /// Subscribe with `on_next`, `on_error` and `on_completed` closures.
    pub fn subscribe_all<N, E, C>(&self, next: N, error: E, completed: C) -> SubscriptionRef
    where
        N: Fn(T) -> Result<()> + Send + Sync + 'static,
        E: Fn(EffluxError) -> Result<()> + Send + Sync + 'static,
        C: Fn() -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnObserver::from_all(next, error, completed)))
    }

    /// Run the producer against an existing subscriber, skipping the
    /// safety wrapper and hook dispatch.
    ///
    /// This is the operator-internal entry point; the subscriber's
    /// observer must already enforce the emission grammar.
    ///
    /// # Errors
    /// Propagates the producer's synchronous failure to the caller, which
    /// is expected to route it downstream.
    pub fn unsafe_subscribe(&self, subscriber: &Subscriber<T>) -> Result<SubscriptionRef> {
        (self.on_subscribe)(subscriber)
    }

    // ---- source constructors ------------------------------------------

    /// Emit one value, then complete.
    pub fn just(value: T) -> Self
    where
        T: Clone,
    {
        sources::just(value)
    }

    /// Emit every item of a collection in order, then complete.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        sources::from_iter(items)
    }

    /// Complete immediately without emitting.
    #[must_use]
    pub fn empty() -> Self {
        sources::empty()
    }

    /// Never emit and never terminate.
    #[must_use]
    pub fn never() -> Self {
        sources::never()
    }

    /// Terminate immediately with the given error.
    #[must_use]
    pub fn error(err: EffluxError) -> Self {
        sources::error(err)
    }

    /// Build a fresh observable for each subscriber at subscribe time.
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Observable<T>> + Send + Sync + 'static,
    {
        sources::defer(factory)
    }

    /// Drain a standard channel receiver on the subscribing thread,
    /// completing when the channel closes.
    ///
    /// Draining blocks the subscribing thread, the same caveat the
    /// original future-wrapping constructor carries; combine with
    /// [`subscribe_on`](Observable::subscribe_on) to move the drain onto
    /// a scheduler. The receiver feeds exactly one subscription.
    #[must_use]
    pub fn from_receiver(receiver: Receiver<T>) -> Self {
        sources::from_receiver(receiver)
    }

    // ---- transformation ------------------------------------------------

    /// Transform each value with a fallible selector.
    ///
    /// A selector failure terminates the sequence with `on_error` and
    /// disposes the upstream subscription.
    pub fn map<U, F>(&self, selector: F) -> Observable<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> Result<U> + Send + Sync + 'static,
    {
        operators::map::map(self, selector)
    }

    /// Map each value to an inner observable and merge their emissions.
    pub fn flat_map<U, F>(&self, selector: F) -> Observable<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> Result<Observable<U>> + Send + Sync + 'static,
    {
        operators::merge::merge_observable(&self.map(selector), false)
    }

    /// Keep only the values matching a fallible predicate.
    pub fn filter<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        operators::filter::filter(self, predicate)
    }

    /// Running accumulation without a seed; the first value passes
    /// through unchanged.
    pub fn scan<F>(&self, accumulator: F) -> Observable<T>
    where
        T: Clone,
        F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
    {
        operators::scan::scan(self, accumulator)
    }

    /// Running accumulation from a seed, emitting one accumulated value
    /// per upstream value.
    pub fn scan_seeded<U, F>(&self, seed: U, accumulator: F) -> Observable<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(U, T) -> Result<U> + Send + Sync + 'static,
    {
        operators::scan::scan_seeded(self, seed, accumulator)
    }

    /// Fold the sequence to its final accumulated value.
    pub fn reduce<F>(&self, accumulator: F) -> Observable<T>
    where
        T: Clone,
        F: Fn(T, T) -> Result<T> + Send + Sync + 'static,
    {
        self.scan(accumulator).take_last(1)
    }

    /// Fold the sequence from a seed to its final accumulated value.
    pub fn reduce_seeded<U, F>(&self, seed: U, accumulator: F) -> Observable<U>
    where
        U: Clone + Send + Sync + 'static,
        F: Fn(U, T) -> Result<U> + Send + Sync + 'static,
    {
        self.scan_seeded(seed, accumulator).take_last(1)
    }

    /// Emit `true` if every value matches the predicate, short-circuiting
    /// to `false` on the first mismatch.
    pub fn all<P>(&self, predicate: P) -> Observable<bool>
    where
        P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        operators::all::all(self, predicate)
    }

    /// Group values by key; each group is itself an observable.
    pub fn group_by<K, F>(&self, key_selector: F) -> Observable<crate::GroupedObservable<K, T>>
    where
        T: Clone,
        K: Clone + Eq + std::hash::Hash + Send + Sync + 'static,
        F: Fn(&T) -> Result<K> + Send + Sync + 'static,
    {
        operators::group_by::group_by(self, key_selector)
    }

    /// Reify every event into a [`Notification`] value; the terminal
    /// event arrives as a value followed by completion.
    pub fn materialize(&self) -> Observable<Notification<T>> {
        operators::materialize::materialize(self)
    }

    /// Attach the wall-clock instant at which each value passed through.
    pub fn timestamp(&self) -> Observable<Timestamped<T>> {
        operators::timestamp::timestamp(self)
    }

    // ---- slicing -------------------------------------------------------

    /// Drop the first `count` values.
    pub fn skip(&self, count: usize) -> Observable<T> {
        operators::skip::skip(self, count)
    }

    /// Emit only the first `count` values, then complete and unsubscribe
    /// upstream.
    pub fn take(&self, count: usize) -> Observable<T> {
        operators::take::take(self, count)
    }

    /// Forward values while the predicate holds, then complete.
    pub fn take_while<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> Result<bool> + Send + Sync + 'static,
    {
        operators::take_while::take_while(self, predicate)
    }

    /// Forward values while the predicate over value and index holds.
    pub fn take_while_with_index<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T, usize) -> Result<bool> + Send + Sync + 'static,
    {
        operators::take_while::take_while_with_index(self, predicate)
    }

    /// Emit the last `count` values once the upstream completes.
    pub fn take_last(&self, count: usize) -> Observable<T> {
        operators::take_last::take_last(self, count)
    }

    /// Forward upstream values until the gate emits its first event; the
    /// gate completing counts as that event, and its error propagates.
    pub fn take_until<U>(&self, gate: &Observable<U>) -> Observable<T>
    where
        U: Send + Sync + 'static,
    {
        operators::take_until::take_until(self, gate)
    }

    // ---- collection ----------------------------------------------------

    /// Collect the whole sequence into one list emitted at completion.
    pub fn to_list(&self) -> Observable<Vec<T>> {
        operators::to_list::to_list(self)
    }

    /// Collect and sort the whole sequence.
    pub fn to_sorted_list(&self) -> Observable<Vec<T>>
    where
        T: Ord,
    {
        operators::to_list::to_sorted_list_by(self, T::cmp)
    }

    /// Collect and sort the whole sequence with a comparator.
    pub fn to_sorted_list_by<F>(&self, comparator: F) -> Observable<Vec<T>>
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        operators::to_list::to_sorted_list_by(self, comparator)
    }

    // ---- combination ---------------------------------------------------

    /// Emit the given values before anything from this observable.
    pub fn start_with(&self, values: Vec<T>) -> Observable<T>
    where
        T: Clone,
    {
        operators::start_with::start_with(self, values)
    }

    /// This sequence, then the other, in strict order.
    pub fn concat_with(&self, other: &Observable<T>) -> Observable<T> {
        operators::concat::concat(vec![self.clone(), other.clone()])
    }

    /// All sources in strict order: each subscribes only after the
    /// previous completed.
    #[must_use]
    pub fn concat(sources: Vec<Observable<T>>) -> Observable<T> {
        operators::concat::concat(sources)
    }

    /// Interleave all sources, terminating on the first error.
    #[must_use]
    pub fn merge(sources: Vec<Observable<T>>) -> Observable<T> {
        operators::merge::merge_observable(&Observable::from_iter(sources), false)
    }

    /// Interleave all sources; errors are held back and delivered as one
    /// aggregate after every source has terminated.
    #[must_use]
    pub fn merge_delay_error(sources: Vec<Observable<T>>) -> Observable<T> {
        operators::merge::merge_observable(&Observable::from_iter(sources), true)
    }

    /// Forward the most recent inner observable, unsubscribing the
    /// previous one as each new inner arrives.
    #[must_use]
    pub fn switch_on_next(sources: Observable<Observable<T>>) -> Observable<T> {
        operators::switch::switch_on_next(&sources)
    }

    /// Pair two sequences positionally through a combiner.
    pub fn zip<B, C, F>(a: Observable<T>, b: Observable<B>, combiner: F) -> Observable<C>
    where
        B: Send + Sync + 'static,
        C: Send + Sync + 'static,
        F: Fn(T, B) -> Result<C> + Send + Sync + 'static,
    {
        operators::zip::zip(a, b, combiner)
    }

    /// Pair three sequences positionally through a combiner.
    pub fn zip3<B, C, D, F>(
        a: Observable<T>,
        b: Observable<B>,
        c: Observable<C>,
        combiner: F,
    ) -> Observable<D>
    where
        B: Send + Sync + 'static,
        C: Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Fn(T, B, C) -> Result<D> + Send + Sync + 'static,
    {
        let combiner = Arc::new(combiner);
        let paired = operators::zip::zip(a, b, |x, y| Ok((x, y)));
        operators::zip::zip(paired, c, move |(x, y), z| (*combiner)(x, y, z))
    }

    /// Combine the latest values of two sequences whenever either emits,
    /// once both have emitted at least once.
    pub fn combine_latest<B, C, F>(a: Observable<T>, b: Observable<B>, combiner: F) -> Observable<C>
    where
        T: Clone,
        B: Clone + Send + Sync + 'static,
        C: Send + Sync + 'static,
        F: Fn(T, B) -> Result<C> + Send + Sync + 'static,
    {
        operators::combine_latest::combine_latest(a, b, combiner)
    }

    /// Combine the latest values of three sequences.
    pub fn combine_latest3<B, C, D, F>(
        a: Observable<T>,
        b: Observable<B>,
        c: Observable<C>,
        combiner: F,
    ) -> Observable<D>
    where
        T: Clone,
        B: Clone + Send + Sync + 'static,
        C: Clone + Send + Sync + 'static,
        D: Send + Sync + 'static,
        F: Fn(T, B, C) -> Result<D> + Send + Sync + 'static,
    {
        let combiner = Arc::new(combiner);
        let paired = operators::combine_latest::combine_latest(a, b, |x, y| Ok((x, y)));
        operators::combine_latest::combine_latest(paired, c, move |(x, y), z| (*combiner)(x, y, z))
    }

    /// Compare two sequences elementwise, emitting one boolean per pair.
    pub fn sequence_equal(a: Observable<T>, b: Observable<T>) -> Observable<bool>
    where
        T: PartialEq,
    {
        operators::zip::zip(a, b, |x, y| Ok(x == y))
    }

    // ---- error handling ------------------------------------------------

    /// Run a cleanup action once, after the terminal event was delivered.
    pub fn finally_do<F>(&self, action: F) -> Observable<T>
    where
        F: Fn() + Send + Sync + 'static,
    {
        operators::finally::finally_do(self, action)
    }

    /// Replace a terminal error with one final value computed from it.
    pub fn on_error_return<F>(&self, selector: F) -> Observable<T>
    where
        F: Fn(EffluxError) -> Result<T> + Send + Sync + 'static,
    {
        operators::on_error::on_error_return(self, selector)
    }

    /// Continue with another observable when this one errors.
    pub fn on_error_resume_next(&self, resume: &Observable<T>) -> Observable<T> {
        let resume = resume.clone();
        operators::on_error::on_error_resume_next(self, move |_| Ok(resume.clone()))
    }

    /// Continue with an observable chosen from the error.
    pub fn on_error_resume_next_with<F>(&self, selector: F) -> Observable<T>
    where
        F: Fn(EffluxError) -> Result<Observable<T>> + Send + Sync + 'static,
    {
        operators::on_error::on_error_resume_next(self, selector)
    }

    /// Continue with another observable only for user-fault errors;
    /// aggregate and unhandled markers pass through unchanged.
    pub fn on_exception_resume_next(&self, resume: &Observable<T>) -> Observable<T> {
        operators::on_error::on_exception_resume_next(self, resume)
    }

    // ---- concurrency ---------------------------------------------------

    /// Hand emissions to a scheduler worker, preserving order; the
    /// downstream observer never runs on the producing thread.
    pub fn observe_on(&self, scheduler: &SchedulerRef) -> Observable<T> {
        operators::observe_on::observe_on(self, scheduler)
    }

    /// Defer the subscription itself to a scheduler; unsubscription runs
    /// there too.
    pub fn subscribe_on(&self, scheduler: &SchedulerRef) -> Observable<T> {
        operators::subscribe_on::subscribe_on(self, scheduler)
    }

    /// Serialize delivery so concurrent producers cannot interleave
    /// events to the downstream observer.
    pub fn synchronize(&self) -> Observable<T> {
        operators::synchronize::synchronize(self)
    }

    /// Emit the most recent unseen value on each scheduler tick; ticks
    /// with no fresh value emit nothing.
    pub fn sample(&self, period: Duration, scheduler: &SchedulerRef) -> Observable<T> {
        operators::sample::sample(self, period, scheduler)
    }

    // ---- buffering -----------------------------------------------------

    /// Group values into lists of `count`, emitting each list as it
    /// fills; a non-empty partial list is flushed at completion.
    pub fn buffer(&self, count: usize) -> Observable<Vec<T>>
    where
        T: Clone,
    {
        operators::buffer::with_count(self, count, count)
    }

    /// Group into lists of `count`, opening a new list every `skip`
    /// values; lists overlap when `skip < count`.
    pub fn buffer_with_skip(&self, count: usize, skip: usize) -> Observable<Vec<T>>
    where
        T: Clone,
    {
        operators::buffer::with_count(self, count, skip)
    }

    /// Close and emit the current list every `timespan`; interval closes
    /// may emit empty lists.
    pub fn buffer_with_time(
        &self,
        timespan: Duration,
        scheduler: &SchedulerRef,
    ) -> Observable<Vec<T>>
    where
        T: Clone,
    {
        operators::buffer::with_time(self, timespan, scheduler)
    }

    /// Close the current list when it reaches `count` or when the
    /// interval elapses, whichever comes first.
    pub fn buffer_with_time_or_count(
        &self,
        timespan: Duration,
        count: usize,
        scheduler: &SchedulerRef,
    ) -> Observable<Vec<T>>
    where
        T: Clone,
    {
        operators::buffer::with_time_or_count(self, timespan, count, scheduler)
    }

    /// Open a new list every `timeshift` and close it after `timespan`;
    /// lists overlap when `timespan > timeshift`.
    pub fn buffer_with_time_shifted(
        &self,
        timespan: Duration,
        timeshift: Duration,
        scheduler: &SchedulerRef,
    ) -> Observable<Vec<T>>
    where
        T: Clone,
    {
        operators::buffer::with_time_shifted(self, timespan, timeshift, scheduler)
    }

    /// Open a list on each opening event and close it when the
    /// observable selected from that opening fires.
    pub fn buffer_with_boundaries<O, C, F>(
        &self,
        openings: &Observable<O>,
        closing_selector: F,
    ) -> Observable<Vec<T>>
    where
        T: Clone,
        O: Send + Sync + 'static,
        C: Send + Sync + 'static,
        F: Fn(&O) -> Result<Observable<C>> + Send + Sync + 'static,
    {
        operators::buffer::with_boundaries(self, openings, closing_selector)
    }

    // ---- sharing -------------------------------------------------------

    /// Multicast through a subject built per connection epoch.
    pub fn multicast<S, F>(&self, subject_factory: F) -> ConnectableObservable<T>
    where
        S: Subject<T> + Send + Sync + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        multicast::multicast(self, subject_factory)
    }

    /// Share one upstream subscription among all observers; subscribers
    /// receive only events emitted after [`connect`].
    ///
    /// [`connect`]: ConnectableObservable::connect
    pub fn publish(&self) -> ConnectableObservable<T>
    where
        T: Clone,
    {
        self.multicast(PublishSubject::new)
    }

    /// Share one upstream subscription, replaying the full history to
    /// every subscriber.
    pub fn replay(&self) -> ConnectableObservable<T>
    where
        T: Clone,
    {
        self.multicast(ReplaySubject::unbounded)
    }

    /// Share one upstream subscription, replaying at most the last
    /// `capacity` values.
    pub fn replay_with_capacity(&self, capacity: usize) -> ConnectableObservable<T>
    where
        T: Clone,
    {
        self.multicast(move || ReplaySubject::with_capacity(capacity))
    }

    /// Subscribe the source once, on first subscribe, and replay its
    /// entire sequence to every observer for the lifetime of the value.
    ///
    /// The source subscription is never disposed; do not cache an
    /// unbounded source.
    pub fn cache(&self) -> Observable<T>
    where
        T: Clone,
    {
        multicast::cache(self)
    }
}

impl Observable<i64> {
    /// Emit `count` consecutive integers starting at `start`, then
    /// complete.
    #[must_use]
    pub fn range(start: i64, count: u64) -> Self {
        sources::range(start, count)
    }
}

impl<T: Send + Sync + 'static> Observable<Notification<T>> {
    /// Invert [`materialize`](Observable::materialize): notification
    /// values become live events again.
    pub fn dematerialize(&self) -> Observable<T> {
        operators::materialize::dematerialize(self)
    }
}

impl<T: Send + Sync + 'static> Observable<Observable<T>> {
    /// Merge every inner observable emitted by this one.
    pub fn merge_all(&self) -> Observable<T> {
        operators::merge::merge_observable(self, false)
    }
}
