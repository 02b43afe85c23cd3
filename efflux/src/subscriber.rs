// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The pairing of an observer with its subscription.
//!
//! A [`Subscriber`] is what a producer actually receives: the downstream
//! observer plus the composite subscription governing this execution.
//! Producers emit through it and check
//! [`is_unsubscribed`](Subscription::is_unsubscribed) between emissions;
//! operators clone it to share one composite down a whole chain, which is
//! what makes a single outer `unsubscribe` tear down every stage.

use efflux_core::{
    CompositeSubscription, EffluxError, Observer, ObserverRef, Result, Subscription,
    SubscriptionRef,
};

/// An observer bound to the composite subscription of one execution.
pub struct Subscriber<T> {
    observer: ObserverRef<T>,
    subscription: CompositeSubscription,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            observer: self.observer.clone(),
            subscription: self.subscription.clone(),
        }
    }
}

impl<T> Subscriber<T> {
    /// Pair an observer with a fresh composite.
    #[must_use]
    pub fn new(observer: ObserverRef<T>) -> Self {
        Self {
            observer,
            subscription: CompositeSubscription::new(),
        }
    }

    /// Pair an observer with an existing composite.
    ///
    /// Operator stages use this to link their upstream lifetime to the
    /// downstream subscriber they forward to.
    #[must_use]
    pub fn with_shared(observer: ObserverRef<T>, subscription: CompositeSubscription) -> Self {
        Self {
            observer,
            subscription,
        }
    }

    /// Register a resource to dispose together with this subscriber.
    pub fn add(&self, subscription: SubscriptionRef) {
        self.subscription.add(subscription);
    }

    /// The composite governing this execution.
    #[must_use]
    pub fn composite(&self) -> &CompositeSubscription {
        &self.subscription
    }

    /// Type-erased handle to the composite.
    #[must_use]
    pub fn to_subscription(&self) -> SubscriptionRef {
        self.subscription.handle()
    }
}

impl<T: Send + Sync> Observer<T> for Subscriber<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.observer.on_next(value)
    }

    fn on_error(&self, error: EffluxError) -> Result<()> {
        self.observer.on_error(error)
    }

    fn on_completed(&self) -> Result<()> {
        self.observer.on_completed()
    }

    fn is_safe(&self) -> bool {
        self.observer.is_safe()
    }
}

impl<T> Subscription for Subscriber<T> {
    fn unsubscribe(&self) {
        self.subscription.unsubscribe();
    }

    fn is_unsubscribed(&self) -> bool {
        self.subscription.is_unsubscribed()
    }
}
