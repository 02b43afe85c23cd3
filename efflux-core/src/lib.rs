// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]

//! Core building blocks for efflux reactive streams.
//!
//! This crate defines the observer protocol, the subscription family, the
//! reified [`Notification`] event, the root [`EffluxError`] type and the
//! process-wide hook registry. The stream type, operators, subjects and
//! schedulers live in the `efflux-rx` and `efflux-sched` crates.

pub mod error;
pub mod hooks;
mod logging;
pub mod notification;
pub mod observer;
pub mod subscriptions;

pub use error::{EffluxError, Result, ResultExt};
pub use notification::Notification;
pub use observer::{FnObserver, Observer, ObserverRef};
pub use subscriptions::{
    empty, from_action, unsubscribed, ActionSubscription, BooleanSubscription,
    CompositeSubscription, SerialSubscription, Subscription, SubscriptionRef,
};
