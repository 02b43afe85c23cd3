// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]

//! Push-based reactive streams for Rust.
//!
//! An [`Observable`] describes a sequence of values delivered to
//! subscribed observers until a single terminal completion or error.
//! Composition happens through a fluent operator surface; time and
//! concurrency go through the schedulers in [`schedulers`]; fan-out goes
//! through [subjects](crate::Subject) and the
//! [`ConnectableObservable`] sharing machinery.
//!
//! ```
//! use efflux::Observable;
//!
//! Observable::range(1, 4)
//!     .filter(|x| Ok(x % 2 == 1))
//!     .map(|x| Ok(x * 10))
//!     .subscribe_next(|x| {
//!         assert!(x == 10 || x == 30);
//!         Ok(())
//!     });
//! ```

mod logging;
mod multicast;
mod observable;
mod operators;
mod safety;
mod serialized;
mod sources;
mod subjects;
mod subscriber;

pub use multicast::ConnectableObservable;
pub use observable::{Observable, OnSubscribeFn};
pub use operators::group_by::GroupedObservable;
pub use operators::timestamp::Timestamped;
pub use safety::SafeObserver;
pub use serialized::SerializedObserver;
pub use subjects::{BehaviorSubject, PublishSubject, ReplaySubject, Subject};
pub use subscriber::Subscriber;

// The core protocol types are part of this crate's surface.
pub use efflux_core::hooks;
pub use efflux_core::{
    empty as empty_subscription, from_action, unsubscribed, ActionSubscription,
    BooleanSubscription, CompositeSubscription, EffluxError, FnObserver, Notification, Observer,
    ObserverRef, Result, ResultExt, SerialSubscription, Subscription, SubscriptionRef,
};

/// Scheduler factories and implementations, re-exported from
/// `efflux-sched`.
pub use efflux_sched as schedulers;

/// The types most programs want in scope.
pub mod prelude {
    pub use crate::{
        EffluxError, Notification, Observable, Observer, Result, Subject, Subscription,
    };
    pub use efflux_sched::{Scheduler, SchedulerRef};
}
