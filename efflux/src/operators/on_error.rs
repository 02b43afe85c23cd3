// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Local error recovery: replace a terminal error with a value or with a
//! continuation observable. All other errors stay terminal.

use crate::observable::Observable;
use crate::subscriber::Subscriber;
use efflux_core::{
    CompositeSubscription, EffluxError, Observer, Result, SerialSubscription, Subscription,
};
use std::sync::Arc;

type ReturnSelector<T> = Arc<dyn Fn(EffluxError) -> Result<T> + Send + Sync>;
type ResumeSelector<T> = Arc<dyn Fn(EffluxError) -> Result<Observable<T>> + Send + Sync>;

struct ReturnStage<T> {
    child: Subscriber<T>,
    selector: ReturnSelector<T>,
}

impl<T: Send + Sync> Observer<T> for ReturnStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.child.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        match (self.selector)(err) {
            Ok(value) => {
                self.child.on_next(value)?;
                self.child.on_completed()
            }
            Err(selector_err) => self.child.on_error(selector_err),
        }
    }

    fn on_completed(&self) -> Result<()> {
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn on_error_return<T, F>(source: &Observable<T>, selector: F) -> Observable<T>
where
    T: Send + Sync + 'static,
    F: Fn(EffluxError) -> Result<T> + Send + Sync + 'static,
{
    let source = source.clone();
    let selector: ReturnSelector<T> = Arc::new(selector);
    Observable::new(move |child: &Subscriber<T>| {
        let stage = Arc::new(ReturnStage {
            child: child.clone(),
            selector: selector.clone(),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}

struct ResumeCoordinator<T> {
    child: Subscriber<T>,
    selector: ResumeSelector<T>,
    serial: SerialSubscription,
    // `on_exception_resume_next` resumes only for user faults.
    only_user_faults: bool,
}

// First-leg observer: a terminal error switches the serial over to the
// continuation observable instead of reaching the downstream observer.
struct ResumeStage<T> {
    coordinator: Arc<ResumeCoordinator<T>>,
}

impl<T: Send + Sync + 'static> Observer<T> for ResumeStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.coordinator.child.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        let coordinator = &self.coordinator;
        if coordinator.serial.is_unsubscribed() {
            return Ok(());
        }
        if coordinator.only_user_faults && !err.is_user_fault() {
            return coordinator.child.on_error(err);
        }
        let resume = match (coordinator.selector)(err) {
            Ok(resume) => resume,
            Err(selector_err) => return coordinator.child.on_error(selector_err),
        };
        let stage = Arc::new(PassThroughStage {
            child: coordinator.child.clone(),
        });
        let parent = Subscriber::with_shared(stage, CompositeSubscription::new());
        coordinator.serial.set(parent.to_subscription());
        match resume.unsafe_subscribe(&parent) {
            Ok(subscription) => {
                parent.add(subscription);
                Ok(())
            }
            Err(resume_err) => coordinator.child.on_error(resume_err),
        }
    }

    fn on_completed(&self) -> Result<()> {
        self.coordinator.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

// Second leg: the continuation's events, errors included, pass through.
struct PassThroughStage<T> {
    child: Subscriber<T>,
}

impl<T: Send + Sync> Observer<T> for PassThroughStage<T> {
    fn on_next(&self, value: T) -> Result<()> {
        self.child.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn on_error_resume_next<T, F>(source: &Observable<T>, selector: F) -> Observable<T>
where
    T: Send + Sync + 'static,
    F: Fn(EffluxError) -> Result<Observable<T>> + Send + Sync + 'static,
{
    resume_impl(source, Arc::new(selector), false)
}

pub(crate) fn on_exception_resume_next<T>(
    source: &Observable<T>,
    resume: &Observable<T>,
) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let resume = resume.clone();
    resume_impl(source, Arc::new(move |_| Ok(resume.clone())), true)
}

fn resume_impl<T>(
    source: &Observable<T>,
    selector: ResumeSelector<T>,
    only_user_faults: bool,
) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let serial = SerialSubscription::new();
        let coordinator = Arc::new(ResumeCoordinator {
            child: child.clone(),
            selector: selector.clone(),
            serial: serial.clone(),
            only_user_faults,
        });
        let stage = Arc::new(ResumeStage { coordinator });
        let parent = Subscriber::with_shared(stage, CompositeSubscription::new());
        // Serial points at the first leg before the subscribe call, so a
        // synchronous error switching legs is not clobbered afterwards.
        serial.set(parent.to_subscription());
        let subscription = source.unsafe_subscribe(&parent)?;
        parent.add(subscription);
        Ok(serial.handle())
    })
}
