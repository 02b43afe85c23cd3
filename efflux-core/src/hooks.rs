// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Process-wide interception points.
//!
//! The hook registry is a singleton configured at most once, before the
//! first subscribe. It carries an optional [`SubscribeInterceptor`] that
//! observes subscribe calls and may replace returned subscriptions and
//! surfaced errors, and an [`ErrorHandler`] invoked for every `on_error`
//! the library delivers, for side-band reporting.
//!
//! # Examples
//!
//! ```
//! use efflux_core::hooks::{hooks, Hooks};
//!
//! // Reading the registry claims the defaults; a later install fails fast.
//! hooks().handle_error(&efflux_core::EffluxError::stream_error("probe"));
//! assert!(efflux_core::hooks::install(Hooks::new()).is_err());
//! ```

use crate::error::{EffluxError, Result};
use crate::logging::error;
use crate::subscriptions::SubscriptionRef;
use std::sync::Arc;
use std::sync::OnceLock;

/// Observes and optionally rewrites the subscribe path.
///
/// The start notification carries no payload: a typed on-subscribe
/// function cannot cross a type-erased process-wide boundary, so unlike
/// the return and error hooks it cannot transform what it observes.
pub trait SubscribeInterceptor: Send + Sync {
    /// A subscribe call is about to run its producer.
    fn on_subscribe_start(&self) {}

    /// A subscribe call is about to return this subscription.
    fn on_subscribe_return(&self, subscription: SubscriptionRef) -> SubscriptionRef {
        subscription
    }

    /// A producer failed synchronously; the returned error is what the
    /// observer will receive.
    fn on_subscribe_error(&self, err: EffluxError) -> EffluxError {
        err
    }
}

/// Side-band sink for every error the library surfaces.
pub trait ErrorHandler: Send + Sync {
    /// Report one error. Must not panic.
    fn handle(&self, error: &EffluxError);
}

/// Default handler: report through the logging shim.
struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn handle(&self, err: &EffluxError) {
        error!("unhandled stream error: {err}");
    }
}

/// The hook configuration installed for this process.
pub struct Hooks {
    interceptor: Option<Arc<dyn SubscribeInterceptor>>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl Hooks {
    /// Default hooks: no interceptor, logging error handler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            interceptor: None,
            error_handler: Arc::new(LoggingErrorHandler),
        }
    }

    /// Install a subscribe interceptor.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn SubscribeInterceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Replace the error handler.
    #[must_use]
    pub fn with_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Notify the interceptor, if any, that a subscribe is starting.
    pub fn on_subscribe_start(&self) {
        if let Some(interceptor) = &self.interceptor {
            interceptor.on_subscribe_start();
        }
    }

    /// Pass a subscription through the interceptor, if any.
    #[must_use]
    pub fn on_subscribe_return(&self, subscription: SubscriptionRef) -> SubscriptionRef {
        match &self.interceptor {
            Some(interceptor) => interceptor.on_subscribe_return(subscription),
            None => subscription,
        }
    }

    /// Pass a synchronous subscribe failure through the interceptor, if any.
    #[must_use]
    pub fn on_subscribe_error(&self, err: EffluxError) -> EffluxError {
        match &self.interceptor {
            Some(interceptor) => interceptor.on_subscribe_error(err),
            None => err,
        }
    }

    /// Report an error to the side-band handler.
    pub fn handle_error(&self, err: &EffluxError) {
        self.error_handler.handle(err);
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: OnceLock<Hooks> = OnceLock::new();

/// Install the process-wide hooks.
///
/// Must run before the first subscribe; the registry can be claimed only
/// once per process, including implicitly by its defaults.
///
/// # Errors
/// Returns an argument error if the registry has already been claimed.
pub fn install(hooks: Hooks) -> Result<()> {
    REGISTRY
        .set(hooks)
        .map_err(|_| EffluxError::argument_error("hooks already installed for this process"))
}

/// The process-wide hooks, claiming the defaults on first use.
pub fn hooks() -> &'static Hooks {
    REGISTRY.get_or_init(Hooks::new)
}
