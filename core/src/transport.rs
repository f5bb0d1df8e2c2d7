//! HTTP transport boundary and request throttling.
//!
//! # Design
//! The library never performs HTTP itself. Callers inject anything that
//! implements [`Transport`] (ureq in the integration tests, a canned stub in
//! unit tests) and [`ThrottledTransport`] wraps it, spacing consecutive
//! requests at least [`MIN_REQUEST_INTERVAL`] apart as the service's fair-use
//! policy demands. The last-request timestamp is the only piece of mutable
//! state in the crate and lives behind a mutex that is held across the sleep
//! and the call itself, so concurrent callers sharing one client are
//! serialized rather than racing past the throttle.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::Error;

/// Minimum spacing between consecutive requests from one client instance,
/// mandated by the del.icio.us terms of use.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Result type for [`Transport::execute`]. Any error type works; the client
/// wraps it with the failing operation's name.
pub type TransportResult = Result<String, Box<dyn std::error::Error + Send + Sync>>;

/// A synchronous HTTP capability.
///
/// Implementations receive the request path (e.g. `/v1/tags/get`) and query
/// parameters, perform one authenticated GET round-trip, and return the raw
/// response body. Status handling is left to the implementation; the client
/// only interprets the body.
pub trait Transport: Send + Sync {
    fn execute(&self, path: &str, params: &[(String, String)]) -> TransportResult;
}

/// Throttling wrapper around an optional injected [`Transport`].
pub(crate) struct ThrottledTransport {
    inner: Option<Box<dyn Transport>>,
    last_request: Mutex<Option<Instant>>,
    interval: Duration,
}

impl ThrottledTransport {
    pub(crate) fn new(inner: Option<Box<dyn Transport>>) -> Self {
        Self::with_interval(inner, MIN_REQUEST_INTERVAL)
    }

    /// Used by tests to run the throttle at a shorter interval.
    pub(crate) fn with_interval(inner: Option<Box<dyn Transport>>, interval: Duration) -> Self {
        Self {
            inner,
            last_request: Mutex::new(None),
            interval,
        }
    }

    pub(crate) fn set_inner(&mut self, inner: Option<Box<dyn Transport>>) {
        self.inner = inner;
    }

    pub(crate) fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Issue one request through the injected transport.
    ///
    /// Fails with [`Error::TransportNotConfigured`] before any waiting if no
    /// transport has been injected. Otherwise sleeps out the remainder of the
    /// throttle interval, executes the call, and records the timestamp
    /// whether or not the call succeeded, so failed requests (and naive
    /// retries of them) still count toward the rate limit.
    pub(crate) fn send(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(String, String)],
    ) -> Result<String, Error> {
        let inner = self.inner.as_ref().ok_or(Error::TransportNotConfigured)?;

        let mut last_request = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(last) = *last_request {
            if let Some(wait) = self.interval.checked_sub(last.elapsed()) {
                trace!(operation, ?wait, "throttling before next request");
                thread::sleep(wait);
            }
        }

        debug!(operation, path, "issuing request");
        let result = inner.execute(path, params);
        *last_request = Some(Instant::now());
        drop(last_request);

        result.map_err(|source| Error::Transport { operation, source })
    }
}
