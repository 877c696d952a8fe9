//! Per-client diagnostic records.
//!
//! # Design
//! Each `Client` owns its `Diagnostics`. When a `tracing::Dispatch` is
//! injected through `ClientConfig`, every event emitted while a request runs
//! on its worker goes to that dispatch; otherwise events reach whatever
//! subscriber the host installed. Nothing here influences control flow.

use tracing::{debug, warn, Dispatch};

use crate::error::HttpError;
use crate::http::{Headers, HttpMethod, Status};

#[derive(Clone, Default)]
pub struct Diagnostics {
    dispatch: Option<Dispatch>,
    verbose: bool,
}

impl Diagnostics {
    pub fn new(dispatch: Option<Dispatch>, verbose: bool) -> Self {
        Self { dispatch, verbose }
    }

    /// Run `f` with this client's dispatch as the thread default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    pub fn request(&self, method: HttpMethod, uri: &str, headers: &Headers) {
        debug!(method = %method, uri = %uri, "making HTTP request");
        if self.verbose {
            for (name, value) in headers.iter() {
                debug!(header = %name, value = %value, "request header");
            }
        }
    }

    pub fn response(&self, uri: &str, status: Status) {
        debug!(uri = %uri, status = status.as_u16(), "received HTTP response");
    }

    pub fn failure(&self, method: HttpMethod, uri: &str, error: &HttpError) {
        warn!(method = %method, uri = %uri, error = %error, "HTTP request failed");
    }
}
