//! Asynchronous request executor.
//!
//! # Design
//! `Client::execute` resolves the URI on the caller's thread, hands the rest
//! of the exchange to the runtime's blocking pool and returns a
//! `PendingResponse` at once. On the worker the steps run strictly in order:
//! log, open, set method and headers, write the entity (if any), read the
//! status (which performs the exchange), take the response stream, collect
//! and merge the headers. The first failure ends the task with an
//! `HttpError` and drops the connection, so no partial `Response` exists.
//!
//! Concurrent requests share only the connector, the URI expander and the
//! pool. There are no retries, no redirects, no timeouts and no
//! cancellation: once scheduled, a request runs to completion or failure.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::builder::{MethodSet, RequestBuilder, Unset};
use crate::config::ClientConfig;
use crate::connector::{Connector, UreqConnector};
use crate::diagnostics::Diagnostics;
use crate::entity::{InboundEntity, OutboundEntity};
use crate::error::HttpError;
use crate::http::{merge_header_values, Headers, HttpMethod, Request, Response, Status};
use crate::uri::UriExpander;
use crate::writer::ChunkedBodyWriter;

/// Asynchronous HTTP client.
///
/// Cheap to clone; clones share the connector, configuration and worker
/// pool.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    connector: Arc<dyn Connector>,
    expander: UriExpander,
    writer: ChunkedBodyWriter,
    diagnostics: Diagnostics,
    runtime: Handle,
}

impl Client {
    /// Client over `UreqConnector` with default configuration, running its
    /// workers on the current tokio runtime.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(ClientConfig::default(), UreqConnector::new())
    }

    pub fn with_config(config: ClientConfig, connector: impl Connector) -> Result<Self, HttpError> {
        Self::with_shared_connector(config, Arc::new(connector))
    }

    pub fn with_shared_connector(
        config: ClientConfig,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, HttpError> {
        let runtime = match config.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| HttpError::NoRuntime)?,
        };
        Ok(Self {
            inner: Arc::new(Inner {
                connector,
                expander: UriExpander::new(),
                writer: ChunkedBodyWriter::new(config.hooks),
                diagnostics: Diagnostics::new(config.diagnostics, config.verbose_diagnostics),
                runtime,
            }),
        })
    }

    /// Schedule `request` and return a handle to its eventual response.
    ///
    /// Never blocks: all network I/O happens on the runtime's blocking pool.
    pub fn execute(&self, request: Request) -> PendingResponse {
        let Request {
            method,
            headers,
            uri,
            uri_parameters,
            entity,
        } = request;
        let uri = self.inner.expander.expand(&uri, &uri_parameters).into_owned();

        let inner = Arc::clone(&self.inner);
        let task = self.inner.runtime.spawn_blocking(move || {
            inner.diagnostics.in_scope(|| {
                let result = inner.exchange(method, &headers, &uri, entity);
                if let Err(error) = &result {
                    inner.diagnostics.failure(method, &uri, error);
                }
                result
            })
        });
        PendingResponse { task }
    }

    /// Build a request with `build` and execute it.
    pub fn request<F>(&self, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder) -> Request,
    {
        self.execute(build(RequestBuilder::new()))
    }

    /// Like `request`, with the method already chosen.
    pub fn request_with<F>(&self, method: HttpMethod, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder<MethodSet, Unset>) -> Request,
    {
        self.execute(build(RequestBuilder::new().method(method)))
    }

    pub fn get(&self, uri: impl Into<String>) -> PendingResponse {
        self.request_with(HttpMethod::Get, |b| b.uri(uri).build())
    }

    pub fn delete(&self, uri: impl Into<String>) -> PendingResponse {
        self.request_with(HttpMethod::Delete, |b| b.uri(uri).build())
    }

    pub fn post(&self, uri: impl Into<String>, entity: impl Into<OutboundEntity>) -> PendingResponse {
        self.request_with(HttpMethod::Post, |b| b.uri(uri).entity(entity).build())
    }

    pub fn put(&self, uri: impl Into<String>, entity: impl Into<OutboundEntity>) -> PendingResponse {
        self.request_with(HttpMethod::Put, |b| b.uri(uri).entity(entity).build())
    }

    pub fn patch(&self, uri: impl Into<String>, entity: impl Into<OutboundEntity>) -> PendingResponse {
        self.request_with(HttpMethod::Patch, |b| b.uri(uri).entity(entity).build())
    }

    pub fn get_with<F>(&self, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder<MethodSet, Unset>) -> Request,
    {
        self.request_with(HttpMethod::Get, build)
    }

    pub fn delete_with<F>(&self, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder<MethodSet, Unset>) -> Request,
    {
        self.request_with(HttpMethod::Delete, build)
    }

    pub fn post_with<F>(&self, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder<MethodSet, Unset>) -> Request,
    {
        self.request_with(HttpMethod::Post, build)
    }

    pub fn put_with<F>(&self, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder<MethodSet, Unset>) -> Request,
    {
        self.request_with(HttpMethod::Put, build)
    }

    pub fn patch_with<F>(&self, build: F) -> PendingResponse
    where
        F: FnOnce(RequestBuilder<MethodSet, Unset>) -> Request,
    {
        self.request_with(HttpMethod::Patch, build)
    }
}

impl Inner {
    fn exchange(
        &self,
        method: HttpMethod,
        headers: &Headers,
        uri: &str,
        entity: Option<OutboundEntity>,
    ) -> Result<Response, HttpError> {
        self.diagnostics.request(method, uri, headers);

        let mut connection = self.connector.open(uri).map_err(|source| HttpError::Connect {
            uri: uri.to_string(),
            source,
        })?;

        connection.set_method(method);
        for (name, value) in headers.iter() {
            connection.add_header(name, value);
        }

        if let Some(mut entity) = entity {
            self.writer.write(&mut entity, connection.as_mut())?;
        }

        let exchange_failed = |source: io::Error| HttpError::Exchange {
            uri: uri.to_string(),
            source,
        };
        let code = connection.status().map_err(exchange_failed)?;
        let status = Status::from_u16(code).map_err(|_| HttpError::InvalidStatus(code))?;
        let stream = connection.input_stream().map_err(exchange_failed)?;
        let fields = connection.header_fields().map_err(exchange_failed)?;

        self.diagnostics.response(uri, status);
        Ok(Response::new(
            status,
            merge_header_values(fields),
            InboundEntity::new(stream),
        ))
    }
}

/// Handle to a request running on the worker pool.
///
/// Resolves exactly once, to the `Response` or to the failure that ended
/// the exchange. Dropping the handle does not stop the request.
#[derive(Debug)]
pub struct PendingResponse {
    task: JoinHandle<Result<Response, HttpError>>,
}

impl PendingResponse {
    /// Whether the worker has finished, successfully or not.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Future for PendingResponse {
    type Output = Result<Response, HttpError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.task).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join)) => Poll::Ready(Err(HttpError::Worker(join))),
            Poll::Pending => Poll::Pending,
        }
    }
}
