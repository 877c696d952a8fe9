//! Fluent construction of `Request` values.
//!
//! # Design
//! The builder tracks in its type whether the method and the URI have been
//! chosen. Each of them can be set once, and `build` only exists once both
//! are set, so an incomplete request does not compile. Headers, URI
//! parameters and the entity may be set at any point. Nothing is validated
//! beyond that.

use std::collections::HashMap;

use crate::entity::OutboundEntity;
use crate::http::{Headers, HttpMethod, Request};

/// Marker for a builder slot that has not been filled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unset;

/// Marker holding the chosen method.
#[derive(Debug, Clone, Copy)]
pub struct MethodSet(HttpMethod);

/// Marker holding the chosen URI template.
#[derive(Debug, Clone)]
pub struct UriSet(String);

#[derive(Debug)]
pub struct RequestBuilder<M = Unset, U = Unset> {
    method: M,
    uri: U,
    headers: Headers,
    uri_parameters: HashMap<String, String>,
    entity: Option<OutboundEntity>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Unset,
            uri: Unset,
            headers: Headers::new(),
            uri_parameters: HashMap::new(),
            entity: None,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> RequestBuilder<Unset, U> {
    pub fn method(self, method: HttpMethod) -> RequestBuilder<MethodSet, U> {
        RequestBuilder {
            method: MethodSet(method),
            uri: self.uri,
            headers: self.headers,
            uri_parameters: self.uri_parameters,
            entity: self.entity,
        }
    }
}

impl<M> RequestBuilder<M, Unset> {
    /// Target URI. May contain `{name}` placeholders filled from the URI
    /// parameters at execution time.
    pub fn uri(self, uri: impl Into<String>) -> RequestBuilder<M, UriSet> {
        RequestBuilder {
            method: self.method,
            uri: UriSet(uri.into()),
            headers: self.headers,
            uri_parameters: self.uri_parameters,
            entity: self.entity,
        }
    }
}

impl<M, U> RequestBuilder<M, U> {
    /// Add a header. A second header with the same name replaces the first.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn uri_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.uri_parameters.insert(name.into(), value.into());
        self
    }

    pub fn uri_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.uri_parameters
            .extend(parameters.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn entity(mut self, entity: impl Into<OutboundEntity>) -> Self {
        self.entity = Some(entity.into());
        self
    }
}

impl RequestBuilder<MethodSet, UriSet> {
    pub fn build(self) -> Request {
        Request {
            method: self.method.0,
            headers: self.headers,
            uri: self.uri.0,
            uri_parameters: self.uri_parameters,
            entity: self.entity,
        }
    }
}
