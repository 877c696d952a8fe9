//! HTTP request and response models.
//!
//! # Design
//! `Request` is plain data assembled once by `RequestBuilder` and consumed by
//! a single `Client::execute` call. `Response` is built exactly once per
//! completed exchange, after the header fields reported by the connection
//! have been collapsed by `merge_header_values`. Its body stays unread until
//! the caller drains the `InboundEntity`.

use std::collections::HashMap;
use std::fmt;

use crate::entity::{InboundEntity, OutboundEntity};

/// Numeric HTTP status. Any code in 100..=999 is representable.
pub type Status = ureq::http::StatusCode;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    /// Upper-case token written on the request line.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header mapping with at most one entry per name.
///
/// Names keep the spelling they were first inserted with; lookups and
/// replacement compare names ASCII case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing the value of an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Collapse multi-valued header fields into one value per name.
///
/// Values of a name reported N >= 2 times are joined with a single `,` in
/// receipt order; a single value passes through unchanged. Names reported
/// with no values are dropped, and repeated groups for the same name are
/// folded into the first one.
pub fn merge_header_values<I>(fields: I) -> Headers
where
    I: IntoIterator<Item = (String, Vec<String>)>,
{
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for (name, values) in fields {
        if values.is_empty() {
            continue;
        }
        match grouped.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some((_, existing)) => existing.extend(values),
            None => grouped.push((name, values)),
        }
    }

    grouped
        .into_iter()
        .map(|(name, values)| (name, values.join(",")))
        .collect()
}

/// An HTTP call described as plain data.
///
/// Built by `RequestBuilder` and immutable afterwards. The entity is taken
/// by the executor when the request is executed.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: HttpMethod,
    pub(crate) headers: Headers,
    pub(crate) uri: String,
    pub(crate) uri_parameters: HashMap<String, String>,
    pub(crate) entity: Option<OutboundEntity>,
}

impl Request {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The URI as given, possibly still containing `{name}` placeholders.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn uri_parameters(&self) -> &HashMap<String, String> {
        &self.uri_parameters
    }

    pub fn entity(&self) -> Option<&OutboundEntity> {
        self.entity.as_ref()
    }
}

/// A completed HTTP exchange.
///
/// The header mapping is fixed at construction. The body is read lazily from
/// the connection through the `InboundEntity`; dropping the response closes
/// the underlying stream.
#[derive(Debug)]
pub struct Response {
    status: Status,
    headers: Headers,
    entity: InboundEntity,
}

impl Response {
    pub fn new(status: Status, headers: Headers, entity: InboundEntity) -> Self {
        Self {
            status,
            headers,
            entity,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Look up a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn entity_mut(&mut self) -> &mut InboundEntity {
        &mut self.entity
    }

    pub fn into_entity(self) -> InboundEntity {
        self.entity
    }

    pub fn into_parts(self) -> (Status, Headers, InboundEntity) {
        (self.status, self.headers, self.entity)
    }
}
