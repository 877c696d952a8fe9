//! Asynchronous HTTP client core.
//!
//! # Overview
//! A `Client` takes an immutable `Request`, runs the blocking exchange on a
//! worker pool and hands back a `PendingResponse` future that resolves to a
//! `Response` whose body is read lazily from the connection.
//!
//! # Design
//! - Requests are assembled with the type-state `RequestBuilder`; `build`
//!   only exists once a method and a URI are set.
//! - URIs may carry `{name}` placeholders, filled textually by `UriExpander`.
//! - Bodies are `OutboundEntity` chunk sequences, streamed into the
//!   connection by `ChunkedBodyWriter`, which always closes the sink and
//!   reports through `EntityHooks`.
//! - Network access goes through the `Connector` / `Connection` traits.
//!   `UreqConnector` is the production implementation; tests plug in fakes.
//! - Multi-valued response headers are joined with `,` in receipt order.
//! - Diagnostics are `tracing` events, optionally routed to a per-client
//!   `Dispatch`.

pub mod builder;
pub mod client;
pub mod config;
pub mod connector;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod http;
pub mod uri;
pub mod writer;

pub use builder::{MethodSet, RequestBuilder, Unset, UriSet};
pub use client::{Client, PendingResponse};
pub use config::ClientConfig;
pub use connector::{Connection, Connector, OutputSink, UreqConnector};
pub use entity::{InboundEntity, OutboundEntity};
pub use error::{HttpError, WriteError};
pub use http::{merge_header_values, Headers, HttpMethod, Request, Response, Status};
pub use uri::UriExpander;
pub use writer::{ChunkedBodyWriter, EntityHooks, NoopHooks};
