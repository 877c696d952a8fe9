//! Error types for the asynchronous HTTP client.
//!
//! # Design
//! Every failure reaches the caller through the `PendingResponse` returned by
//! `Client::execute`. `HttpError` names the lifecycle step that failed
//! (open, body write, exchange) and keeps the underlying `io::Error` as its
//! source. Body-streaming failures get their own `WriteError` so a failed
//! sink close can travel together with the failure that preceded it.

use std::io;

use thiserror::Error;

/// Errors delivered by `PendingResponse`.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The connector could not open a connection to the resolved URI.
    #[error("failed to open connection to {uri}")]
    Connect {
        uri: String,
        #[source]
        source: io::Error,
    },

    /// Streaming the outbound entity into the connection failed.
    #[error("failed to write request entity")]
    Write(#[from] WriteError),

    /// The status, headers or response stream could not be obtained.
    #[error("HTTP exchange with {uri} failed")]
    Exchange {
        uri: String,
        #[source]
        source: io::Error,
    },

    /// The transport reported a status outside 100..=999.
    #[error("unrepresentable HTTP status code {0}")]
    InvalidStatus(u16),

    /// The worker task panicked or was cancelled by runtime shutdown.
    #[error("request worker did not complete")]
    Worker(#[from] tokio::task::JoinError),

    /// No tokio runtime was configured or current when the client was built.
    #[error("no tokio runtime available for request workers")]
    NoRuntime,
}

/// Errors raised by `ChunkedBodyWriter`.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The connection refused to hand out an output sink.
    #[error("could not obtain the connection output sink")]
    Sink(#[source] io::Error),

    /// The entity failed while producing its next chunk.
    #[error("entity failed to produce a chunk")]
    Produce(#[source] io::Error),

    /// A chunk could not be written to the sink.
    #[error("error writing entity chunk")]
    Transfer(#[source] io::Error),

    /// The sink failed to close after every chunk was written.
    #[error("error while closing output sink")]
    Close(#[source] io::Error),

    /// The sink failed to close after an earlier failure.
    #[error("error while closing output sink ({close}) after an earlier failure")]
    CloseAfterFailure {
        #[source]
        cause: Box<WriteError>,
        close: io::Error,
    },
}

impl WriteError {
    /// The failure that started the unwinding, skipping close wrappers.
    pub fn root(&self) -> &WriteError {
        match self {
            WriteError::CloseAfterFailure { cause, .. } => cause.root(),
            other => other,
        }
    }
}
