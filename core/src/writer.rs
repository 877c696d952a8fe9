//! Streams an outbound entity into a connection's output sink.
//!
//! # Design
//! The writer runs on the request's worker thread and drains the entity
//! chunk by chunk, in production order. Whatever happens, the sink is closed
//! exactly once, and exactly one of the `EntityHooks` callbacks fires:
//! `on_completion` after a clean transfer and close, `on_error` otherwise.
//! A close failure that follows an earlier failure is reported together with
//! it in `WriteError::CloseAfterFailure`.

use std::sync::Arc;

use tracing::debug;

use crate::connector::{Connection, OutputSink};
use crate::entity::OutboundEntity;
use crate::error::WriteError;

/// Callbacks observing the outcome of sending a request entity.
///
/// Both default to doing nothing. Implementations run on the worker thread
/// and must not block for long.
pub trait EntityHooks: Send + Sync {
    /// The entity was fully written and the sink closed cleanly.
    fn on_completion(&self, _entity: &OutboundEntity) {}

    /// Writing the entity failed; the sink has already been closed.
    fn on_error(&self, _entity: &OutboundEntity) {}
}

/// Hooks that ignore both outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl EntityHooks for NoopHooks {}

#[derive(Clone)]
pub struct ChunkedBodyWriter {
    hooks: Arc<dyn EntityHooks>,
}

impl ChunkedBodyWriter {
    pub fn new(hooks: Arc<dyn EntityHooks>) -> Self {
        Self { hooks }
    }

    /// Enable output on `connection` and stream `entity` into its sink.
    pub fn write(
        &self,
        entity: &mut OutboundEntity,
        connection: &mut dyn Connection,
    ) -> Result<(), WriteError> {
        connection.enable_output();
        let sink = connection.output_sink().map_err(WriteError::Sink)?;
        self.drain(entity, sink)
    }

    /// Stream `entity` into `sink`, then close it.
    pub fn drain(
        &self,
        entity: &mut OutboundEntity,
        sink: &mut dyn OutputSink,
    ) -> Result<(), WriteError> {
        match transfer(entity, sink) {
            Ok(written) => match sink.close() {
                Ok(()) => {
                    debug!(bytes = written, "request entity sent");
                    self.hooks.on_completion(entity);
                    Ok(())
                }
                Err(close) => {
                    self.hooks.on_error(entity);
                    Err(WriteError::Close(close))
                }
            },
            Err(cause) => {
                let failure = match sink.close() {
                    Ok(()) => cause,
                    Err(close) => WriteError::CloseAfterFailure {
                        cause: Box::new(cause),
                        close,
                    },
                };
                self.hooks.on_error(entity);
                Err(failure)
            }
        }
    }
}

impl Default for ChunkedBodyWriter {
    fn default() -> Self {
        Self::new(Arc::new(NoopHooks))
    }
}

fn transfer(entity: &mut OutboundEntity, sink: &mut dyn OutputSink) -> Result<usize, WriteError> {
    let mut written = 0;
    while let Some(chunk) = entity.next_chunk() {
        let chunk = chunk.map_err(WriteError::Produce)?;
        sink.write_chunk(&chunk).map_err(WriteError::Transfer)?;
        written += chunk.len();
    }
    Ok(written)
}
