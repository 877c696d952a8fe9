//! Request and response bodies as lazy sequences of byte chunks.
//!
//! # Design
//! `OutboundEntity` is a one-shot iterator of `io::Result<Bytes>`: chunks are
//! produced on demand by the worker writing the request, an `Err` item is a
//! production failure, and exhaustion is the end signal. `InboundEntity`
//! wraps the connection's response stream; it can be read once, and reading
//! it again means issuing the request again.
//!
//! Both types perform blocking I/O when drained. Read an `InboundEntity` from
//! a blocking context (`tokio::task::spawn_blocking` or a plain thread).

use std::fmt;
use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

type ChunkSource = Box<dyn Iterator<Item = io::Result<Bytes>> + Send>;

/// Body of an outgoing request.
pub struct OutboundEntity {
    chunks: ChunkSource,
}

impl OutboundEntity {
    /// Entity producing `content` as a single chunk. Empty content produces
    /// no chunks at all.
    pub fn from_bytes(content: impl Into<Bytes>) -> Self {
        let content = content.into();
        let chunk: Option<io::Result<Bytes>> = (!content.is_empty()).then_some(Ok(content));
        Self {
            chunks: Box::new(chunk.into_iter()),
        }
    }

    /// Entity producing the given chunks in order.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::from_results(chunks.into_iter().map(Ok))
    }

    /// Entity over a fallible chunk sequence. The first `Err` aborts the
    /// write of the request body.
    pub fn from_results<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = io::Result<Bytes>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            chunks: Box::new(chunks.into_iter()),
        }
    }

    /// Entity reading `reader` lazily in chunks of at most `chunk_size`
    /// bytes.
    pub fn from_reader<R>(reader: R, chunk_size: usize) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::from_results(ReadChunks::new(reader, chunk_size))
    }

    /// Produce the next chunk; `None` once the entity is exhausted.
    pub fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        self.chunks.next()
    }
}

impl Iterator for OutboundEntity {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_chunk()
    }
}

impl fmt::Debug for OutboundEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundEntity").finish_non_exhaustive()
    }
}

impl From<Bytes> for OutboundEntity {
    fn from(content: Bytes) -> Self {
        Self::from_bytes(content)
    }
}

impl From<Vec<u8>> for OutboundEntity {
    fn from(content: Vec<u8>) -> Self {
        Self::from_bytes(content)
    }
}

impl From<String> for OutboundEntity {
    fn from(content: String) -> Self {
        Self::from_bytes(content)
    }
}

impl From<&'static str> for OutboundEntity {
    fn from(content: &'static str) -> Self {
        Self::from_bytes(content)
    }
}

/// Body of a received response, read lazily from the connection.
pub struct InboundEntity {
    reader: Box<dyn Read + Send>,
}

impl InboundEntity {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    /// Lazy chunk iterator over the remaining body.
    pub fn chunks(self, chunk_size: usize) -> impl Iterator<Item = io::Result<Bytes>> + Send {
        ReadChunks::new(self.reader, chunk_size)
    }

    /// Drain the remaining body into memory.
    pub fn bytes(mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Drain the remaining body as UTF-8 text.
    pub fn text(mut self) -> io::Result<String> {
        let mut text = String::new();
        self.reader.read_to_string(&mut text)?;
        Ok(text)
    }

    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl Read for InboundEntity {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for InboundEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundEntity").finish_non_exhaustive()
    }
}

/// Fused chunking adapter over a reader: stops after EOF or the first error.
struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = io::Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buf = BytesMut::zeroed(self.chunk_size);
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(buf.freeze()));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
