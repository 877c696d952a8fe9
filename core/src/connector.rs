//! Transport connector seam and its ureq-backed implementation.
//!
//! # Design
//! The executor talks to the network only through `Connector` and
//! `Connection`, which mirror a classic blocking URL-connection object: set
//! the method and headers, optionally enable and fill an output sink, then
//! ask for the status, which performs the exchange. Tests substitute a fake
//! connector that scripts statuses, headers, bodies and failures without a
//! network.
//!
//! `UreqConnector` buffers the request body in its sink and sends it with
//! the request when the status is first asked for, which is how a buffered
//! platform connection behaves. Framing (content-length vs. chunked) is left
//! to ureq. Response header names come back lowercased by the transport
//! (`set-cookie`), which lookups through `Headers` do not distinguish.

use std::io::{self, Read};

use ureq::http;

use crate::http::HttpMethod;

/// Opens connections to resolved URIs. Shared across concurrent requests.
pub trait Connector: Send + Sync + 'static {
    fn open(&self, uri: &str) -> io::Result<Box<dyn Connection>>;
}

/// One HTTP exchange over a transport connection.
///
/// Callers use it in the order: `set_method`, `add_header`*, optionally
/// `enable_output` + `output_sink`, then `status`, `input_stream` and
/// `header_fields`.
pub trait Connection: Send {
    fn set_method(&mut self, method: HttpMethod);

    fn add_header(&mut self, name: &str, value: &str);

    /// Mark the connection as carrying a request body.
    fn enable_output(&mut self);

    /// Sink for the request body. Fails unless output was enabled.
    fn output_sink(&mut self) -> io::Result<&mut dyn OutputSink>;

    /// Status code of the response. The first call performs the exchange.
    fn status(&mut self) -> io::Result<u16>;

    /// The response body stream. Available once.
    fn input_stream(&mut self) -> io::Result<Box<dyn Read + Send>>;

    /// Response header fields grouped by name, values in receipt order.
    fn header_fields(&mut self) -> io::Result<Vec<(String, Vec<String>)>>;
}

/// Destination for request body chunks.
pub trait OutputSink: Send {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    fn close(&mut self) -> io::Result<()>;
}

/// Production connector over a blocking ureq agent.
#[derive(Clone)]
pub struct UreqConnector {
    agent: ureq::Agent,
}

impl UreqConnector {
    /// Connector whose agent returns every status as a response and never
    /// follows redirects.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for UreqConnector {
    fn open(&self, uri: &str) -> io::Result<Box<dyn Connection>> {
        let parsed: http::Uri = uri
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        if parsed.scheme().is_none() || parsed.host().is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not an absolute URI: {uri}"),
            ));
        }
        Ok(Box::new(UreqConnection {
            agent: self.agent.clone(),
            uri: parsed,
            method: HttpMethod::Get,
            headers: Vec::new(),
            output: None,
            exchanged: None,
        }))
    }
}

struct UreqConnection {
    agent: ureq::Agent,
    uri: http::Uri,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    output: Option<BufferedSink>,
    exchanged: Option<Exchanged>,
}

struct Exchanged {
    status: u16,
    fields: Vec<(String, Vec<String>)>,
    body: Option<ureq::Body>,
}

impl UreqConnection {
    fn exchange(&mut self) -> io::Result<&mut Exchanged> {
        if self.exchanged.is_none() {
            let mut builder = http::Request::builder()
                .method(self.method.as_str())
                .uri(self.uri.clone());
            for (name, value) in &self.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = match self.output.take() {
                Some(sink) => self.agent.run(builder.body(sink.buf).map_err(io::Error::other)?),
                None => self.agent.run(builder.body(()).map_err(io::Error::other)?),
            }
            .map_err(io::Error::other)?;

            let (parts, body) = response.into_parts();
            self.exchanged = Some(Exchanged {
                status: parts.status.as_u16(),
                fields: group_fields(&parts.headers),
                body: Some(body),
            });
        }
        // Populated above.
        self.exchanged
            .as_mut()
            .ok_or_else(|| io::Error::other("exchange did not complete"))
    }
}

impl Connection for UreqConnection {
    fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
    }

    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn enable_output(&mut self) {
        self.output.get_or_insert_with(BufferedSink::default);
    }

    fn output_sink(&mut self) -> io::Result<&mut dyn OutputSink> {
        match self.output.as_mut() {
            Some(sink) => Ok(sink),
            None => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "output is not enabled on this connection",
            )),
        }
    }

    fn status(&mut self) -> io::Result<u16> {
        Ok(self.exchange()?.status)
    }

    fn input_stream(&mut self) -> io::Result<Box<dyn Read + Send>> {
        let body = self.exchange()?.body.take().ok_or_else(|| {
            io::Error::other("response stream already taken")
        })?;
        Ok(Box::new(body.into_reader()))
    }

    fn header_fields(&mut self) -> io::Result<Vec<(String, Vec<String>)>> {
        Ok(self.exchange()?.fields.clone())
    }
}

#[derive(Default)]
struct BufferedSink {
    buf: Vec<u8>,
    closed: bool,
}

impl OutputSink for BufferedSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "output sink is closed"));
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

fn group_fields(headers: &http::HeaderMap) -> Vec<(String, Vec<String>)> {
    headers
        .keys()
        .map(|name| {
            let values = headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                .collect();
            (name.as_str().to_string(), values)
        })
        .collect()
}
