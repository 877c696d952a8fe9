//! Scripted in-memory connector shared by the executor tests.
//!
//! `FakeConnector` answers every request with the same scripted status,
//! header fields and body, and records what the executor did to each
//! connection so tests can assert on call order, written bytes and closes.

#![allow(dead_code)]

use std::io::{self, Cursor, Read};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use courier_core::{Connection, Connector, HttpMethod, OutputSink};

#[derive(Debug, Default)]
pub struct Recorded {
    pub events: Vec<String>,
    pub uris: Vec<String>,
    pub methods: Vec<HttpMethod>,
    pub headers: Vec<(String, String)>,
    pub written: Vec<u8>,
    pub closes: usize,
    pub exchanges: usize,
    pub streams_dropped: usize,
}

#[derive(Default)]
struct Script {
    status: u16,
    fields: Vec<(String, Vec<String>)>,
    body: Vec<u8>,
    fail_open: bool,
    fail_status: bool,
    fail_headers: bool,
    fail_write: bool,
    gate: Mutex<Option<Receiver<()>>>,
}

#[derive(Clone)]
pub struct FakeConnector {
    script: Arc<Script>,
    recorded: Arc<Mutex<Recorded>>,
}

impl FakeConnector {
    pub fn respond(status: u16, fields: &[(&str, &[&str])], body: &str) -> FakeBuilder {
        FakeBuilder {
            script: Script {
                status,
                fields: fields
                    .iter()
                    .map(|(name, values)| {
                        (name.to_string(), values.iter().map(|v| v.to_string()).collect())
                    })
                    .collect(),
                body: body.as_bytes().to_vec(),
                ..Script::default()
            },
        }
    }

    pub fn recorded(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap()
    }
}

pub struct FakeBuilder {
    script: Script,
}

impl FakeBuilder {
    pub fn fail_open(mut self) -> Self {
        self.script.fail_open = true;
        self
    }

    pub fn fail_status(mut self) -> Self {
        self.script.fail_status = true;
        self
    }

    pub fn fail_headers(mut self) -> Self {
        self.script.fail_headers = true;
        self
    }

    pub fn fail_write(mut self) -> Self {
        self.script.fail_write = true;
        self
    }

    /// Block the exchange until a message arrives on `gate`.
    pub fn gate(self, gate: Receiver<()>) -> Self {
        *self.script.gate.lock().unwrap() = Some(gate);
        self
    }

    pub fn build(self) -> FakeConnector {
        FakeConnector {
            script: Arc::new(self.script),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }
}

impl Connector for FakeConnector {
    fn open(&self, uri: &str) -> io::Result<Box<dyn Connection>> {
        let mut recorded = self.recorded();
        recorded.events.push("open".to_string());
        recorded.uris.push(uri.to_string());
        if self.script.fail_open {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        }
        Ok(Box::new(FakeConnection {
            script: Arc::clone(&self.script),
            recorded: Arc::clone(&self.recorded),
            sink: None,
            body_taken: false,
        }))
    }
}

struct FakeConnection {
    script: Arc<Script>,
    recorded: Arc<Mutex<Recorded>>,
    sink: Option<FakeSink>,
    body_taken: bool,
}

impl FakeConnection {
    fn record(&self, event: impl Into<String>) {
        self.recorded.lock().unwrap().events.push(event.into());
    }
}

impl Connection for FakeConnection {
    fn set_method(&mut self, method: HttpMethod) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(format!("method {method}"));
        recorded.methods.push(method);
    }

    fn add_header(&mut self, name: &str, value: &str) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(format!("header {name}"));
        recorded.headers.push((name.to_string(), value.to_string()));
    }

    fn enable_output(&mut self) {
        self.record("enable output");
        self.sink.get_or_insert_with(|| FakeSink {
            recorded: Arc::clone(&self.recorded),
            fail_write: self.script.fail_write,
        });
    }

    fn output_sink(&mut self) -> io::Result<&mut dyn OutputSink> {
        match self.sink.as_mut() {
            Some(sink) => Ok(sink),
            None => Err(io::Error::other("output not enabled")),
        }
    }

    fn status(&mut self) -> io::Result<u16> {
        if let Some(gate) = self.script.gate.lock().unwrap().take() {
            let _ = gate.recv();
        }
        {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.events.push("exchange".to_string());
            recorded.exchanges += 1;
        }
        if self.script.fail_status {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"));
        }
        Ok(self.script.status)
    }

    fn input_stream(&mut self) -> io::Result<Box<dyn Read + Send>> {
        self.record("input stream");
        if self.body_taken {
            return Err(io::Error::other("stream already taken"));
        }
        self.body_taken = true;
        Ok(Box::new(FakeStream {
            body: Cursor::new(self.script.body.clone()),
            recorded: Arc::clone(&self.recorded),
        }))
    }

    fn header_fields(&mut self) -> io::Result<Vec<(String, Vec<String>)>> {
        self.record("header fields");
        if self.script.fail_headers {
            return Err(io::Error::other("malformed header block"));
        }
        Ok(self.script.fields.clone())
    }
}

/// Response stream that records when it is dropped.
struct FakeStream {
    body: Cursor<Vec<u8>>,
    recorded: Arc<Mutex<Recorded>>,
}

impl Read for FakeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.body.read(buf)
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.streams_dropped += 1;
        }
    }
}

struct FakeSink {
    recorded: Arc<Mutex<Recorded>>,
    fail_write: bool,
}

impl OutputSink for FakeSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push("write".to_string());
        if self.fail_write {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink broke"));
        }
        recorded.written.extend_from_slice(chunk);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push("close".to_string());
        recorded.closes += 1;
        Ok(())
    }
}
