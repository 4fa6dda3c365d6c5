//! HTTP transport
//!
//! The [`Transport`] trait is the seam between the API client and the network.
//! [`ReqwestTransport`] is the default implementation.

use super::request::{Headers, HttpRequest, RequestBody};
use crate::utils::error::{ApiResult, ErrorContext};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Version};
use std::fmt;
use std::io::{self, Cursor, Read, Write};
use thiserror::Error;
use tracing::{debug, warn};

/// Option key under which the debug sink is registered
pub const DEBUG_OPTION: &str = "debug";

/// Failure reported by a transport when the request/response cycle cannot complete
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportFailure {
    message: String,
    code: i32,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportFailure {
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        let code = err.status().map(|s| i32::from(s.as_u16())).unwrap_or(0);
        TransportFailure::new(err.to_string(), code).with_source(err)
    }
}

/// Fully buffered, rewindable response body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseBody {
    cursor: Cursor<Vec<u8>>,
}

impl ResponseBody {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            cursor: Cursor::new(bytes.into()),
        }
    }

    /// Read everything from the current position to the end as a string
    pub fn get_contents(&mut self) -> String {
        let mut buf = Vec::new();
        // Reading from an in-memory cursor cannot fail
        let _ = self.cursor.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Move the read position back to the start
    pub fn rewind(&mut self) {
        self.cursor.set_position(0);
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.get_ref().is_empty()
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

/// Raw response returned by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    status: StatusCode,
    headers: Headers,
    version: Version,
    body: ResponseBody,
}

impl TransportResponse {
    pub fn new(status: StatusCode, headers: Headers, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            version: Version::HTTP_11,
            body: ResponseBody::new(body),
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut ResponseBody {
        &mut self.body
    }
}

/// Writable destination for wire traces
pub struct DebugSink {
    path: String,
    writer: Box<dyn Write + Send>,
}

impl DebugSink {
    pub fn new(path: impl Into<String>, writer: Box<dyn Write + Send>) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Write for DebugSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl fmt::Debug for DebugSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugSink").field("path", &self.path).finish()
    }
}

/// Per-call transport options
///
/// Owns any resources it carries (e.g. the debug sink); they are released when the options drop.
#[derive(Debug, Default)]
pub struct TransportOptions {
    debug: Option<DebugSink>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    pub fn debug_sink(&self) -> Option<&DebugSink> {
        self.debug.as_ref()
    }

    pub fn debug_sink_mut(&mut self) -> Option<&mut DebugSink> {
        self.debug.as_mut()
    }

    /// Names of the options that are set
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.debug.is_some() {
            keys.push(DEBUG_OPTION);
        }
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.debug.is_none()
    }
}

/// HTTP transport used by the API client
///
/// Only network/protocol failures are errors; any HTTP status is a response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a prepared request
    async fn send(
        &self,
        request: &HttpRequest,
        options: &mut TransportOptions,
    ) -> Result<TransportResponse, TransportFailure>;

    /// Send a form-encoded request built from parts
    async fn request(
        &self,
        method: Method,
        url: &str,
        form: &[(String, String)],
    ) -> Result<TransportResponse, TransportFailure>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder()
            .build()
            .configuration_context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    /// Use an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn into_transport_response(
        response: reqwest::Response,
    ) -> Result<TransportResponse, TransportFailure> {
        let status = response.status();
        let version = response.version();
        let mut headers = Headers::new();
        for (name, value) in response.headers() {
            headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        let bytes = response.bytes().await?;

        Ok(TransportResponse::new(status, headers, bytes.to_vec()).with_version(version))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &HttpRequest,
        options: &mut TransportOptions,
    ) -> Result<TransportResponse, TransportFailure> {
        debug!("Sending {} request to {}", request.method(), request.uri());

        let mut builder = self
            .client
            .request(request.method().clone(), request.uri())
            .version(request.version());

        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }

        builder = match request.body() {
            Some(RequestBody::Raw(bytes)) => builder.body(bytes.clone()),
            Some(RequestBody::Form(pairs)) => builder.form(pairs),
            None => builder,
        };

        if let Some(sink) = options.debug_sink_mut() {
            if let Err(e) = trace_request(sink, request) {
                warn!("Failed to write request trace to {}: {}", sink.path(), e);
            }
        }

        let response = builder.send().await?;
        let response = Self::into_transport_response(response).await?;

        if let Some(sink) = options.debug_sink_mut() {
            if let Err(e) = trace_response(sink, &response) {
                warn!("Failed to write response trace to {}: {}", sink.path(), e);
            }
        }

        debug!("Received {} from {}", response.status(), request.uri());
        Ok(response)
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        form: &[(String, String)],
    ) -> Result<TransportResponse, TransportFailure> {
        let response = self.client.request(method, url).form(form).send().await?;
        Self::into_transport_response(response).await
    }
}

fn trace_request(sink: &mut DebugSink, request: &HttpRequest) -> io::Result<()> {
    writeln!(sink, "> {} {} {:?}", request.method(), request.uri(), request.version())?;
    for (name, value) in request.headers().iter() {
        writeln!(sink, "> {}: {}", name, value)?;
    }
    writeln!(sink, ">")?;
    if let Some(body) = request.body() {
        writeln!(sink, "{}", body)?;
    }
    sink.flush()
}

fn trace_response(sink: &mut DebugSink, response: &TransportResponse) -> io::Result<()> {
    writeln!(sink, "< {:?} {}", response.version(), response.status())?;
    for (name, value) in response.headers().iter() {
        writeln!(sink, "< {}: {}", name, value)?;
    }
    writeln!(sink, "<")?;
    let mut body = response.body().clone();
    body.rewind();
    writeln!(sink, "{}", body.get_contents())?;
    sink.flush()
}
