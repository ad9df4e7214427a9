use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::data::Timeout;
use crate::effects::progress::ProgressTracker;
use crate::error::{Error, Result};

/// Blocking HTTP client abstraction.
///
/// One call is one attempt: implementations never retry and never judge the
/// status code. Retry, default headers and status validation live in
/// [`Session`](crate::Session).
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Send `request` and return the response head with a streaming body.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] and [`Error::Timeout`] for transport failures,
    /// [`Error::Io`] when a request body could not be read from disk.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> { (**self).execute(request) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// `multipart/form-data` with a single file field.
    Multipart(FilePart),
    /// The file as the raw request body.
    Raw(FilePart),
}

impl Payload {
    pub fn file(&self) -> Option<&FilePart> {
        match self {
            Payload::Empty => None,
            Payload::Multipart(part) | Payload::Raw(part) => Some(part),
        }
    }
}

/// A file sent as a request body.
///
/// Only the description is stored; every attempt calls [`FilePart::open`]
/// and streams the file again from the start.
#[derive(Clone)]
pub struct FilePart {
    pub field:      String,
    pub file_name:  String,
    pub path:       PathBuf,
    pub length:     u64,
    pub chunk_size: usize,
    tracker:        Option<ProgressTracker>,
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .field("path", &self.path)
            .field("length", &self.length)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl FilePart {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        path: impl Into<PathBuf>,
        length: u64,
        chunk_size: usize,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            path: path.into(),
            length,
            chunk_size: chunk_size.max(1),
            tracker: None,
        }
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn open(&self) -> Result<ChunkedReader> {
        let file = File::open(&self.path)?;
        Ok(ChunkedReader::new(
            file,
            &self.path,
            self.length,
            self.chunk_size,
            self.tracker.clone(),
        ))
    }
}

/// Reads exactly `length` bytes of a file, one chunk at a time.
///
/// Progress is reported once a chunk has been fully handed to the consumer.
/// A file that shrank since it was measured fails with
/// [`io::ErrorKind::UnexpectedEof`]; bytes past `length` are never read.
pub struct ChunkedReader {
    file:      File,
    path:      PathBuf,
    buffer:    Vec<u8>,
    pos:       usize,
    filled:    usize,
    remaining: u64,
    offset:    u64,
    chunks:    u64,
    tracker:   Option<ProgressTracker>,
}

impl ChunkedReader {
    fn new(
        file: File,
        path: &Path,
        length: u64,
        chunk_size: usize,
        tracker: Option<ProgressTracker>,
    ) -> Self {
        Self {
            file,
            path: path.to_path_buf(),
            buffer: vec![0; chunk_size.max(1)],
            pos: 0,
            filled: 0,
            remaining: length,
            offset: 0,
            chunks: 0,
            tracker,
        }
    }

    /// Chunks pulled from disk so far.
    pub fn chunks_read(&self) -> u64 { self.chunks }

    /// Bytes handed to the consumer so far.
    pub fn position(&self) -> u64 { self.offset + self.pos as u64 }

    fn fill(&mut self) -> io::Result<()> {
        let want = self.remaining.min(self.buffer.len() as u64) as usize;
        self.file.read_exact(&mut self.buffer[..want]).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("{} shrank while it was being sent", self.path.display()),
                )
            } else {
                e
            }
        })?;
        self.remaining -= want as u64;
        self.filled = want;
        self.pos = 0;
        self.chunks += 1;
        Ok(())
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pos == self.filled {
            if self.remaining == 0 {
                return Ok(0);
            }
            self.fill()?;
        }

        let n = out.len().min(self.filled - self.pos);
        out[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
        self.pos += n;

        if self.pos == self.filled {
            self.offset += self.filled as u64;
            self.pos = 0;
            self.filled = 0;
            if let Some(tracker) = &self.tracker {
                tracker.advance_to(self.offset);
            }
        }
        Ok(n)
    }
}

/// One attempt's worth of request description.
#[derive(Clone)]
pub struct HttpRequest {
    pub method:    Method,
    pub url:       String,
    pub headers:   Vec<(String, String)>,
    pub query:     Vec<(String, String)>,
    pub payload:   Payload,
    pub timeout:   Timeout,
    /// Request bodies get no overall deadline, only the connect timeout.
    /// Without it, `timeout` bounds the response head and every body read.
    pub streaming: bool,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>, timeout: Timeout) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            payload: Payload::Empty,
            timeout,
            streaming: false,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> { find_header(&self.headers, name) }

    pub fn has_header(&self, name: &str) -> bool { self.header(name).is_some() }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        let query: Vec<&str> = self.query.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("query", &query)
            .field("payload", &self.payload)
            .field("timeout", &self.timeout)
            .field("streaming", &self.streaming)
            .finish()
    }
}

/// Response head plus a body that is read lazily.
pub struct HttpResponse {
    status:  u16,
    url:     String,
    headers: Vec<(String, String)>,
    body:    Box<dyn Read + Send>,
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl HttpResponse {
    pub fn new(
        status: u16,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Read + Send + 'static,
    ) -> Self {
        Self {
            status,
            url: url.into(),
            headers,
            body: Box::new(body),
        }
    }

    /// Response with an in-memory body.
    pub fn from_bytes(status: u16, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, url, Vec::new(), io::Cursor::new(body.into()))
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> u16 { self.status }

    /// Final URL after redirects.
    pub fn url(&self) -> &str { &self.url }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }

    pub fn header(&self, name: &str) -> Option<&str> { find_header(&self.headers, name) }

    pub fn is_success(&self) -> bool { (200..400).contains(&self.status) }

    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length")
            .and_then(|value| value.trim().parse().ok())
    }

    /// Whole body decoded as UTF-8, invalid sequences replaced.
    pub fn text(mut self) -> Result<String> {
        let mut raw = Vec::new();
        self.body.read_to_end(&mut raw).map_err(Error::from_body_read)?;
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let text = self.text()?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Decode(format!("{e}; body: {}", excerpt(&text))))
    }

    pub fn into_body(self) -> Box<dyn Read + Send> { self.body }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

fn excerpt(text: &str) -> &str {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::error::Error as StdError;

    use reqwest::blocking::{Body, Client, multipart};
    use reqwest::{NoProxy, Proxy, redirect};

    use super::*;
    use crate::data::SessionConfig;

    const MAX_REDIRECTS: usize = 10;

    /// Production HTTP client implementation using blocking reqwest.
    ///
    /// Connection pooling, redirects and proxies are configured once from a
    /// [`SessionConfig`]. The request timeout bounds the response head and
    /// each body read, so a stalled download fails instead of hanging.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
    }

    impl ReqwestClient {
        pub fn new(config: &SessionConfig) -> Result<Self> {
            let mut builder = Client::builder()
                .connect_timeout(config.timeout.connect())
                .timeout(None)
                .redirect(redirect::Policy::limited(MAX_REDIRECTS))
                .no_proxy();

            let bypass = config.proxies.get("no").and_then(|list| NoProxy::from_string(list));
            for (scheme, url) in &config.proxies {
                let proxy = match scheme.as_str() {
                    "http" => Proxy::http(url),
                    "https" => Proxy::https(url),
                    "all" => Proxy::all(url),
                    _ => continue,
                }
                .map_err(|e| Error::Configuration(format!("invalid {scheme} proxy '{url}': {e}")))?;
                builder = builder.proxy(proxy.no_proxy(bypass.clone()));
            }

            let client = builder
                .build()
                .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {e}")))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Put => reqwest::Method::PUT,
            };

            let mut builder = self.client.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if !request.streaming {
                builder = builder.timeout(request.timeout.connect() + request.timeout.read());
            }

            builder = match &request.payload {
                Payload::Empty => builder,
                Payload::Multipart(part) => {
                    let reader = part.open()?;
                    let form = multipart::Form::new().part(
                        part.field.clone(),
                        multipart::Part::reader_with_length(reader, part.length)
                            .file_name(part.file_name.clone()),
                    );
                    builder.multipart(form)
                }
                Payload::Raw(part) => builder.body(Body::sized(part.open()?, part.length)),
            };

            let response = builder.send().map_err(map_error)?;
            let status = response.status().as_u16();
            let url = response.url().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();

            Ok(HttpResponse::new(status, url, headers, ResponseBody(response)))
        }
    }

    /// Surfaces reqwest's per-read deadline as [`io::ErrorKind::TimedOut`].
    struct ResponseBody(reqwest::blocking::Response);

    impl Read for ResponseBody {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf).map_err(|e| {
                let timed_out = e.kind() == io::ErrorKind::TimedOut
                    || e.get_ref()
                        .and_then(|inner| inner.downcast_ref::<reqwest::Error>())
                        .is_some_and(reqwest::Error::is_timeout);
                if timed_out { io::Error::new(io::ErrorKind::TimedOut, e.to_string()) } else { e }
            })
        }
    }

    fn map_error(e: reqwest::Error) -> Error {
        if e.is_builder() {
            return Error::InvalidUrl(e.to_string());
        }
        if e.is_timeout() {
            return Error::Timeout(e.to_string());
        }
        if e.is_connect() || e.is_redirect() {
            return Error::Connection(e.to_string());
        }
        match local_io_error(&e) {
            Some(kind) => Error::Io(io::Error::new(kind, e.to_string())),
            None => Error::Connection(e.to_string()),
        }
    }

    /// A request body that failed to read from disk is not worth retrying.
    fn local_io_error(e: &reqwest::Error) -> Option<io::ErrorKind> {
        let mut source = e.source();
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<io::Error>() {
                return match io.kind() {
                    io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::NotFound
                    | io::ErrorKind::PermissionDenied => Some(io.kind()),
                    _ => None,
                };
            }
            source = err.source();
        }
        None
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
