use crate::core::join_url;
use crate::data::Timeout;
use crate::effects::http::{HttpClient, HttpRequest, HttpResponse, Method, Payload};
use crate::effects::session::Session;
use crate::error::Result;

/// Per-call knobs for [`Transport`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub timeout:   Option<Timeout>,
    pub headers:   Vec<(String, String)>,
    pub query:     Vec<(String, String)>,
    pub payload:   Payload,
    pub validate:  bool,
    pub streaming: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout:   None,
            headers:   Vec::new(),
            query:     Vec::new(),
            payload:   Payload::Empty,
            validate:  true,
            streaming: false,
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Return error statuses as responses instead of
    /// [`Error::HttpStatus`](crate::Error::HttpStatus).
    #[must_use]
    pub fn allow_error_status(mut self) -> Self {
        self.validate = false;
        self
    }

    /// Lift the overall deadline for large request bodies.
    #[must_use]
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }
}

/// Verb-level access to the provider API, relative to the base URL.
pub struct Transport<C: HttpClient> {
    session: Session<C>,
}

impl<C: HttpClient> Transport<C> {
    pub fn new(session: Session<C>) -> Self { Self { session } }

    pub fn session(&self) -> &Session<C> { &self.session }

    pub fn session_mut(&mut self) -> &mut Session<C> { &mut self.session }

    pub fn base_url(&self) -> &str { &self.session.config().base_api_url }

    pub fn url_for(&self, path: &str) -> String { join_url(self.base_url(), path) }

    pub fn get(&self, path: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::Get, path, options)
    }

    pub fn post(&self, path: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::Post, path, options)
    }

    pub fn put(&self, path: &str, options: RequestOptions) -> Result<HttpResponse> {
        self.request(Method::Put, path, options)
    }

    fn request(&self, method: Method, path: &str, options: RequestOptions) -> Result<HttpResponse> {
        let timeout = options.timeout.unwrap_or(self.session.config().timeout);
        let request = HttpRequest {
            method,
            url: self.url_for(path),
            headers: options.headers,
            query: options.query,
            payload: options.payload,
            timeout,
            streaming: options.streaming,
        };
        self.session.execute(request, options.validate)
    }
}
