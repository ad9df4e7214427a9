use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::{honours_retry_after, parse_retry_after, url_scheme};
use crate::data::{RetryPolicy, SessionConfig};
use crate::effects::http::{HttpClient, HttpRequest, HttpResponse};
use crate::error::{Error, Result};

/// Blocking sleep used between attempts.
pub type Sleeper = fn(Duration);

/// Long-lived request context: one HTTP client, default headers and the
/// retry policy mounted per URL scheme.
pub struct Session<C: HttpClient> {
    client:  C,
    config:  SessionConfig,
    headers: Vec<(String, String)>,
    mounts:  BTreeMap<String, RetryPolicy>,
    pub(crate) credentials: Option<String>,
    sleeper: Sleeper,
}

impl<C: HttpClient> Session<C> {
    pub fn new(config: SessionConfig, client: C) -> Self {
        let mut session = Self {
            client,
            headers: vec![("User-Agent".to_string(), config.user_agent.clone())],
            mounts: BTreeMap::new(),
            credentials: None,
            sleeper: std::thread::sleep,
            config,
        };
        let policy = session.config.retry_policy.clone();
        session.mount("http", policy.clone());
        session.mount("https", policy);
        session
    }

    /// Use `policy` for every URL with the given scheme.
    pub fn mount(&mut self, scheme: &str, policy: RetryPolicy) {
        self.mounts.insert(scheme.to_ascii_lowercase(), policy);
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Sleeper) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn config(&self) -> &SessionConfig { &self.config }

    pub fn client(&self) -> &C { &self.client }

    pub fn default_headers(&self) -> &[(String, String)] { &self.headers }

    /// Encoded credentials installed by [`Session::apply_credentials`].
    pub fn credentials(&self) -> Option<&str> { self.credentials.as_deref() }

    /// Insert or replace a default header, names compare case-insensitively.
    pub fn set_default_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn retry_policy_for(&self, url: &str) -> &RetryPolicy {
        url_scheme(url)
            .and_then(|scheme| self.mounts.get(&scheme))
            .unwrap_or(&self.config.retry_policy)
    }

    /// Send `request`, retrying transient failures and forcelisted statuses.
    ///
    /// At most `total_retries + 1` attempts are made. Once retries are
    /// exhausted the last response (or error) is returned as is, unless
    /// `validate` turns a non-2xx/3xx status into [`Error::HttpStatus`].
    pub fn execute(&self, mut request: HttpRequest, validate: bool) -> Result<HttpResponse> {
        for (name, value) in self.headers.iter().rev() {
            if !request.has_header(name) {
                request.headers.insert(0, (name.clone(), value.clone()));
            }
        }

        let policy = self.retry_policy_for(&request.url);
        let mut retry = 0u32;

        loop {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = retry + 1,
                "sending request"
            );

            match self.client.execute(request.clone()) {
                Ok(response) => {
                    let status = response.status();
                    if retry < policy.total_retries() && policy.is_retryable_status(status) {
                        retry += 1;
                        let backoff = policy.delay(retry);
                        let delay = response
                            .header("retry-after")
                            .filter(|_| honours_retry_after(status))
                            .and_then(parse_retry_after)
                            .map_or(backoff, |after| after.max(backoff));
                        tracing::warn!(
                            status,
                            retry,
                            delay_ms = delay.as_millis() as u64,
                            url = %request.url,
                            "retrying after server error"
                        );
                        drop(response);
                        (self.sleeper)(delay);
                        continue;
                    }

                    if validate && !response.is_success() {
                        return Err(status_error(response));
                    }
                    return Ok(response);
                }
                Err(e) if e.is_transient() && retry < policy.total_retries() => {
                    retry += 1;
                    let delay = policy.delay(retry);
                    tracing::warn!(
                        error = %e,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        url = %request.url,
                        "retrying after transport failure"
                    );
                    (self.sleeper)(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn status_error(response: HttpResponse) -> Error {
    let status = response.status();
    match response.text() {
        Ok(body) => Error::HttpStatus { status, body },
        Err(e) => {
            tracing::debug!(status, error = %e, "failed to read error body");
            Error::HttpStatus {
                status,
                body: String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::Mutex;

    use super::*;
    use crate::data::Timeout;
    use crate::effects::http::Method;

    struct Scripted {
        replies: Mutex<Vec<Result<HttpResponse>>>,
        seen:    Mutex<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn new(mut replies: Vec<Result<HttpResponse>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> usize { self.seen.lock().unwrap().len() }
    }

    impl HttpClient for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push(request);
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(HttpResponse::from_bytes(200, "", "")))
        }
    }

    fn no_sleep(_: Duration) {}

    fn session(policy: RetryPolicy, replies: Vec<Result<HttpResponse>>) -> Session<Scripted> {
        let config = SessionConfig::new("https://example.com/api/")
            .unwrap()
            .user_agent("test-agent")
            .retry_policy(policy);
        Session::new(config, Scripted::new(replies)).with_sleeper(no_sleep)
    }

    fn get(url: &str) -> HttpRequest { HttpRequest::new(Method::Get, url, Timeout::default()) }

    #[test]
    fn retries_forcelisted_status_then_succeeds() {
        let policy = RetryPolicy::new(3, [503], 0.0).unwrap();
        let session = session(
            policy,
            vec![
                Ok(HttpResponse::from_bytes(503, "", "busy")),
                Ok(HttpResponse::from_bytes(503, "", "busy")),
                Ok(HttpResponse::from_bytes(200, "", "ok")),
            ],
        );

        let response = session.execute(get("https://example.com/api/x"), true).unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(session.client().attempts(), 3);
    }

    #[test]
    fn exhausted_retries_surface_last_status() {
        let policy = RetryPolicy::new(3, [503], 0.0).unwrap();
        let replies = (0..4).map(|_| Ok(HttpResponse::from_bytes(503, "", "down"))).collect();
        let session = session(policy, replies);

        let err = session.execute(get("https://example.com/api/x"), true).unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 503, ref body } if body == "down"));
        assert_eq!(session.client().attempts(), 4);
    }

    #[test]
    fn unvalidated_error_status_is_returned() {
        let reply = Ok(HttpResponse::from_bytes(404, "", "nope"));
        let session = session(RetryPolicy::none(), vec![reply]);
        let response = session.execute(get("https://example.com/api/x"), false).unwrap();
        assert_eq!(response.status(), 404);
    }

    #[test]
    fn transient_errors_are_retried() {
        let policy = RetryPolicy::new(2, [503], 0.0).unwrap();
        let session = session(
            policy,
            vec![
                Err(Error::Connection("reset".into())),
                Err(Error::Timeout("slow".into())),
                Ok(HttpResponse::from_bytes(200, "", "")),
            ],
        );
        assert!(session.execute(get("https://example.com/api/x"), true).is_ok());
        assert_eq!(session.client().attempts(), 3);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let session = session(RetryPolicy::default(), vec![Err(Error::InvalidUrl("bad".into()))]);
        assert!(matches!(
            session.execute(get("https://example.com/api/x"), true),
            Err(Error::InvalidUrl(_))
        ));
        assert_eq!(session.client().attempts(), 1);
    }

    #[test]
    fn non_forcelisted_status_fails_immediately() {
        let reply = Ok(HttpResponse::from_bytes(404, "", "missing"));
        let session = session(RetryPolicy::default(), vec![reply]);
        let err = session.execute(get("https://example.com/api/x"), true).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(session.client().attempts(), 1);
    }

    #[test]
    fn mounts_are_per_scheme() {
        let mut session = session(RetryPolicy::default(), vec![
            Ok(HttpResponse::from_bytes(503, "", "")),
            Ok(HttpResponse::from_bytes(200, "", "")),
        ]);
        session.mount("http", RetryPolicy::none());

        let err = session.execute(get("http://example.com/x"), true).unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(session.retry_policy_for("https://example.com").total_retries(), 5);
    }

    #[test]
    fn default_headers_do_not_override_request_headers() {
        let session = session(RetryPolicy::none(), vec![]);
        let mut request = get("https://example.com/api/x");
        request.headers.push(("user-agent".into(), "custom".into()));
        session.execute(request, true).unwrap();

        let seen = session.client().seen.lock().unwrap();
        assert_eq!(seen[0].header("User-Agent"), Some("custom"));
        assert_eq!(seen[0].headers.len(), 1);
    }

    #[test]
    fn user_agent_is_sent_by_default() {
        let session = session(RetryPolicy::none(), vec![]);
        session.execute(get("https://example.com/api/x"), true).unwrap();
        let seen = session.client().seen.lock().unwrap();
        assert_eq!(seen[0].header("user-agent"), Some("test-agent"));
    }

    thread_local! {
        static SLEPT: RefCell<Vec<Duration>> = const { RefCell::new(Vec::new()) };
    }

    fn record_sleep(delay: Duration) { SLEPT.with(|slept| slept.borrow_mut().push(delay)); }

    fn recorded_session(
        policy: RetryPolicy,
        replies: Vec<Result<HttpResponse>>,
    ) -> Session<Scripted> {
        SLEPT.with(|slept| slept.borrow_mut().clear());
        session(policy, replies).with_sleeper(record_sleep)
    }

    fn slept() -> Vec<Duration> { SLEPT.with(|slept| slept.borrow().clone()) }

    #[test]
    fn short_retry_after_keeps_backoff() {
        let policy = RetryPolicy::new(1, [429], 4.0).unwrap();
        let session = recorded_session(
            policy,
            vec![
                Ok(HttpResponse::from_bytes(429, "", "").with_header("Retry-After", "0")),
                Ok(HttpResponse::from_bytes(200, "", "")),
            ],
        );

        session.execute(get("https://example.com/api/x"), true).unwrap();
        assert_eq!(slept(), vec![Duration::from_secs(4)]);
    }

    #[test]
    fn longer_retry_after_wins() {
        let policy = RetryPolicy::new(1, [503], 1.0).unwrap();
        let session = recorded_session(
            policy,
            vec![
                Ok(HttpResponse::from_bytes(503, "", "").with_header("Retry-After", "7")),
                Ok(HttpResponse::from_bytes(200, "", "")),
            ],
        );

        session.execute(get("https://example.com/api/x"), true).unwrap();
        assert_eq!(slept(), vec![Duration::from_secs(7)]);
    }

    #[test]
    fn retry_after_ignored_for_other_statuses() {
        let policy = RetryPolicy::new(1, [502], 1.0).unwrap();
        let session = recorded_session(
            policy,
            vec![
                Ok(HttpResponse::from_bytes(502, "", "").with_header("Retry-After", "30")),
                Ok(HttpResponse::from_bytes(200, "", "")),
            ],
        );

        session.execute(get("https://example.com/api/x"), true).unwrap();
        assert_eq!(slept(), vec![Duration::from_secs(1)]);
    }
}
