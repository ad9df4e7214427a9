use std::collections::BTreeMap;
use std::fmt;

use crate::core::{build_user_agent, validate_base_url};
use crate::data::{Authorization, RetryPolicy, Timeout};
use crate::error::Result;

const PROXY_SCHEMES: [&str; 4] = ["http", "https", "all", "no"];

/// Everything a session needs to talk to one provider.
///
/// [`SessionConfig::new`] is the default factory: each call builds an
/// independent value and reads the proxy environment exactly once. The
/// snapshot is never refreshed afterwards, later changes to `HTTP_PROXY`
/// and friends do not affect an existing configuration.
///
/// # Examples
///
/// ```
/// use anonpy_fetch::{RetryPolicy, SessionConfig, Timeout};
///
/// let config = SessionConfig::new("https://pixeldrain.com/api/")
///     .unwrap()
///     .timeout(Timeout::split(0.5, 1.0).unwrap())
///     .retry_policy(RetryPolicy::none())
///     .token("secret");
/// assert_eq!(config.token.as_deref(), Some("secret"));
/// ```
#[derive(Clone)]
pub struct SessionConfig {
    /// Absolute `http` or `https` URL every endpoint is resolved against.
    pub base_api_url: String,

    pub user_agent: String,

    /// Proxy URL per scheme (`http`, `https`, `all`) plus the `no` bypass list.
    pub proxies: BTreeMap<String, String>,

    pub timeout: Timeout,

    pub retry_policy: RetryPolicy,

    /// API token, sent as the `token` query parameter on uploads.
    pub token: Option<String>,

    /// Scheme used to turn `token` into an `Authorization` header.
    pub credential_header: Option<Authorization>,

    /// Character set response bodies are decoded with. Always `utf-8`.
    pub encoding: &'static str,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("base_api_url", &self.base_api_url)
            .field("user_agent", &self.user_agent)
            .field("proxies", &self.proxies)
            .field("timeout", &self.timeout)
            .field("retry_policy", &self.retry_policy)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("credential_header", &self.credential_header)
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl SessionConfig {
    pub fn new(base_api_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_api_url:      validate_base_url(base_api_url.as_ref())?,
            user_agent:        build_user_agent("anonpy", env!("CARGO_PKG_VERSION"), false),
            proxies:           proxies_from_env(),
            timeout:           Timeout::default(),
            retry_policy:      RetryPolicy::default(),
            token:             None,
            credential_header: None,
            encoding:          "utf-8",
        })
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replace the environment snapshot.
    #[must_use]
    pub fn proxies(mut self, proxies: BTreeMap<String, String>) -> Self {
        self.proxies = proxies;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn credential_header(mut self, scheme: Authorization) -> Self {
        self.credential_header = Some(scheme);
        self
    }
}

fn proxies_from_env() -> BTreeMap<String, String> { proxies_from_vars(std::env::vars()) }

/// Collect `<scheme>_proxy` variables. Lowercase names win over uppercase
/// ones, empty values are ignored.
pub(crate) fn proxies_from_vars(
    vars: impl IntoIterator<Item = (String, String)>,
) -> BTreeMap<String, String> {
    let mut upper = BTreeMap::new();
    let mut lower = BTreeMap::new();

    for (name, value) in vars {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let Some(scheme) = name
            .strip_suffix("_proxy")
            .or_else(|| name.strip_suffix("_PROXY"))
        else {
            continue;
        };
        let key = scheme.to_ascii_lowercase();
        if !PROXY_SCHEMES.contains(&key.as_str()) {
            continue;
        }
        let target = if name.ends_with("_proxy") { &mut lower } else { &mut upper };
        target.insert(key, value.to_string());
    }

    upper.extend(lower);
    upper
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn proxies_prefer_lowercase() {
        let proxies = proxies_from_vars(vars(&[
            ("HTTPS_PROXY", "http://upper:3128"),
            ("https_proxy", "http://lower:3128"),
            ("HTTP_PROXY", "http://plain:8080"),
            ("NO_PROXY", "localhost,127.0.0.1"),
        ]));
        assert_eq!(proxies["https"], "http://lower:3128");
        assert_eq!(proxies["http"], "http://plain:8080");
        assert_eq!(proxies["no"], "localhost,127.0.0.1");
    }

    #[test]
    fn proxies_ignore_unrelated_and_empty() {
        let proxies = proxies_from_vars(vars(&[
            ("FTP_PROXY", "http://ftp:21"),
            ("HTTP_PROXY", " "),
            ("PATH", "/usr/bin"),
        ]));
        assert!(proxies.is_empty());
    }

    #[test]
    fn new_rejects_relative_base() {
        assert!(SessionConfig::new("pixeldrain.com/api").is_err());
    }

    #[test]
    fn every_call_returns_independent_defaults() {
        let a = SessionConfig::new("https://pixeldrain.com/api/").unwrap().token("a");
        let b = SessionConfig::new("https://pixeldrain.com/api/").unwrap();
        assert_eq!(a.token.as_deref(), Some("a"));
        assert_eq!(b.token, None);
        assert_eq!(b.timeout, Timeout::default());
        assert_eq!(b.retry_policy, RetryPolicy::default());
        assert_eq!(b.encoding, "utf-8");
    }

    #[test]
    fn debug_hides_token() {
        let config = SessionConfig::new("https://pixeldrain.com/api/").unwrap().token("hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
