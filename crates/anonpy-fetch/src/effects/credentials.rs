use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::core::url_scheme;
use crate::data::Authorization;
use crate::effects::http::HttpClient;
use crate::effects::session::Session;
use crate::error::{Error, Result};

/// Base64 of the raw token, as sent after `Basic `.
pub fn basic_credentials(token: &str) -> String { STANDARD.encode(token.as_bytes()) }

impl<C: HttpClient> Session<C> {
    /// Install an `Authorization` default header derived from `token`.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for [`Authorization::Digest`], which no
    /// provider requires yet.
    pub fn apply_credentials(&mut self, scheme: Authorization, token: &str) -> Result<()> {
        match scheme {
            Authorization::Basic => {
                if url_scheme(&self.config().base_api_url).as_deref() == Some("http") {
                    tracing::warn!(
                        target: "anonpy::security",
                        base = %self.config().base_api_url,
                        "basic credentials will be sent over plain HTTP"
                    );
                }
                let encoded = basic_credentials(token);
                self.set_default_header("Authorization", format!("Basic {encoded}"));
                self.credentials = Some(encoded);
                Ok(())
            }
            Authorization::Digest => Err(Error::Configuration(
                "digest authorization is not implemented".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SessionConfig;
    use crate::effects::http::{HttpRequest, HttpResponse};

    struct Null;

    impl HttpClient for Null {
        fn execute(&self, _: HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse::from_bytes(200, "", ""))
        }
    }

    fn session(base: &str) -> Session<Null> {
        Session::new(SessionConfig::new(base).unwrap(), Null)
    }

    #[test]
    fn basic_sets_default_header() {
        let mut session = session("https://pixeldrain.com/api/");
        session.apply_credentials(Authorization::Basic, "secret").unwrap();

        assert_eq!(session.credentials(), Some("c2VjcmV0"));
        let header = session
            .default_headers()
            .iter()
            .find(|(name, _)| name == "Authorization")
            .map(|(_, value)| value.as_str());
        assert_eq!(header, Some("Basic c2VjcmV0"));
    }

    #[test]
    fn reapplying_replaces_header() {
        let mut session = session("http://localhost:8080/api/");
        session.apply_credentials(Authorization::Basic, "one").unwrap();
        session.apply_credentials(Authorization::Basic, "two").unwrap();
        let count = session
            .default_headers()
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .count();
        assert_eq!(count, 1);
        assert_eq!(session.credentials(), Some(basic_credentials("two").as_str()));
    }

    #[test]
    fn digest_is_rejected() {
        let mut session = session("https://pixeldrain.com/api/");
        let err = session.apply_credentials(Authorization::Digest, "secret").unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("not implemented")));
        assert!(session.credentials().is_none());
    }
}
