use crate::error::{Error, Result};

/// Join a base URL and a relative path with exactly one slash between them.
///
/// # Examples
///
/// ```
/// use anonpy_fetch::core::join_url;
///
/// let expected = "https://pixeldrain.com/api/file";
/// assert_eq!(join_url("https://pixeldrain.com/api", "file"), expected);
/// assert_eq!(join_url("https://pixeldrain.com/api/", "/file"), expected);
/// assert_eq!(join_url("https://pixeldrain.com/api//", "//file"), expected);
/// ```
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// Scheme of an absolute URL, lowercased.
pub fn url_scheme(url: &str) -> Option<String> {
    url.split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .filter(|scheme| !scheme.is_empty())
}

/// Accept only absolute `http` and `https` URLs with a host.
pub fn validate_base_url(url: &str) -> Result<String> {
    let url = url.trim();
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(Error::InvalidUrl(format!("{url} is not an absolute URL")));
    };

    if !matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https") {
        return Err(Error::InvalidUrl(format!("unsupported scheme {scheme:?} in {url}")));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if host.is_empty() {
        return Err(Error::InvalidUrl(format!("{url} has no host")));
    }

    Ok(url.to_string())
}

/// Resource identifier from either a bare id or a share URL.
///
/// The identifier is the last non-empty path segment of the URL, so
/// `https://pixeldrain.com/u/1tdWj9g2` and `1tdWj9g2` name the same resource.
pub fn resource_from_url(input: &str) -> Option<String> {
    let input = input.trim();
    let Some((_, rest)) = input.split_once("://") else {
        return (!input.is_empty() && !input.contains('/')).then(|| input.to_string());
    };

    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let mut segments = rest.split('/');
    // skip the authority
    segments.next();
    segments
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_string)
}

/// File name announced by a `Content-Disposition` header.
///
/// `filename*` (RFC 5987) wins over `filename`. The result is reduced to its
/// final path component.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let value = value.trim().trim_matches('"');
                // charset'language'percent-encoded
                let encoded = value.splitn(3, '\'').nth(2).unwrap_or(value);
                extended = percent_decode(encoded);
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_string()),
            _ => {}
        }
    }

    extended.or(plain).and_then(|name| sanitize_file_name(&name))
}

/// Strip directories from a server-provided name so that it cannot escape
/// the download directory.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = input.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_redundant_slashes() {
        let expected = "https://mock.provider.com/api/file/abc";
        for base_slashes in 0..3 {
            for path_slashes in 0..3 {
                let base = format!("https://mock.provider.com/api{}", "/".repeat(base_slashes));
                let path = format!("{}file/abc", "/".repeat(path_slashes));
                assert_eq!(join_url(&base, &path), expected, "{base} + {path}");
            }
        }
    }

    #[test]
    fn validate_base_url_accepts_http_and_https() {
        assert!(validate_base_url("https://pixeldrain.com/api/").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn validate_base_url_rejects_garbage() {
        assert!(validate_base_url("pixeldrain.com/api").is_err());
        assert!(validate_base_url("ftp://pixeldrain.com").is_err());
        assert!(validate_base_url("https:///api").is_err());
    }

    #[test]
    fn url_scheme_is_lowercased() {
        assert_eq!(url_scheme("HTTP://example.com").as_deref(), Some("http"));
        assert_eq!(url_scheme("example.com"), None);
    }

    #[test]
    fn resource_from_share_url_and_bare_id() {
        assert_eq!(resource_from_url("1tdWj9g2").as_deref(), Some("1tdWj9g2"));
        assert_eq!(
            resource_from_url("https://pixeldrain.com/u/1tdWj9g2").as_deref(),
            Some("1tdWj9g2")
        );
        assert_eq!(
            resource_from_url("https://pixeldrain.com/u/1tdWj9g2/?embed#top").as_deref(),
            Some("1tdWj9g2")
        );
        assert_eq!(resource_from_url("https://pixeldrain.com/"), None);
        assert_eq!(resource_from_url("  "), None);
    }

    #[test]
    fn content_disposition_plain_and_extended() {
        assert_eq!(
            content_disposition_filename(r#"attachment; filename="inkscape.exe""#).as_deref(),
            Some("inkscape.exe")
        );
        assert_eq!(
            content_disposition_filename(
                r#"attachment; filename="fallback.txt"; filename*=UTF-8''na%C3%AFve%20file.txt"#
            )
            .as_deref(),
            Some("naïve file.txt")
        );
        assert_eq!(content_disposition_filename("inline"), None);
    }

    #[test]
    fn content_disposition_cannot_escape_directory() {
        assert_eq!(
            content_disposition_filename(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(content_disposition_filename(r#"attachment; filename="..""#), None);
    }
}
