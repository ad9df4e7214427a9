use crate::error::{Error, Result};

const PLACEHOLDER: &str = "{}";

/// URL path templates of one provider.
///
/// `download` and `preview` contain exactly one `{}` placeholder that is
/// replaced by the resource identifier; `upload` contains none.
///
/// # Examples
///
/// ```
/// use anonpy_fetch::Endpoint;
///
/// let endpoint = Endpoint::new("/file", "/file/{}", "/file/{}/info").unwrap();
/// assert_eq!(endpoint.preview("1tdWj9g2"), "/file/1tdWj9g2/info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    upload:   String,
    download: String,
    preview:  String,
}

impl Endpoint {
    pub fn new(
        upload: impl Into<String>,
        download: impl Into<String>,
        preview: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = Self {
            upload:   upload.into(),
            download: download.into(),
            preview:  preview.into(),
        };

        check_placeholders("upload", &endpoint.upload, 0)?;
        check_placeholders("download", &endpoint.download, 1)?;
        check_placeholders("preview", &endpoint.preview, 1)?;

        Ok(endpoint)
    }

    /// Templates of <https://pixeldrain.com/api/>.
    pub fn pixeldrain() -> Self {
        Self {
            upload:   "/file".to_string(),
            download: "/file/{}".to_string(),
            preview:  "/file/{}/info".to_string(),
        }
    }

    pub fn upload(&self) -> &str { &self.upload }

    pub fn download(&self, resource: &str) -> String { fill(&self.download, resource) }

    pub fn preview(&self, resource: &str) -> String { fill(&self.preview, resource) }

    pub fn download_template(&self) -> &str { &self.download }

    pub fn preview_template(&self) -> &str { &self.preview }
}

fn fill(template: &str, resource: &str) -> String { template.replacen(PLACEHOLDER, resource, 1) }

fn check_placeholders(name: &str, template: &str, expected: usize) -> Result<()> {
    let found = template.matches(PLACEHOLDER).count();
    if found != expected {
        return Err(Error::Configuration(format!(
            "{name} template {template:?} must contain {expected} placeholder(s), found {found}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_resource_once() {
        let endpoint = Endpoint::new("/file", "file/{}", "/file/{}/info").unwrap();
        assert_eq!(endpoint.download("abc"), "file/abc");
        assert_eq!(endpoint.preview("abc"), "/file/abc/info");
        assert_eq!(endpoint.upload(), "/file");
    }

    #[test]
    fn rejects_wrong_placeholder_counts() {
        assert!(Endpoint::new("/file/{}", "/file/{}", "/file/{}/info").is_err());
        assert!(Endpoint::new("/file", "/file", "/file/{}/info").is_err());
        assert!(Endpoint::new("/file", "/file/{}", "/file/{}/{}").is_err());
    }

    #[test]
    fn pixeldrain_preset_is_valid() {
        let preset = Endpoint::pixeldrain();
        let rebuilt = Endpoint::new(
            preset.upload(),
            preset.download_template(),
            preset.preview_template(),
        )
        .unwrap();
        assert_eq!(preset, rebuilt);
    }
}
