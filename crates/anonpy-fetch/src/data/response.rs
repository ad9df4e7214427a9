use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub resource: String,
    pub name:     String,
    pub size:     u64,
    pub url:      String,
}

/// Metadata of a remote resource.
///
/// The typed fields cover what every provider returns; `fields` keeps the
/// complete JSON object so that provider-specific keys (`downloads`,
/// `hash_sha256`, ...) stay accessible.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewResult {
    pub resource: String,
    pub name:     String,
    pub size:     u64,
    pub url:      String,
    pub fields:   Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    pub resource: String,
    pub name:     String,
    pub size:     u64,
    pub url:      String,
    pub path:     PathBuf,
}

impl PreviewResult {
    /// Decode a preview body. `requested` is used when the body carries no `id`.
    pub fn from_json(value: Value, requested: &str, url: String) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(Error::Decode("preview response is not a JSON object".to_string()));
        };

        if let Some(rejection) = rejection(&fields) {
            return Err(rejection);
        }

        let resource = fields
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(requested)
            .to_string();
        let name = fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(&resource)
            .to_string();
        let size = fields
            .get("size")
            .and_then(coerce_size)
            .ok_or_else(|| Error::Decode("preview response has no valid size".to_string()))?;

        Ok(Self {
            resource,
            name,
            size,
            url,
            fields,
        })
    }

    pub fn field(&self, key: &str) -> Option<&Value> { self.fields.get(key) }

    pub fn field_count(&self) -> usize { self.fields.len() }

    pub fn downloads(&self) -> Option<u64> { self.field("downloads").and_then(coerce_size) }

    /// SHA-256 digest published by the provider, if any.
    pub fn hash_sha256(&self) -> Option<&str> {
        self.field("hash_sha256")
            .and_then(Value::as_str)
            .filter(|hash| !hash.is_empty())
    }
}

/// Body returned by an upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UploadResponse {
    pub success: Option<bool>,
    pub id:      Option<String>,
    pub url:     Option<String>,
    pub value:   Option<String>,
    pub message: Option<String>,
}

impl UploadResponse {
    pub(crate) fn into_checked(self) -> Result<Self> {
        if self.success == Some(false) {
            return Err(Error::Rejected {
                value:   self.value.unwrap_or_else(|| "unknown".to_string()),
                message: self.message.unwrap_or_default(),
            });
        }
        if self.id.is_none() && self.url.is_none() {
            return Err(Error::Decode(
                "upload response contains neither an id nor a url".to_string(),
            ));
        }
        Ok(self)
    }
}

fn rejection(fields: &Map<String, Value>) -> Option<Error> {
    (fields.get("success") == Some(&Value::Bool(false))).then(|| Error::Rejected {
        value:   fields
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        message: fields
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Sizes arrive as integers, floats or numeric strings depending on the provider.
fn coerce_size(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_size_variants() {
        assert_eq!(coerce_size(&json!(453281)), Some(453281));
        assert_eq!(coerce_size(&json!(10.0)), Some(10));
        assert_eq!(coerce_size(&json!("42")), Some(42));
        assert_eq!(coerce_size(&json!(-1)), None);
        assert_eq!(coerce_size(&json!(1.5)), None);
        assert_eq!(coerce_size(&json!(null)), None);
    }

    #[test]
    fn preview_falls_back_to_requested_id() {
        let preview = PreviewResult::from_json(
            json!({"name": "a.txt", "size": "3"}),
            "abc",
            "https://host/api/file/abc".into(),
        )
        .unwrap();
        assert_eq!(preview.resource, "abc");
        assert_eq!(preview.size, 3);
        assert_eq!(preview.hash_sha256(), None);
    }

    #[test]
    fn preview_rejects_unsuccessful_body() {
        let result = PreviewResult::from_json(
            json!({"success": false, "value": "file_not_found"}),
            "abc",
            String::new(),
        );
        assert!(matches!(result, Err(Error::Rejected { value, .. }) if value == "file_not_found"));
    }

    #[test]
    fn preview_requires_size() {
        assert!(matches!(
            PreviewResult::from_json(json!({"id": "abc"}), "abc", String::new()),
            Err(Error::Decode(_))
        ));
        assert!(PreviewResult::from_json(json!([1, 2]), "abc", String::new()).is_err());
    }

    #[test]
    fn upload_response_checks() {
        let ok: UploadResponse =
            serde_json::from_value(json!({"success": true, "id": "x"})).unwrap();
        assert!(ok.into_checked().is_ok());

        let rejected: UploadResponse = serde_json::from_value(json!({
            "success": false,
            "value": "file_too_large",
            "message": "The file you tried to upload is too large"
        }))
        .unwrap();
        assert!(matches!(rejected.into_checked(), Err(Error::Rejected { .. })));

        let empty: UploadResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(matches!(empty.into_checked(), Err(Error::Decode(_))));
    }
}
