use crate::utils::error::{ErrorKind, Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The local JSON document. Its shape is never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceDocument(pub serde_json::Value);

impl PriceDocument {
    pub fn from_slice(path: &str, bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map(Self)
            .map_err(|source| SyncError::InputParseError {
                path: path.to_string(),
                source,
            })
    }

    pub fn value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Credential sent in the access key header. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey(String);

impl AccessKey {
    /// Builds a key from raw credential file content.
    ///
    /// A single trailing line terminator is stripped; everything else is kept
    /// verbatim. Empty keys and keys that cannot travel in an HTTP header are
    /// rejected up front.
    pub fn from_raw(raw: &str) -> Result<Self> {
        let key = raw
            .strip_suffix("\r\n")
            .or_else(|| raw.strip_suffix('\n'))
            .unwrap_or(raw);

        if key.is_empty() {
            return Err(SyncError::CredentialInvalidError {
                reason: "access key is empty".to_string(),
            });
        }

        if reqwest::header::HeaderValue::from_str(key).is_err() {
            return Err(SyncError::CredentialInvalidError {
                reason: "access key contains characters not allowed in an HTTP header".to_string(),
            });
        }

        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessKey(***)")
    }
}

/// A 2xx reply from the bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadReceipt {
    pub status: u16,
    pub response: serde_json::Value,
}

/// Machine-readable summary of one run, printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub success: bool,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
}

impl SyncReport {
    pub fn from_result(result: &Result<UploadReceipt>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                exit_code: 0,
                error_kind: None,
                message: "update successful".to_string(),
                status: Some(receipt.status),
                response: Some(receipt.response.clone()),
            },
            Err(e) => Self::from_error(e),
        }
    }

    pub fn from_error(error: &SyncError) -> Self {
        let response = match error {
            SyncError::HttpStatusError { body, .. } => Some(serde_json::Value::String(body.clone())),
            _ => None,
        };

        Self {
            success: false,
            exit_code: error.exit_code(),
            error_kind: Some(error.kind()),
            message: error.to_string(),
            status: error.status(),
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_keeps_arbitrary_shape() {
        let doc = PriceDocument::from_slice("prices.json", br#"[1, "two", {"three": 3.0}]"#).unwrap();
        assert_eq!(doc.value(), &json!([1, "two", {"three": 3.0}]));

        let doc = PriceDocument::from_slice("prices.json", b"42").unwrap();
        assert_eq!(doc.value(), &json!(42));
    }

    #[test]
    fn test_document_parse_error_names_path() {
        let err = PriceDocument::from_slice("data/prices.json", br#"{"a": }"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputParse);
        assert!(err.to_string().contains("data/prices.json"));
    }

    #[test]
    fn test_access_key_strips_single_line_terminator() {
        assert_eq!(AccessKey::from_raw("secret123\n").unwrap().expose(), "secret123");
        assert_eq!(AccessKey::from_raw("secret123\r\n").unwrap().expose(), "secret123");
        assert_eq!(AccessKey::from_raw("secret123").unwrap().expose(), "secret123");
        assert_eq!(AccessKey::from_raw(" secret123 ").unwrap().expose(), " secret123 ");
    }

    #[test]
    fn test_access_key_rejects_unusable_values() {
        assert_eq!(
            AccessKey::from_raw("").unwrap_err().kind(),
            ErrorKind::CredentialInvalid
        );
        assert_eq!(
            AccessKey::from_raw("\n").unwrap_err().kind(),
            ErrorKind::CredentialInvalid
        );
        assert_eq!(
            AccessKey::from_raw("line1\nline2\n").unwrap_err().kind(),
            ErrorKind::CredentialInvalid
        );
    }

    #[test]
    fn test_access_key_debug_is_redacted() {
        let key = AccessKey::from_raw("secret123").unwrap();
        assert!(!format!("{:?}", key).contains("secret123"));
    }

    #[test]
    fn test_report_from_http_error() {
        let result: Result<UploadReceipt> = Err(SyncError::HttpStatusError {
            status: 401,
            body: "unauthorized".to_string(),
        });
        let report = SyncReport::from_result(&result);

        assert!(!report.success);
        assert_eq!(report.exit_code, 6);
        assert_eq!(report.status, Some(401));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error_kind"], "http_status");
        assert_eq!(json["response"], "unauthorized");
    }

    #[test]
    fn test_report_from_success() {
        let result: Result<UploadReceipt> = Ok(UploadReceipt {
            status: 200,
            response: json!({"record": {"widget": 9.99}}),
        });
        let json = serde_json::to_value(SyncReport::from_result(&result)).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["exit_code"], 0);
        assert!(json.get("error_kind").is_none());
        assert_eq!(json["response"]["record"]["widget"], 9.99);
    }
}
