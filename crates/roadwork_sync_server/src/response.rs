//! HTTP responses and JSON envelopes.

use crate::error::ServerError;
use roadwork_sync_engine::SyncReport;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Methods listed in `Access-Control-Allow-Methods`.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Headers listed in `Access-Control-Allow-Headers`.
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// A transport-independent HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response headers, CORS headers first.
    pub headers: Vec<(&'static str, String)>,
    /// JSON body; `None` for an empty body.
    pub body: Option<JsonValue>,
}

impl HttpResponse {
    fn new(status: u16, allowed_origin: &str, body: Option<JsonValue>) -> Self {
        let mut headers = vec![
            ("Access-Control-Allow-Origin", allowed_origin.to_string()),
            ("Access-Control-Allow-Methods", ALLOWED_METHODS.to_string()),
            ("Access-Control-Allow-Headers", ALLOWED_HEADERS.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    /// `204 No Content` answer to a preflight request.
    pub fn preflight(allowed_origin: &str) -> Self {
        Self::new(204, allowed_origin, None)
    }

    /// `200 OK` carrying a sync report.
    pub fn success(allowed_origin: &str, report: &SyncReport) -> Self {
        let envelope = SuccessEnvelope {
            success: true,
            report,
        };
        match serde_json::to_value(envelope) {
            Ok(body) => Self::new(200, allowed_origin, Some(body)),
            Err(err) => Self::error(
                allowed_origin,
                &ServerError::Internal(format!("failed to encode report: {err}")),
            ),
        }
    }

    /// Error envelope with the status code of `error`.
    pub fn error(allowed_origin: &str, error: &ServerError) -> Self {
        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": error.code(),
                "message": error.to_string(),
            },
        });
        Self::new(error.status_code(), allowed_origin, Some(body))
    }

    /// Returns the value of a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as a JSON string; empty for bodyless responses.
    pub fn body_string(&self) -> String {
        self.body.as_ref().map(JsonValue::to_string).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct SuccessEnvelope<'a> {
    success: bool,
    #[serde(flatten)]
    report: &'a SyncReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roadwork_sync_engine::SyncError;
    use std::collections::BTreeMap;

    #[test]
    fn preflight_has_cors_and_no_body() {
        let response = HttpResponse::preflight("*");
        assert_eq!(response.status, 204);
        assert!(response.body.is_none());
        assert_eq!(response.header("access-control-allow-origin"), Some("*"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("POST, OPTIONS")
        );
        assert_eq!(response.header("Content-Type"), None);
        assert_eq!(response.body_string(), "");
    }

    #[test]
    fn success_envelope_flattens_report() {
        let report = SyncReport {
            synced: 0,
            timestamp: Utc::now(),
            data: BTreeMap::new(),
            updated: BTreeMap::new(),
        };
        let response = HttpResponse::success("https://app.example", &report);
        let body = response.body.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["synced"], 0);
        assert!(body["timestamp"].is_string());
        assert_eq!(body["data"], serde_json::json!({}));
        assert_eq!(body["updated"], serde_json::json!({}));
    }

    #[test]
    fn error_envelope() {
        let err = ServerError::from(SyncError::InvalidConfig("bad".into()));
        let response = HttpResponse::error("*", &err);
        let body = response.body.unwrap();

        assert_eq!(response.status, 500);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "SYNC_ERROR");
        assert_eq!(body["error"]["message"], "invalid sync configuration: bad");
    }
}
