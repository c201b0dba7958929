//! JSON responses produced by the gate.

use serde::Serialize;
use serde_json::{json, Value};

use crate::proxy::ProxyError;

/// Content type of every gate response.
pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A framework-agnostic HTTP response: a status code and a JSON body.
///
/// Bodies always carry an `ok` discriminator. Error bodies are
/// `{"ok": false, "error": <message>}` and never include digests, canonical
/// strings or secrets.
///
/// Serializes as `{"status": ..., "body": ...}` for frameworks that forward
/// a whole response object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GateResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The JSON body.
    pub body: Value,
}

impl GateResponse {
    /// A `200` response with the given body.
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// The response for a rejected or failed request.
    #[must_use]
    pub fn from_error(error: &ProxyError) -> Self {
        Self {
            status: error.status_code(),
            body: json!({ "ok": false, "error": error.public_message() }),
        }
    }

    /// Returns the content type of the response.
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    /// Returns `true` if the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }
}

impl From<ProxyError> for GateResponse {
    fn from(error: ProxyError) -> Self {
        Self::from_error(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = GateResponse::from_error(&ProxyError::SignatureMismatch);
        assert_eq!(response.status, 401);
        assert_eq!(
            response.body,
            json!({"ok": false, "error": "Bad proxy signature"})
        );
        assert!(!response.is_success());
    }

    #[test]
    fn test_customer_mismatch_does_not_echo_ids() {
        let response: GateResponse = ProxyError::CustomerMismatch {
            requested: "5".to_string(),
            logged_in: "9".to_string(),
        }
        .into();
        assert_eq!(response.status, 403);
        let body = response.body.to_string();
        assert!(!body.contains('5'));
        assert!(!body.contains('9'));
    }

    #[test]
    fn test_ok_response() {
        let response = GateResponse::ok(json!({"ok": true}));
        assert_eq!(response.status, 200);
        assert!(response.is_success());
        assert_eq!(response.content_type(), "application/json; charset=utf-8");
    }

    #[test]
    fn test_serializes_status_and_body() {
        let response = GateResponse::from_error(&ProxyError::UnknownRoute {
            method: "GET".to_string(),
            path: "/nope".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": 404, "body": {"ok": false, "error": "Not found"}})
        );
    }
}
