//! HTTP response type for subscription API calls.

use std::collections::HashMap;

/// An HTTP response from the subscription API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lowercased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: serde_json::Value,
    /// Seconds to wait before retrying (from `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing `Retry-After` when present.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok());

        Self {
            code,
            headers,
            body,
            retry_request_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.headers
            .get("x-request-id")
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the error message carried by the body.
    ///
    /// Looks at `message`, then `error`, and falls back to
    /// `Subscription API <status>`.
    #[must_use]
    pub fn error_message(&self) -> String {
        ["message", "error"]
            .iter()
            .find_map(|field| {
                self.body
                    .get(field)
                    .and_then(serde_json::Value::as_str)
                    .filter(|message| !message.is_empty())
            })
            .map_or_else(
                || format!("Subscription API {}", self.code),
                ToString::to_string,
            )
    }
}
