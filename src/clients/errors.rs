//! HTTP error types for subscription API calls.
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the API
//! - [`MaxHttpRetriesExceededError`]: When retry attempts are exhausted
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! # Example
//!
//! ```rust,ignore
//! use app_proxy::clients::{HttpError, SubscriptionApi};
//!
//! match client.call("/external/v2/subscriptions", HttpMethod::Get, None).await {
//!     Ok(body) => println!("Success: {body}"),
//!     Err(HttpError::Response(e)) => println!("API error {}: {}", e.code, e.message),
//!     Err(HttpError::MaxRetries(e)) => println!("Retries exhausted after {} tries", e.tries),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when the subscription API answers with a non-2xx status.
///
/// `message` is taken from the response body's `message` field, then its
/// `error` field, and falls back to `Subscription API <status>`.
///
/// # Example
///
/// ```rust
/// use app_proxy::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: "Subscription not found".to_string(),
///     error_reference: Some("abc-123".to_string()),
/// };
///
/// assert_eq!(error.to_string(), "Subscription not found");
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Error message extracted from the response body.
    pub message: String,
    /// Reference ID for error reporting (from X-Request-Id header).
    pub error_reference: Option<String>,
}

/// Error returned when maximum retry attempts have been exhausted.
///
/// Raised when a request keeps failing with 429 or 500 after all configured
/// attempts.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// Error message from the last response.
    pub message: String,
    /// Reference ID for error reporting (from X-Request-Id header).
    pub error_reference: Option<String>,
}

/// Error returned when an HTTP request fails validation before being sent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// The request path is not absolute.
    #[error("Request path '{path}' must start with '/'.")]
    RelativePath {
        /// The offending path.
        path: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_displays_message() {
        let error = HttpResponseError {
            code: 404,
            message: "Not Found".to_string(),
            error_reference: None,
        };
        assert_eq!(error.to_string(), "Not Found");
    }

    #[test]
    fn test_max_retries_error_message() {
        let error = MaxHttpRetriesExceededError {
            code: 429,
            tries: 3,
            message: "Rate limited".to_string(),
            error_reference: None,
        };
        let message = error.to_string();
        assert!(message.contains("Exceeded maximum retry count of 3"));
        assert!(message.contains("Rate limited"));
    }

    #[test]
    fn test_invalid_request_error_messages() {
        assert_eq!(
            InvalidHttpRequestError::MissingBodyType.to_string(),
            "Cannot set a body without also setting body_type."
        );
        let error = InvalidHttpRequestError::RelativePath {
            path: "subscriptions".to_string(),
        };
        assert!(error.to_string().contains("'subscriptions'"));
    }

    #[test]
    fn test_http_error_wraps_variants_transparently() {
        let error: HttpError = HttpResponseError {
            code: 400,
            message: "Bad input".to_string(),
            error_reference: None,
        }
        .into();
        assert_eq!(error.to_string(), "Bad input");

        let error: HttpError = InvalidHttpRequestError::MissingBodyType.into();
        assert!(matches!(
            error,
            HttpError::InvalidRequest(InvalidHttpRequestError::MissingBodyType)
        ));
    }
}
