//! Error types for App Proxy request handling.
//!
//! # Error Types
//!
//! - [`ProxyError::MisconfiguredSecret`]: no shared secret is configured
//! - [`ProxyError::MissingSignature`]: the request has no `signature` parameter
//! - [`ProxyError::SignatureMismatch`]: the signature does not match
//! - [`ProxyError::MissingRequiredParameter`]: a verified request lacks a required parameter
//! - [`ProxyError::CustomerMismatch`]: the requested customer is not the logged-in customer
//! - [`ProxyError::UnknownRoute`]: no route matches the request
//! - [`ProxyError::UpstreamCallFailure`]: the subscription API call failed
//!
//! # Example
//!
//! ```rust
//! use app_proxy::proxy::ProxyError;
//!
//! let error = ProxyError::SignatureMismatch;
//! assert_eq!(error.status_code(), 401);
//! assert_eq!(error.public_message(), "Bad proxy signature");
//! ```

use thiserror::Error;

use crate::clients::HttpError;

/// Errors that stop an App Proxy request from being serviced.
///
/// Every variant maps to exactly one HTTP status through
/// [`ProxyError::status_code`]. Signature problems all become `401` and
/// share one public message, so a caller cannot tell which check failed.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No shared secret is configured for the process.
    #[error("App Proxy shared secret is not configured")]
    MisconfiguredSecret,

    /// The `signature` parameter is absent from the query string.
    #[error("Request has no signature parameter")]
    MissingSignature,

    /// The supplied signature does not match the computed one.
    #[error("Request signature does not match")]
    SignatureMismatch,

    /// A signed request lacks a parameter the gate requires.
    #[error("Missing required parameter: '{name}'")]
    MissingRequiredParameter {
        /// The name of the missing parameter.
        name: &'static str,
    },

    /// `customer_id` names a different customer than `logged_in_customer_id`.
    #[error("Requested customer '{requested}' does not match logged-in customer '{logged_in}'")]
    CustomerMismatch {
        /// The decoded `customer_id` value.
        requested: String,
        /// The decoded `logged_in_customer_id` value.
        logged_in: String,
    },

    /// No route matches the method and path.
    #[error("No route for {method} {path}")]
    UnknownRoute {
        /// The request method.
        method: String,
        /// The path after the proxy prefix was stripped.
        path: String,
    },

    /// The subscription API call failed.
    #[error("Subscription API call failed: {message}")]
    UpstreamCallFailure {
        /// A message safe to return to the caller.
        message: String,
    },
}

impl ProxyError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingSignature
            | Self::SignatureMismatch
            | Self::MissingRequiredParameter { .. } => 401,
            Self::CustomerMismatch { .. } => 403,
            Self::UnknownRoute { .. } => 404,
            Self::MisconfiguredSecret | Self::UpstreamCallFailure { .. } => 500,
        }
    }

    /// Returns the message placed in the response body.
    ///
    /// Authentication failures collapse to one generic message. Customer
    /// identifiers are not echoed back.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingSignature
            | Self::SignatureMismatch
            | Self::MissingRequiredParameter { .. } => "Bad proxy signature".to_string(),
            Self::CustomerMismatch { .. } => "Customer mismatch".to_string(),
            Self::MisconfiguredSecret => "Server misconfigured".to_string(),
            Self::UnknownRoute { .. } => "Not found".to_string(),
            Self::UpstreamCallFailure { message } => message.clone(),
        }
    }

    /// Returns a short, stable name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MisconfiguredSecret => "misconfigured_secret",
            Self::MissingSignature => "missing_signature",
            Self::SignatureMismatch => "signature_mismatch",
            Self::MissingRequiredParameter { .. } => "missing_required_parameter",
            Self::CustomerMismatch { .. } => "customer_mismatch",
            Self::UnknownRoute { .. } => "unknown_route",
            Self::UpstreamCallFailure { .. } => "upstream_call_failure",
        }
    }
}

impl From<HttpError> for ProxyError {
    fn from(error: HttpError) -> Self {
        let message = match &error {
            HttpError::Response(e) => e.message.clone(),
            HttpError::MaxRetries(e) => e.message.clone(),
            HttpError::InvalidRequest(_) | HttpError::Network(_) => "Server error".to_string(),
        };
        Self::UpstreamCallFailure { message }
    }
}
