//! Configuration error types.
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use app_proxy::{SharedSecret, ConfigError};
//!
//! let result = SharedSecret::new("");
//! assert!(matches!(result, Err(ConfigError::EmptySharedSecret)));
//! ```

use thiserror::Error;

/// Errors that can occur while building the proxy configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The App Proxy shared secret cannot be empty.
    #[error("App Proxy shared secret cannot be empty. Leave it unset to reject all requests.")]
    EmptySharedSecret,

    /// The subscription API token cannot be empty.
    #[error("Subscription API token cannot be empty. Please provide a valid bearer token.")]
    EmptyApiToken,

    /// The subscription API base URL is invalid.
    #[error("Invalid API base URL '{url}'. Please provide a URL with scheme and host (e.g., 'https://api.example.com').")]
    InvalidApiBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// The proxy path prefix is invalid.
    #[error("Invalid proxy prefix '{prefix}'. Expected an absolute path such as '/apps/portal'.")]
    InvalidProxyPrefix {
        /// The invalid prefix that was provided.
        prefix: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_shared_secret_error_message() {
        let message = ConfigError::EmptySharedSecret.to_string();
        assert!(message.contains("shared secret cannot be empty"));
    }

    #[test]
    fn test_invalid_api_base_url_error_message() {
        let error = ConfigError::InvalidApiBaseUrl {
            url: "not a url".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("not a url"));
        assert!(message.contains("scheme and host"));
    }

    #[test]
    fn test_invalid_proxy_prefix_error_message() {
        let error = ConfigError::InvalidProxyPrefix {
            prefix: "apps".to_string(),
        };
        assert!(error.to_string().contains("'apps'"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyApiToken;
        let _: &dyn std::error::Error = &error;
    }
}
