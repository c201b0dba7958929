//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;

/// The App Proxy shared secret used to verify request signatures.
///
/// This newtype ensures the secret is non-empty and masks its value
/// in debug output to prevent accidental exposure in logs.
///
/// # Security
///
/// The `Debug` implementation masks the secret value, displaying only
/// `SharedSecret(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use app_proxy::SharedSecret;
///
/// let secret = SharedSecret::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "SharedSecret(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Creates a new validated shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptySharedSecret`] if the secret is empty.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySharedSecret);
        }
        Ok(Self(secret))
    }
}

impl AsRef<str> for SharedSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(*****)")
    }
}

/// A bearer token for the subscription API.
///
/// Masked in debug output like [`SharedSecret`].
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a new validated API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ConfigError::EmptyApiToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(*****)")
    }
}

/// A validated base URL for the subscription API.
///
/// Accepts `scheme://host[:port][/path]`. A trailing `/` is trimmed so that
/// request paths can be appended directly.
///
/// # Example
///
/// ```rust
/// use app_proxy::ApiBaseUrl;
///
/// let url = ApiBaseUrl::new("https://subscription-admin.example.com/api/").unwrap();
/// assert_eq!(url.as_ref(), "https://subscription-admin.example.com/api");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), "subscription-admin.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiBaseUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
}

impl ApiBaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiBaseUrl`] if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let url = url.trim().trim_end_matches('/').to_string();

        // Find scheme
        let scheme_end = url
            .find("://")
            .ok_or_else(|| ConfigError::InvalidApiBaseUrl { url: url.clone() })?;

        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidApiBaseUrl { url: url.clone() });
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(ConfigError::InvalidApiBaseUrl { url: url.clone() });
        }

        // A base URL has no query or fragment of its own
        let remainder = &url[host_start..];
        if remainder.contains(['?', '#']) {
            return Err(ConfigError::InvalidApiBaseUrl { url: url.clone() });
        }

        let host_end = remainder
            .find([':', '/'])
            .map_or(url.len(), |i| host_start + i);

        if host_end == host_start {
            return Err(ConfigError::InvalidApiBaseUrl { url: url.clone() });
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
        })
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> &str {
        &self.url[self.host_start..self.host_end]
    }
}

impl AsRef<str> for ApiBaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

/// The path prefix under which the platform forwards App Proxy requests.
///
/// Must start with `/`. A trailing `/` is trimmed, and `/` alone is
/// rejected because it would strip nothing.
///
/// # Example
///
/// ```rust
/// use app_proxy::ProxyPrefix;
///
/// let prefix = ProxyPrefix::new("/api/tg-portal/").unwrap();
/// assert_eq!(prefix.as_ref(), "/api/tg-portal");
/// assert_eq!(prefix.strip("/api/tg-portal/ping"), "/ping");
/// assert_eq!(prefix.strip("/elsewhere"), "/elsewhere");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyPrefix(String);

impl ProxyPrefix {
    /// The prefix used when none is configured.
    pub const DEFAULT: &'static str = "/api/tg-portal";

    /// Creates a new validated proxy prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProxyPrefix`] if the prefix does not
    /// start with `/`, contains `?` or `#`, or is empty after trimming.
    pub fn new(prefix: impl Into<String>) -> Result<Self, ConfigError> {
        let prefix = prefix.into();
        let trimmed = prefix.trim().trim_end_matches('/');

        if !prefix.trim().starts_with('/') || trimmed.is_empty() || trimmed.contains(['?', '#'])
        {
            return Err(ConfigError::InvalidProxyPrefix { prefix });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Removes this prefix from a request path.
    ///
    /// The prefix only matches at a segment boundary. Paths that do not
    /// start with the prefix are returned unchanged.
    #[must_use]
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        match path.strip_prefix(self.0.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

impl Default for ProxyPrefix {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl AsRef<str> for ProxyPrefix {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_secret_rejects_empty_string() {
        let result = SharedSecret::new("");
        assert!(matches!(result, Err(ConfigError::EmptySharedSecret)));
    }

    #[test]
    fn test_shared_secret_masks_value_in_debug() {
        let secret = SharedSecret::new("super-secret-key").unwrap();
        let debug_output = format!("{:?}", secret);
        assert_eq!(debug_output, "SharedSecret(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_api_token_rejects_empty_and_masks_debug() {
        assert!(matches!(ApiToken::new(""), Err(ConfigError::EmptyApiToken)));

        let token = ApiToken::new("tok_123").unwrap();
        assert_eq!(format!("{:?}", token), "ApiToken(*****)");
        assert_eq!(token.as_ref(), "tok_123");
    }

    #[test]
    fn test_api_base_url_validates_format() {
        let url = ApiBaseUrl::new("https://api.example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_name(), "api.example.com");

        // With port
        let url = ApiBaseUrl::new("http://localhost:3000").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_name(), "localhost");

        // With path and trailing slash
        let url = ApiBaseUrl::new("https://api.example.com/v1/").unwrap();
        assert_eq!(url.as_ref(), "https://api.example.com/v1");
        assert_eq!(url.host_name(), "api.example.com");
    }

    #[test]
    fn test_api_base_url_rejects_invalid() {
        // No scheme
        assert!(ApiBaseUrl::new("api.example.com").is_err());

        // Empty host
        assert!(ApiBaseUrl::new("https://").is_err());
        assert!(ApiBaseUrl::new("https://:8080").is_err());

        // Invalid scheme
        assert!(ApiBaseUrl::new("://example.com").is_err());

        // Query or fragment
        assert!(ApiBaseUrl::new("https://example.com?x=1").is_err());
        assert!(ApiBaseUrl::new("https://example.com#frag").is_err());
    }

    #[test]
    fn test_proxy_prefix_normalizes_trailing_slash() {
        let prefix = ProxyPrefix::new("/apps/portal/").unwrap();
        assert_eq!(prefix.as_ref(), "/apps/portal");
    }

    #[test]
    fn test_proxy_prefix_rejects_invalid() {
        assert!(ProxyPrefix::new("").is_err());
        assert!(ProxyPrefix::new("/").is_err());
        assert!(ProxyPrefix::new("apps/portal").is_err());
        assert!(ProxyPrefix::new("/apps?x").is_err());
    }

    #[test]
    fn test_proxy_prefix_default() {
        assert_eq!(ProxyPrefix::default().as_ref(), "/api/tg-portal");
    }

    #[test]
    fn test_proxy_prefix_strip_respects_segment_boundary() {
        let prefix = ProxyPrefix::default();
        assert_eq!(prefix.strip("/api/tg-portal/ping"), "/ping");
        assert_eq!(prefix.strip("/api/tg-portal"), "");
        assert_eq!(prefix.strip("/api/tg-portalx/ping"), "/api/tg-portalx/ping");
        assert_eq!(prefix.strip("/other"), "/other");
    }
}
