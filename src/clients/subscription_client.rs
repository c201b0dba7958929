//! HTTP client for the subscription management API.
//!
//! The gate only needs one capability from the subscription API:
//! `call(path, method, body) -> JSON`. That capability is the
//! [`SubscriptionApi`] trait. [`SubscriptionClient`] implements it over
//! `reqwest` with a bearer token and bounded retries.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use crate::clients::errors::{HttpError, HttpResponseError, MaxHttpRetriesExceededError};
use crate::clients::http_request::{DataType, HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ProxyConfig, SubscriptionApiConfig};

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Upper bound in seconds on a `Retry-After` wait.
pub const MAX_RETRY_WAIT_TIME: u64 = 60;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A generic JSON call into the subscription API.
///
/// Implementations must be shareable across concurrent requests.
pub trait SubscriptionApi: Send + Sync {
    /// Calls `path` with `method`, sending `body` as JSON when present,
    /// and returns the parsed JSON response body.
    fn call(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<serde_json::Value>,
    ) -> impl Future<Output = Result<serde_json::Value, HttpError>> + Send;
}

/// HTTP client for the subscription API.
///
/// The client handles:
/// - Base URL joining
/// - Default headers including User-Agent and bearer token
/// - Automatic retry logic for 429 and 500 responses
///
/// # Example
///
/// ```rust,ignore
/// use app_proxy::clients::{HttpMethod, SubscriptionApi, SubscriptionClient};
///
/// let client = SubscriptionClient::new(&api_config, None)?;
/// let subscriptions = client
///     .call("/external/v2/subscriptions?customerId=42", HttpMethod::Get, None)
///     .await?;
/// ```
pub struct SubscriptionClient {
    client: reqwest::Client,
    base_uri: String,
    default_headers: HashMap<String, String>,
    tries: u32,
}

impl fmt::Debug for SubscriptionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionClient")
            .field("base_uri", &self.base_uri)
            .field("default_headers", &"*****")
            .field("tries", &self.tries)
            .finish_non_exhaustive()
    }
}

// Verify SubscriptionClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SubscriptionClient>();
};

impl SubscriptionClient {
    /// Creates a new client for the given API settings.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying `reqwest` client
    /// cannot be created (e.g., TLS initialization failure).
    pub fn new(api: &SubscriptionApiConfig, user_agent_prefix: Option<&str>) -> Result<Self, HttpError> {
        let user_agent_prefix =
            user_agent_prefix.map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}App Proxy Gate v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", api.api_token().as_ref()),
        );

        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            base_uri: api.base_url().as_ref().to_string(),
            default_headers,
            tries: 1,
        })
    }

    /// Creates a client from the process configuration.
    ///
    /// Returns `Ok(None)` when no subscription API is configured.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the `reqwest` client cannot be created.
    pub fn from_config(config: &ProxyConfig) -> Result<Option<Self>, HttpError> {
        config
            .subscription_api()
            .map(|api| Self::new(api, config.user_agent_prefix()))
            .transpose()
    }

    /// Sets how many times [`SubscriptionApi::call`] attempts each request.
    #[must_use]
    pub const fn with_tries(mut self, tries: u32) -> Self {
        self.tries = tries;
        self
    }

    /// Returns the base URI for this client.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends an HTTP request to the subscription API.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = format!("{}{}", self.base_uri, request.path);

        // Merge headers
        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }

        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let mut req_builder = match request.http_method {
                HttpMethod::Get => self.client.get(&url),
                HttpMethod::Post => self.client.post(&url),
                HttpMethod::Put => self.client.put(&url),
                HttpMethod::Delete => self.client.delete(&url),
            };

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.to_string());
            }

            tracing::debug!(
                method = %request.http_method,
                path = %request.path,
                attempt = tries,
                "Calling subscription API"
            );

            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();

            let body = if body_text.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&body_text).unwrap_or_else(|_| {
                    // For 5xx errors, return raw body as string value
                    if code >= 500 {
                        serde_json::json!({ "raw_body": body_text })
                    } else {
                        serde_json::json!({})
                    }
                })
            };

            let response = HttpResponse::new(code, res_headers, body);

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = response.error_message();
            let error_reference = response.request_id().map(String::from);

            let should_retry = code == 429 || code == 500;
            if !should_retry || request.tries <= 1 {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference,
                }));
            }

            if tries >= request.tries {
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: request.tries,
                    message: error_message,
                    error_reference,
                }));
            }

            let delay = Self::calculate_retry_delay(&response, code);
            tracing::warn!(
                path = %request.path,
                status = code,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Subscription API call failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    fn calculate_retry_delay(response: &HttpResponse, status: u16) -> std::time::Duration {
        // For 429: use Retry-After if present, otherwise fixed delay
        // For 500: always use fixed delay (ignore Retry-After)
        let fixed = std::time::Duration::from_secs(RETRY_WAIT_TIME);
        if status != 429 {
            return fixed;
        }
        response
            .retry_request_after
            .and_then(|secs| std::time::Duration::try_from_secs_f64(secs).ok())
            .map_or(fixed, |delay| {
                delay.min(std::time::Duration::from_secs(MAX_RETRY_WAIT_TIME))
            })
    }
}

impl SubscriptionApi for SubscriptionClient {
    async fn call(
        &self,
        path: &str,
        method: HttpMethod,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, HttpError> {
        let mut builder = HttpRequest::builder(method, path).tries(self.tries);
        if let Some(body) = body {
            builder = builder.body(body).body_type(DataType::Json);
        }
        let response = self.request(builder.build()?).await?;
        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiBaseUrl, ApiToken};

    fn create_test_api() -> SubscriptionApiConfig {
        SubscriptionApiConfig::new(
            ApiBaseUrl::new("https://subscriptions.example.com/api").unwrap(),
            ApiToken::new("test-token").unwrap(),
        )
    }

    #[test]
    fn test_client_construction() {
        let client = SubscriptionClient::new(&create_test_api(), None).unwrap();
        assert_eq!(client.base_uri(), "https://subscriptions.example.com/api");
    }

    #[test]
    fn test_bearer_token_header_injection() {
        let client = SubscriptionClient::new(&create_test_api(), None).unwrap();
        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Bearer test-token".to_string())
        );
    }

    #[test]
    fn test_accept_header_is_json() {
        let client = SubscriptionClient::new(&create_test_api(), None).unwrap();
        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let client = SubscriptionClient::new(&create_test_api(), Some("Portal/1.0")).unwrap();
        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("Portal/1.0 | "));
        assert!(user_agent.contains("App Proxy Gate v"));
    }

    #[test]
    fn test_from_config_without_api_is_none() {
        let config = ProxyConfig::builder().build();
        assert!(SubscriptionClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_with_api() {
        let config = ProxyConfig::builder()
            .subscription_api(create_test_api())
            .build();
        let client = SubscriptionClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.base_uri(), "https://subscriptions.example.com/api");
    }

    #[test]
    fn test_retry_delay_uses_retry_after_only_for_429() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["2".to_string()]);
        let response = HttpResponse::new(429, headers.clone(), serde_json::json!({}));
        assert_eq!(
            SubscriptionClient::calculate_retry_delay(&response, 429),
            std::time::Duration::from_secs(2)
        );

        let response = HttpResponse::new(500, headers, serde_json::json!({}));
        assert_eq!(
            SubscriptionClient::calculate_retry_delay(&response, 500),
            std::time::Duration::from_secs(RETRY_WAIT_TIME)
        );
    }

    #[test]
    fn test_retry_delay_clamps_huge_retry_after() {
        for value in ["1e9", "1e30"] {
            let mut headers = HashMap::new();
            headers.insert("retry-after".to_string(), vec![value.to_string()]);
            let response = HttpResponse::new(429, headers, serde_json::json!({}));
            assert_eq!(
                SubscriptionClient::calculate_retry_delay(&response, 429),
                std::time::Duration::from_secs(MAX_RETRY_WAIT_TIME),
                "Retry-After {value}"
            );
        }
    }

    #[test]
    fn test_retry_delay_falls_back_on_unusable_retry_after() {
        for value in ["-1", "NaN", "inf"] {
            let mut headers = HashMap::new();
            headers.insert("retry-after".to_string(), vec![value.to_string()]);
            let response = HttpResponse::new(429, headers, serde_json::json!({}));
            assert_eq!(
                SubscriptionClient::calculate_retry_delay(&response, 429),
                std::time::Duration::from_secs(RETRY_WAIT_TIME),
                "Retry-After {value}"
            );
        }
    }

    #[test]
    fn test_debug_does_not_show_token() {
        let client = SubscriptionClient::new(&create_test_api(), None).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("test-token"));
        assert!(debug.contains("subscriptions.example.com"));
    }

    #[test]
    fn test_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SubscriptionClient>();
    }
}
