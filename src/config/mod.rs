//! Configuration for the App Proxy gate.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ProxyConfig`]: process-wide settings, read once at startup
//! - [`ProxyConfigBuilder`]: a builder for constructing [`ProxyConfig`] instances
//! - [`SubscriptionApiConfig`]: base URL and bearer token of the subscription API
//! - [`SharedSecret`], [`ApiToken`]: secrets with masked debug output
//! - [`ApiBaseUrl`], [`ProxyPrefix`]: validated URL and path values
//!
//! # Example
//!
//! ```rust
//! use app_proxy::{ProxyConfig, SharedSecret, ProxyPrefix};
//!
//! let config = ProxyConfig::builder()
//!     .shared_secret(SharedSecret::new("my-secret").unwrap())
//!     .proxy_prefix(ProxyPrefix::new("/apps/portal").unwrap())
//!     .build();
//!
//! assert!(config.shared_secret().is_some());
//! ```
//!
//! # Environment
//!
//! [`ProxyConfig::from_env`] reads:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `SHOPIFY_APP_SHARED_SECRET` | App Proxy shared secret. Unset or empty rejects every request. |
//! | `APPSTLE_API_BASE` | Subscription API base URL |
//! | `APPSTLE_API_KEY` | Subscription API bearer token |
//! | `APP_PROXY_PREFIX` | Path prefix, default `/api/tg-portal` |
//! | `APP_PROXY_DEBUG` | `1`/`true`/`yes`/`on` logs canonical strings and digests |

mod newtypes;

pub use newtypes::{ApiBaseUrl, ApiToken, ProxyPrefix, SharedSecret};

use crate::error::ConfigError;

/// Environment variable holding the App Proxy shared secret.
pub const ENV_SHARED_SECRET: &str = "SHOPIFY_APP_SHARED_SECRET";
/// Environment variable holding the subscription API base URL.
pub const ENV_API_BASE: &str = "APPSTLE_API_BASE";
/// Environment variable holding the subscription API bearer token.
pub const ENV_API_KEY: &str = "APPSTLE_API_KEY";
/// Environment variable overriding the proxy path prefix.
pub const ENV_PROXY_PREFIX: &str = "APP_PROXY_PREFIX";
/// Environment variable enabling signature debug logging.
pub const ENV_DEBUG: &str = "APP_PROXY_DEBUG";

/// Connection settings for the subscription API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionApiConfig {
    base_url: ApiBaseUrl,
    api_token: ApiToken,
}

impl SubscriptionApiConfig {
    /// Creates subscription API settings.
    #[must_use]
    pub const fn new(base_url: ApiBaseUrl, api_token: ApiToken) -> Self {
        Self {
            base_url,
            api_token,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the bearer token.
    #[must_use]
    pub const fn api_token(&self) -> &ApiToken {
        &self.api_token
    }
}

/// Process-wide configuration for the App Proxy gate.
///
/// # Thread Safety
///
/// `ProxyConfig` is `Clone`, `Send`, and `Sync`. It is built once at startup
/// and only read afterwards.
///
/// # Missing Secret
///
/// The shared secret is optional at construction time. A gate running without
/// one answers every request with a `500` instead of failing to start.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    shared_secret: Option<SharedSecret>,
    proxy_prefix: ProxyPrefix,
    subscription_api: Option<SubscriptionApiConfig>,
    debug_signatures: bool,
    user_agent_prefix: Option<String>,
}

impl ProxyConfig {
    /// Creates a new builder for constructing a `ProxyConfig`.
    #[must_use]
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::new()
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `APPSTLE_API_BASE` or `APP_PROXY_PREFIX`
    /// is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the API base URL or proxy prefix is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut builder = Self::builder();

        match get(ENV_SHARED_SECRET) {
            Some(secret) => builder = builder.shared_secret(SharedSecret::new(secret)?),
            None => tracing::warn!(
                "{ENV_SHARED_SECRET} is not set; every App Proxy request will be rejected"
            ),
        }

        if let Some(prefix) = get(ENV_PROXY_PREFIX) {
            builder = builder.proxy_prefix(ProxyPrefix::new(prefix)?);
        }

        match (get(ENV_API_BASE), get(ENV_API_KEY)) {
            (Some(base), Some(key)) => {
                builder = builder.subscription_api(SubscriptionApiConfig::new(
                    ApiBaseUrl::new(base)?,
                    ApiToken::new(key)?,
                ));
            }
            (Some(_), None) => {
                tracing::warn!("{ENV_API_BASE} is set without {ENV_API_KEY}; subscription routes are disabled");
            }
            (None, Some(_)) => {
                tracing::warn!("{ENV_API_KEY} is set without {ENV_API_BASE}; subscription routes are disabled");
            }
            (None, None) => {}
        }

        let debug = get(ENV_DEBUG).is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        });

        Ok(builder.debug_signatures(debug).build())
    }

    /// Returns the shared secret, if configured.
    #[must_use]
    pub const fn shared_secret(&self) -> Option<&SharedSecret> {
        self.shared_secret.as_ref()
    }

    /// Returns the proxy path prefix.
    #[must_use]
    pub const fn proxy_prefix(&self) -> &ProxyPrefix {
        &self.proxy_prefix
    }

    /// Returns the subscription API settings, if configured.
    #[must_use]
    pub const fn subscription_api(&self) -> Option<&SubscriptionApiConfig> {
        self.subscription_api.as_ref()
    }

    /// Returns whether canonical strings and digests are logged.
    #[must_use]
    pub const fn debug_signatures(&self) -> bool {
        self.debug_signatures
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ProxyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ProxyConfig>();
};

/// Builder for constructing [`ProxyConfig`] instances.
///
/// # Defaults
///
/// - `shared_secret`: `None`
/// - `proxy_prefix`: `/api/tg-portal`
/// - `subscription_api`: `None`
/// - `debug_signatures`: `false`
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ProxyConfigBuilder {
    shared_secret: Option<SharedSecret>,
    proxy_prefix: Option<ProxyPrefix>,
    subscription_api: Option<SubscriptionApiConfig>,
    debug_signatures: bool,
    user_agent_prefix: Option<String>,
}

impl ProxyConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the App Proxy shared secret.
    #[must_use]
    pub fn shared_secret(mut self, secret: SharedSecret) -> Self {
        self.shared_secret = Some(secret);
        self
    }

    /// Sets the proxy path prefix.
    #[must_use]
    pub fn proxy_prefix(mut self, prefix: ProxyPrefix) -> Self {
        self.proxy_prefix = Some(prefix);
        self
    }

    /// Sets the subscription API connection settings.
    #[must_use]
    pub fn subscription_api(mut self, api: SubscriptionApiConfig) -> Self {
        self.subscription_api = Some(api);
        self
    }

    /// Enables logging of canonical strings and computed digests.
    ///
    /// Intended for development. Nothing logged here ever reaches a response.
    #[must_use]
    pub const fn debug_signatures(mut self, enabled: bool) -> Self {
        self.debug_signatures = enabled;
        self
    }

    /// Sets the user agent prefix for subscription API requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ProxyConfig`].
    #[must_use]
    pub fn build(self) -> ProxyConfig {
        ProxyConfig {
            shared_secret: self.shared_secret,
            proxy_prefix: self.proxy_prefix.unwrap_or_default(),
            subscription_api: self.subscription_api,
            debug_signatures: self.debug_signatures,
            user_agent_prefix: self.user_agent_prefix,
        }
    }
}
