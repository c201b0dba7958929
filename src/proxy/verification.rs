//! App Proxy request verification.
//!
//! This module turns a raw proxied request into either a trusted
//! [`ProxyContext`] or a [`ProxyError`]:
//!
//! - [`verify`]: Low-level check of a raw query string against a secret
//! - [`verify_proxy_request`]: High-level check using [`ProxyConfig`], which
//!   also decodes and validates the identity parameters
//!
//! # Example
//!
//! ```rust
//! use app_proxy::proxy::hmac::compute_signature;
//! use app_proxy::proxy::{verify, verify_proxy_request, ProxyRequest};
//! use app_proxy::{ProxyConfig, SharedSecret};
//!
//! let signature = compute_signature("shop=demo.myshopify.comtimestamp=1700000000", "s3cr3t");
//! let query = format!("shop=demo.myshopify.com&timestamp=1700000000&signature={signature}");
//! assert!(verify(&query, "s3cr3t"));
//!
//! let config = ProxyConfig::builder()
//!     .shared_secret(SharedSecret::new("s3cr3t").unwrap())
//!     .build();
//! let request = ProxyRequest::new("GET", format!("/api/tg-portal/ping?{query}"));
//! let context = verify_proxy_request(&config, &request).unwrap();
//! assert_eq!(context.shop(), "demo.myshopify.com");
//! assert_eq!(context.path(), "/ping");
//! ```
//!
//! # Security
//!
//! Digests are compared in constant time. Parameter values are decoded only
//! after the signature has been accepted; the signature covers the encoded
//! wire bytes.

use chrono::{DateTime, Utc};

use crate::config::ProxyConfig;
use crate::proxy::canonical::{canonicalize, ParameterMultiMap};
use crate::proxy::hmac::{compute_signature, constant_time_compare};
use crate::proxy::ProxyError;

// ============================================================================
// Parameter Names
// ============================================================================

/// Query parameter carrying the shop's myshopify.com domain.
pub const PARAM_SHOP: &str = "shop";

/// Query parameter carrying the Unix timestamp of the proxied request.
pub const PARAM_TIMESTAMP: &str = "timestamp";

/// Query parameter carrying the storefront's logged-in customer, if any.
pub const PARAM_LOGGED_IN_CUSTOMER_ID: &str = "logged_in_customer_id";

/// Query parameter naming the customer a request asks about.
pub const PARAM_CUSTOMER_ID: &str = "customer_id";

/// Query parameter carrying the storefront path the proxy is mounted at.
pub const PARAM_PATH_PREFIX: &str = "path_prefix";

// ============================================================================
// ProxyRequest
// ============================================================================

/// An incoming proxied request, as seen by the backend.
///
/// `target` is the request target as received: the path followed by an
/// optional `?` and the raw query string.
///
/// # Example
///
/// ```rust
/// use app_proxy::proxy::ProxyRequest;
///
/// let request = ProxyRequest::new("GET", "/api/tg-portal/ping?shop=a&signature=b");
/// assert_eq!(request.path(), "/api/tg-portal/ping");
/// assert_eq!(request.raw_query(), "shop=a&signature=b");
/// ```
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    method: String,
    target: String,
}

impl ProxyRequest {
    /// Creates a request from its method and target.
    #[must_use]
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
        }
    }

    /// Returns the request method as received.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the path portion of the target.
    #[must_use]
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Returns the undecoded query string, without the leading `?`.
    ///
    /// Returns an empty string when the target has no query.
    #[must_use]
    pub fn raw_query(&self) -> &str {
        self.target.split_once('?').map_or("", |(_, query)| query)
    }
}

// ============================================================================
// ProxyContext
// ============================================================================

/// The trusted view of a request whose signature has been verified.
///
/// Identity fields are form-decoded. An identity parameter that is present
/// but empty is reported as absent.
#[derive(Debug, Clone)]
pub struct ProxyContext {
    shop: String,
    timestamp: String,
    logged_in_customer_id: Option<String>,
    customer_id: Option<String>,
    path_prefix: Option<String>,
    path: String,
    params: ParameterMultiMap,
}

impl ProxyContext {
    /// Returns the decoded shop domain.
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.shop
    }

    /// Returns the decoded `timestamp` parameter.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Returns the timestamp as a UTC instant, if it is a valid Unix time in seconds.
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Returns the decoded `logged_in_customer_id`, if any.
    #[must_use]
    pub fn logged_in_customer_id(&self) -> Option<&str> {
        self.logged_in_customer_id.as_deref()
    }

    /// Returns the decoded `customer_id`, if any.
    #[must_use]
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref()
    }

    /// Returns the customer a business route acts for.
    ///
    /// This is `customer_id` when present, else `logged_in_customer_id`.
    #[must_use]
    pub fn effective_customer_id(&self) -> Option<&str> {
        self.customer_id().or_else(|| self.logged_in_customer_id())
    }

    /// Returns the decoded `path_prefix`, if any.
    #[must_use]
    pub fn path_prefix(&self) -> Option<&str> {
        self.path_prefix.as_deref()
    }

    /// Returns the request path with the configured proxy prefix removed.
    ///
    /// The path is not decoded.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the decoded first value of any signed parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<String> {
        self.params.first(key).map(form_decode)
    }

    /// Returns the signed parameters with their raw values.
    #[must_use]
    pub const fn params(&self) -> &ParameterMultiMap {
        &self.params
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Verifies the signature of a raw App Proxy query string.
///
/// Returns `false` when `secret` is empty, when the query has no
/// `signature` parameter, or when the signature does not equal the
/// lowercase hex HMAC-SHA256 of the canonical query string. The comparison
/// is case-sensitive and constant-time.
///
/// # Example
///
/// ```rust
/// use app_proxy::proxy::hmac::compute_signature;
/// use app_proxy::proxy::verify;
///
/// let signature = compute_signature("a=1b=2", "s3cr3t");
/// assert!(verify(&format!("b=2&a=1&signature={signature}"), "s3cr3t"));
/// assert!(!verify("b=2&a=1", "s3cr3t"));
/// assert!(!verify(&format!("b=2&a=1&signature={signature}"), ""));
/// ```
#[must_use]
pub fn verify(raw_query: &str, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }

    let query = canonicalize(raw_query);
    query.signature().is_some_and(|signature| {
        let digest = compute_signature(query.canonical(), secret);
        constant_time_compare(&digest, signature)
    })
}

/// Verifies a proxied request against the configuration.
///
/// Checks run in this order, stopping at the first failure:
///
/// 1. a shared secret is configured ([`ProxyError::MisconfiguredSecret`])
/// 2. the query carries a signature ([`ProxyError::MissingSignature`])
/// 3. the signature matches ([`ProxyError::SignatureMismatch`])
/// 4. `shop` and `timestamp` are present and non-empty
///    ([`ProxyError::MissingRequiredParameter`])
/// 5. `customer_id`, when present alongside `logged_in_customer_id`,
///    equals it ([`ProxyError::CustomerMismatch`])
///
/// Rejections are logged at `warn` level. With
/// [`ProxyConfig::debug_signatures`] enabled, the canonical string and the
/// computed digest are logged at `debug` level.
///
/// # Errors
///
/// Returns the [`ProxyError`] of the first failed check.
pub fn verify_proxy_request(
    config: &ProxyConfig,
    request: &ProxyRequest,
) -> Result<ProxyContext, ProxyError> {
    let result = authenticate(config, request);
    match &result {
        Ok(context) => tracing::debug!(
            shop = %context.shop(),
            path = %context.path(),
            "App Proxy request verified"
        ),
        Err(error) => tracing::warn!(
            kind = error.kind(),
            method = %request.method(),
            path = %request.path(),
            "App Proxy request rejected"
        ),
    }
    result
}

fn authenticate(config: &ProxyConfig, request: &ProxyRequest) -> Result<ProxyContext, ProxyError> {
    let secret = config
        .shared_secret()
        .ok_or(ProxyError::MisconfiguredSecret)?;

    let query = canonicalize(request.raw_query());
    let signature = query.signature().ok_or(ProxyError::MissingSignature)?;
    let digest = compute_signature(query.canonical(), secret.as_ref());

    if config.debug_signatures() {
        tracing::debug!(
            canonical = %query.canonical(),
            digest = %digest,
            "App Proxy signature computed"
        );
    }

    if !constant_time_compare(&digest, signature) {
        return Err(ProxyError::SignatureMismatch);
    }

    let params = query.into_params();
    let decoded = |key: &str| {
        params
            .first(key)
            .map(form_decode)
            .filter(|value| !value.is_empty())
    };

    let shop = decoded(PARAM_SHOP).ok_or(ProxyError::MissingRequiredParameter { name: PARAM_SHOP })?;
    let timestamp = decoded(PARAM_TIMESTAMP).ok_or(ProxyError::MissingRequiredParameter {
        name: PARAM_TIMESTAMP,
    })?;
    let logged_in_customer_id = decoded(PARAM_LOGGED_IN_CUSTOMER_ID);
    let customer_id = decoded(PARAM_CUSTOMER_ID);
    let path_prefix = decoded(PARAM_PATH_PREFIX);

    if let (Some(requested), Some(logged_in)) = (&customer_id, &logged_in_customer_id) {
        if requested != logged_in {
            return Err(ProxyError::CustomerMismatch {
                requested: requested.clone(),
                logged_in: logged_in.clone(),
            });
        }
    }

    Ok(ProxyContext {
        shop,
        timestamp,
        logged_in_customer_id,
        customer_id,
        path_prefix,
        path: config.proxy_prefix().strip(request.path()).to_string(),
        params,
    })
}

/// Form-decodes a raw value: `+` becomes a space, then percent escapes are
/// decoded. Invalid UTF-8 is replaced.
fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
