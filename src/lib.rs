//! # Shopify App Proxy Gate
//!
//! Signature verification and request gating for backends that sit behind a
//! Shopify App Proxy.
//!
//! ## Overview
//!
//! Shopify forwards storefront requests to the app, appending `shop`,
//! `timestamp`, `logged_in_customer_id` and a `signature` to the query
//! string. This crate provides:
//!
//! - Canonicalization of the raw query string exactly as Shopify signs it
//!   via [`proxy::canonicalize`]
//! - HMAC-SHA256 verification with constant-time comparison via [`verify`]
//! - A request gate, [`ProxyGate`], that rejects unauthenticated requests
//!   before any route runs and maps failures onto HTTP statuses
//! - Type-safe configuration via [`ProxyConfig`] and [`ProxyConfigBuilder`]
//! - An async client for the subscription management API, behind the
//!   [`SubscriptionApi`] trait
//!
//! ## Quick Start
//!
//! ```rust
//! use app_proxy::proxy::hmac::compute_signature;
//! use app_proxy::verify;
//!
//! // Shopify signs "key=value" segments, sorted by key, with no separator
//! let signature = compute_signature("a=1b=2", "s3cr3t");
//! let query = format!("b=2&a=1&signature={signature}");
//!
//! assert!(verify(&query, "s3cr3t"));
//! assert!(!verify("b=2&a=1&signature=XYZ", "s3cr3t"));
//! ```
//!
//! ## Gating Requests
//!
//! ```rust,ignore
//! use app_proxy::{ProxyConfig, ProxyGate};
//!
//! let gate = ProxyGate::new(ProxyConfig::from_env()?)?;
//!
//! // Inside any HTTP framework's handler:
//! let response = gate.handle(method, &path_and_query).await;
//! // respond with response.status, content type app_proxy::gate::CONTENT_TYPE,
//! // and response.body
//! ```
//!
//! ## Status Codes
//!
//! | Failure | Status |
//! |---------|--------|
//! | Missing or bad signature, missing `shop`/`timestamp`/customer | 401 |
//! | `customer_id` differs from `logged_in_customer_id` | 403 |
//! | Unknown route | 404 |
//! | Shared secret not configured, subscription API failure | 500 |
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and installs no subscriber. Rejections
//! are logged at `warn`. With `APP_PROXY_DEBUG` set, canonical strings and
//! computed digests are logged at `debug`; they never appear in responses.
//!
//! ## Thread Safety
//!
//! All public configuration and gate types are `Send + Sync`.

pub mod clients;
pub mod config;
pub mod error;
pub mod gate;
pub mod proxy;

// Re-export public types at crate root for convenience
pub use config::{
    ApiBaseUrl, ApiToken, ProxyConfig, ProxyConfigBuilder, ProxyPrefix, SharedSecret,
    SubscriptionApiConfig,
};
pub use error::ConfigError;

// Re-export verification types
pub use proxy::{
    canonicalize, verify, verify_proxy_request, ProxyContext, ProxyError, ProxyRequest,
};

// Re-export gate types
pub use gate::{GateResponse, ProxyGate};

// Re-export HTTP client types
pub use clients::{
    HttpError, HttpMethod, HttpResponseError, MaxHttpRetriesExceededError, SubscriptionApi,
    SubscriptionClient,
};
