//! App Proxy signature verification.
//!
//! Shopify forwards storefront requests to the app backend through the App
//! Proxy, appending the shop, the logged-in customer and a `signature`
//! computed over the query string. Nothing in the request may be trusted
//! until that signature has been checked.
//!
//! # Overview
//!
//! - [`canonicalize`]: Rebuilds the exact message Shopify signed
//! - [`hmac`]: HMAC-SHA256 and constant-time comparison primitives
//! - [`verify`]: Checks a raw query string against a secret
//! - [`verify_proxy_request`]: Checks a [`ProxyRequest`] against a
//!   [`ProxyConfig`](crate::ProxyConfig) and yields a [`ProxyContext`]
//! - [`ProxyError`]: Why a request was not serviced
//!
//! # Example
//!
//! ```rust
//! use app_proxy::proxy::{canonicalize, verify};
//! use app_proxy::proxy::hmac::compute_signature;
//!
//! let query = canonicalize("?timestamp=1&shop=demo.myshopify.com&signature=ignored");
//! assert_eq!(query.canonical(), "shop=demo.myshopify.comtimestamp=1");
//!
//! let signature = compute_signature(query.canonical(), "s3cr3t");
//! let signed = format!("timestamp=1&shop=demo.myshopify.com&signature={signature}");
//! assert!(verify(&signed, "s3cr3t"));
//! ```

mod canonical;
mod errors;
pub mod hmac;
mod verification;

pub use canonical::{canonicalize, CanonicalQuery, ParameterMultiMap, SIGNATURE_PARAM};
pub use errors::ProxyError;
pub use verification::{
    verify, verify_proxy_request, ProxyContext, ProxyRequest, PARAM_CUSTOMER_ID,
    PARAM_LOGGED_IN_CUSTOMER_ID, PARAM_PATH_PREFIX, PARAM_SHOP, PARAM_TIMESTAMP,
};
