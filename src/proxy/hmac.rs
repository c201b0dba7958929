//! HMAC primitives for App Proxy signature verification.
//!
//! Shopify signs App Proxy requests with HMAC-SHA256 over the canonical
//! query string, keyed with the app's shared secret, and sends the result as
//! a lowercase hex string in the `signature` query parameter.
//!
//! # Security
//!
//! Digest comparison goes through [`constant_time_compare`], which rejects
//! on length first and then compares with [`subtle::ConstantTimeEq`].
//!
//! # Example
//!
//! ```rust
//! use app_proxy::proxy::hmac::{compute_signature, constant_time_compare};
//!
//! let signature = compute_signature("a=1b=2", "s3cr3t");
//! assert_eq!(signature.len(), 64);
//! assert!(constant_time_compare(&signature, &signature.clone()));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes an HMAC-SHA256 signature for the given message.
///
/// The signature is returned as a lowercase hexadecimal string, which is the
/// form Shopify places in the App Proxy `signature` parameter.
///
/// # Arguments
///
/// * `message` - The canonical query string
/// * `secret` - The app's shared secret
///
/// # Example
///
/// ```rust
/// use app_proxy::proxy::hmac::compute_signature;
///
/// let sig = compute_signature("test-message", "secret-key");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

/// Performs constant-time comparison of two strings.
///
/// Inputs of different lengths are rejected up front. The length of a
/// supplied signature is visible to whoever sent it, so this leaks nothing
/// derived from the secret. Equal-length inputs are compared without
/// short-circuiting on the first differing byte.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() != b_bytes.len() {
        return false;
    }

    a_bytes.ct_eq(b_bytes).into()
}

// Internal hex encoding since we don't want to add another dependency
mod hex {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        let bytes = bytes.as_ref();
        let mut result = String::with_capacity(bytes.len() * 2);
        for &byte in bytes {
            result.push(HEX_CHARS[(byte >> 4) as usize] as char);
            result.push(HEX_CHARS[(byte & 0x0f) as usize] as char);
        }
        result
    }
}
