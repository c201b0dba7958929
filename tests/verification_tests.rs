//! Integration tests for App Proxy signature verification.

use app_proxy::proxy::hmac::compute_signature;
use app_proxy::{
    canonicalize, verify, verify_proxy_request, ProxyConfig, ProxyError, ProxyPrefix,
    ProxyRequest, SharedSecret,
};

const SECRET: &str = "s3cr3t";

fn sign(query: &str) -> String {
    let signature = compute_signature(canonicalize(query).canonical(), SECRET);
    format!("{query}&signature={signature}")
}

fn config() -> ProxyConfig {
    ProxyConfig::builder()
        .shared_secret(SharedSecret::new(SECRET).unwrap())
        .build()
}

// ============================================================================
// verify
// ============================================================================

#[test]
fn test_documented_scenario_sorted_params() {
    let expected = compute_signature("a=1b=2", SECRET);
    assert_eq!(expected.len(), 64);
    assert!(expected.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    assert!(verify(&format!("b=2&a=1&signature={expected}"), SECRET));
    assert!(!verify("b=2&a=1&signature=XYZ", SECRET));
    assert!(!verify(
        &format!("b=2&a=1&signature={}", expected.to_uppercase()),
        SECRET
    ));
}

#[test]
fn test_shopify_style_request_with_encoded_values() {
    let query = sign(
        "extra=1&extra=2&logged_in_customer_id=&path_prefix=%2Fapps%2Fportal&shop=demo.myshopify.com&timestamp=1317327555",
    );
    assert!(verify(&query, SECRET));
    assert!(verify(&format!("?{query}"), SECRET));
}

#[test]
fn test_decoding_before_verification_would_break_signature() {
    let signature = compute_signature("path_prefix=/apps/portal", SECRET);
    let query = format!("path_prefix=%2Fapps%2Fportal&signature={signature}");
    assert!(!verify(&query, SECRET));
}

#[test]
fn test_missing_signature_never_verifies() {
    for query in ["", "?", "a=1", "shop=a&timestamp=1", "signatures=abc"] {
        assert!(!verify(query, SECRET), "query {query:?} should not verify");
    }
}

#[test]
fn test_empty_secret_never_verifies() {
    let signature = compute_signature("a=1", "");
    assert!(!verify(&format!("a=1&signature={signature}"), ""));
}

#[test]
fn test_truncated_signature_is_rejected() {
    let query = sign("a=1");
    assert!(!verify(&query[..query.len() - 1], SECRET));
}

// ============================================================================
// verify_proxy_request
// ============================================================================

#[test]
fn test_request_status_codes_follow_check_order() {
    let cases: Vec<(ProxyConfig, String, u16)> = vec![
        (
            ProxyConfig::builder().build(),
            sign("shop=a&timestamp=1"),
            500,
        ),
        (config(), "shop=a&timestamp=1".to_string(), 401),
        (config(), "shop=a&timestamp=1&signature=00".to_string(), 401),
        (config(), sign("timestamp=1"), 401),
        (
            config(),
            sign("shop=a&timestamp=1&customer_id=5&logged_in_customer_id=9"),
            403,
        ),
    ];

    for (config, query, status) in cases {
        let request = ProxyRequest::new("GET", format!("/api/tg-portal/ping?{query}"));
        let error = verify_proxy_request(&config, &request).unwrap_err();
        assert_eq!(error.status_code(), status, "query {query:?}");
    }
}

#[test]
fn test_customer_mismatch_is_distinct_from_bad_signature() {
    let request = ProxyRequest::new(
        "GET",
        format!(
            "/api/tg-portal/overview?{}",
            sign("shop=a&timestamp=1&customer_id=5&logged_in_customer_id=9")
        ),
    );
    let error = verify_proxy_request(&config(), &request).unwrap_err();
    assert!(matches!(error, ProxyError::CustomerMismatch { .. }));
    assert_eq!(error.public_message(), "Customer mismatch");
}

#[test]
fn test_context_exposes_decoded_identity() {
    let config = ProxyConfig::builder()
        .shared_secret(SharedSecret::new(SECRET).unwrap())
        .proxy_prefix(ProxyPrefix::new("/apps/portal").unwrap())
        .build();
    let request = ProxyRequest::new(
        "GET",
        format!(
            "/apps/portal/subscriptions?{}",
            sign("shop=demo%2Emyshopify%2Ecom&timestamp=1700000000&customer_id=42&logged_in_customer_id=42")
        ),
    );

    let context = verify_proxy_request(&config, &request).unwrap();
    assert_eq!(context.shop(), "demo.myshopify.com");
    assert_eq!(context.customer_id(), Some("42"));
    assert_eq!(context.logged_in_customer_id(), Some("42"));
    assert_eq!(context.path(), "/subscriptions");
    assert_eq!(
        context.issued_at().map(|at| at.to_rfc3339()),
        Some("2023-11-14T22:13:20+00:00".to_string())
    );
}
