//! Canonical query string construction for App Proxy signatures.
//!
//! Shopify computes the App Proxy signature over a message derived from the
//! forwarded query string:
//!
//! ```text
//! 1. drop the `signature` parameter
//! 2. merge repeated keys, joining their values with ","
//! 3. sort by key (byte order)
//! 4. emit key=value for every key and concatenate with no separator
//! ```
//!
//! Keys and values stay exactly as they appeared on the wire. Nothing is
//! percent-decoded or re-encoded here, because the signature was computed
//! over the encoded bytes.
//!
//! # Example
//!
//! ```rust
//! use app_proxy::proxy::canonicalize;
//!
//! let query = canonicalize("?shop=a.myshopify.com&ids=1&ids=2&signature=abc");
//! assert_eq!(query.canonical(), "ids=1,2shop=a.myshopify.com");
//! assert_eq!(query.signature(), Some("abc"));
//! ```

use std::collections::BTreeMap;

/// Name of the reserved query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

/// Query parameters grouped by key, with raw (undecoded) values.
///
/// Keys are compared byte-for-byte and kept in byte order. The values of a
/// repeated key keep the order in which they appeared in the query string.
///
/// # Example
///
/// ```rust
/// use app_proxy::proxy::ParameterMultiMap;
///
/// let params = ParameterMultiMap::parse("b=2&a=1&a=3&flag");
/// assert_eq!(params.get("a"), Some(&["1".to_string(), "3".to_string()][..]));
/// assert_eq!(params.first("flag"), Some(""));
/// assert_eq!(params.canonical_string(), "a=1,3b=2flag=");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterMultiMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ParameterMultiMap {
    /// Parses a raw query string.
    ///
    /// A single leading `?` is ignored. Pairs are split on `&` and then on
    /// the first `=`. A pair without `=` gets an empty value. Empty segments
    /// (as in `a=1&&b=2`) carry no key and are skipped.
    #[must_use]
    pub fn parse(raw_query: &str) -> Self {
        let query = raw_query.strip_prefix('?').unwrap_or(raw_query);
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            entries
                .entry(key.to_string())
                .or_default()
                .push(value.to_string());
        }

        Self { entries }
    }

    /// Returns all raw values for `key`, in wire order.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns the first raw value for `key`.
    #[must_use]
    pub fn first(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if the key appeared at least once.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes `key` and returns its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.entries.remove(key)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over keys in byte order together with their raw values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Builds the signable message: `key=v1,v2` segments in key order,
    /// concatenated with no separator.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        let mut canonical = String::new();
        for (key, values) in &self.entries {
            canonical.push_str(key);
            canonical.push('=');
            canonical.push_str(&values.join(","));
        }
        canonical
    }
}

/// The result of canonicalizing an App Proxy query string.
///
/// Holds the parameters with `signature` removed, the signature itself
/// (`None` when the parameter was absent, which is distinct from an empty
/// value), and the canonical message the signature should cover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalQuery {
    params: ParameterMultiMap,
    signature: Option<String>,
    canonical: String,
}

impl CanonicalQuery {
    /// Returns the parameters, excluding `signature`, with raw values.
    #[must_use]
    pub const fn params(&self) -> &ParameterMultiMap {
        &self.params
    }

    /// Returns the raw signature value, if the parameter was present.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Returns the canonical message.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Consumes the query, returning its parameters.
    #[must_use]
    pub fn into_params(self) -> ParameterMultiMap {
        self.params
    }
}

/// Canonicalizes a raw App Proxy query string.
///
/// If `signature` appears more than once, the first occurrence is the
/// signature and every occurrence is excluded from the canonical message.
#[must_use]
pub fn canonicalize(raw_query: &str) -> CanonicalQuery {
    let mut params = ParameterMultiMap::parse(raw_query);
    let signature = params
        .remove(SIGNATURE_PARAM)
        .and_then(|values| values.into_iter().next());
    let canonical = params.canonical_string();

    CanonicalQuery {
        params,
        signature,
        canonical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_sorts_and_concatenates_without_separator() {
        let query = canonicalize("b=2&a=1&signature=XYZ");
        assert_eq!(query.canonical(), "a=1b=2");
        assert_eq!(query.signature(), Some("XYZ"));
    }

    #[test]
    fn test_canonicalize_strips_one_leading_question_mark() {
        assert_eq!(canonicalize("?a=1").canonical(), "a=1");
        assert_eq!(canonicalize("??a=1").canonical(), "?a=1");
    }

    #[test]
    fn test_canonicalize_merges_duplicate_keys_in_wire_order() {
        let query = canonicalize("z=0&a=1&m=x&a=2");
        assert_eq!(query.canonical(), "a=1,2m=xz=0");
    }

    #[test]
    fn test_canonicalize_preserves_empty_values() {
        let query = canonicalize("shop=&timestamp=123&signature=abc");
        assert_eq!(query.canonical(), "shop=timestamp=123");
    }

    #[test]
    fn test_key_without_equals_is_counted_with_empty_value() {
        let query = canonicalize("flag&a=1");
        assert_eq!(query.canonical(), "a=1flag=");
    }

    #[test]
    fn test_only_first_equals_splits_the_pair() {
        let query = canonicalize("data=a=b=c");
        assert_eq!(query.canonical(), "data=a=b=c");
    }

    #[test]
    fn test_empty_segments_are_skipped() {
        let query = canonicalize("a=1&&b=2&");
        assert_eq!(query.canonical(), "a=1b=2");
    }

    #[test]
    fn test_percent_encoding_is_left_untouched() {
        let query = canonicalize("path_prefix=%2Fapps%2Fportal&shop=my%2Dshop&q=a+b");
        assert_eq!(
            query.canonical(),
            "path_prefix=%2Fapps%2Fportalq=a+bshop=my%2Dshop"
        );
    }

    #[test]
    fn test_sorting_uses_byte_order_on_encoded_keys() {
        // '%' (0x25) < 'A' (0x41) < '_' (0x5f) < 'a' (0x61)
        let query = canonicalize("a=1&_=2&A=3&%41=4");
        assert_eq!(query.canonical(), "%41=4A=3_=2a=1");
    }

    #[test]
    fn test_missing_signature_is_absent_not_empty() {
        let query = canonicalize("shop=a&timestamp=1");
        assert_eq!(query.signature(), None);

        let query = canonicalize("shop=a&signature=");
        assert_eq!(query.signature(), Some(""));
        assert_eq!(query.canonical(), "shop=a");
    }

    #[test]
    fn test_repeated_signature_takes_first_and_removes_all() {
        let query = canonicalize("signature=first&a=1&signature=second");
        assert_eq!(query.signature(), Some("first"));
        assert_eq!(query.canonical(), "a=1");
        assert!(!query.params().contains_key(SIGNATURE_PARAM));
    }

    #[test]
    fn test_signature_key_match_is_exact() {
        let query = canonicalize("Signature=x&signatures=y");
        assert_eq!(query.signature(), None);
        assert_eq!(query.canonical(), "Signature=xsignatures=y");
    }

    #[test]
    fn test_empty_query_canonicalizes_to_empty_string() {
        let query = canonicalize("");
        assert_eq!(query.canonical(), "");
        assert!(query.params().is_empty());
        assert_eq!(query.signature(), None);
    }

    #[test]
    fn test_multimap_accessors() {
        let params = ParameterMultiMap::parse("a=1&b=2&a=3");
        assert_eq!(params.len(), 2);
        assert_eq!(params.first("a"), Some("1"));
        assert_eq!(params.get("b"), Some(&["2".to_string()][..]));
        assert_eq!(params.get("c"), None);

        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
