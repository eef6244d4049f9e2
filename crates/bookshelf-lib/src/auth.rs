//! Function-key authentication.
//!
//! Callers present the key either as the `code` query parameter or in the
//! `x-functions-key` header. Extracting those values is left to the hosting
//! surface; this module only decides.

use subtle::ConstantTimeEq;

/// Query parameter carrying the function key.
pub const API_KEY_QUERY_PARAM: &str = "code";

/// Header carrying the function key.
pub const API_KEY_HEADER: &str = "x-functions-key";

/// Configured function key.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a configured key. Blank values mean "no key configured".
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    /// Constant-time comparison against a presented key.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Whether a request may proceed.
///
/// With no configured key every request is allowed. Otherwise either the
/// query parameter or the header must carry the key.
pub fn is_authorized(expected: Option<&ApiKey>, query_key: Option<&str>, header_key: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(key) => [query_key, header_key]
            .into_iter()
            .flatten()
            .any(|presented| key.matches(presented)),
    }
}
