use std::collections::HashMap;

use serde::Serialize;

/// Leaf values of a connector response keyed by element name.
///
/// Later elements overwrite earlier ones with the same name, so the map keeps
/// whichever value appeared last in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlatFieldMap(HashMap<String, String>);

impl FlatFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing any earlier value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl FromIterator<(String, String)> for FlatFieldMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalized result of one request/response cycle with a connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub message: String,
    /// Every field of the flattened response
    pub fields: FlatFieldMap,
    /// Token referencing the transaction at the connector, only set on success
    pub authorization: Option<String>,
    /// Response body as received, also kept for fraud review
    pub raw_body: String,
    /// Whether the request went to the test endpoint
    pub test: bool,
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn fraud_review(&self) -> &str {
        &self.raw_body
    }
}

/// Raw HTTP response from a connector
#[derive(Clone, Debug)]
pub struct Response {
    pub headers: Option<HashMap<String, String>>,
    pub response: bytes::Bytes,
    pub status_code: u16,
}
