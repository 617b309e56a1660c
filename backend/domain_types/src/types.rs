use serde::{Deserialize, Serialize};

/// Endpoints of every configured connector
#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq)]
pub struct Connectors {
    #[serde(default)]
    pub wirecard: ConnectorParamsWithTestUrl,
}

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct ConnectorParamsWithTestUrl {
    /// live endpoint
    pub base_url: String,
    /// endpoint used while `test_mode` is on
    pub test_base_url: String,
    #[serde(default)]
    pub test_mode: bool,
}

impl ConnectorParamsWithTestUrl {
    pub fn new(base_url: String, test_base_url: String, test_mode: bool) -> Self {
        Self {
            base_url,
            test_base_url,
            test_mode,
        }
    }

    /// The endpoint requests should currently go to
    pub fn active_base_url(&self) -> &str {
        if self.test_mode {
            &self.test_base_url
        } else {
            &self.base_url
        }
    }
}

impl Default for ConnectorParamsWithTestUrl {
    fn default() -> Self {
        Self {
            base_url: "https://c3.wirecard.com/secure/ssl-gateway".to_string(),
            test_base_url: "https://c3-test.wirecard.com/secure/ssl-gateway".to_string(),
            test_mode: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
pub struct Proxy {
    pub http_url: Option<String>,
    pub https_url: Option<String>,
    pub idle_pool_connection_timeout: Option<u64>,
    #[serde(default)]
    pub bypass_proxy_urls: Vec<String>,
}

impl Proxy {
    pub fn cache_key(&self, should_bypass_proxy: bool) -> Option<Self> {
        if should_bypass_proxy || (self.http_url.is_none() && self.https_url.is_none()) {
            None
        } else {
            Some(self.clone())
        }
    }

    pub fn should_bypass(&self, url: &str) -> bool {
        self.bypass_proxy_urls.iter().any(|bypass| bypass == url)
    }
}

impl Default for Proxy {
    fn default() -> Self {
        Self {
            http_url: None,
            https_url: None,
            idle_pool_connection_timeout: Some(90),
            bypass_proxy_urls: Vec::new(),
        }
    }
}

/// Static description of a connector
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorInfo {
    /// Display name of the Connector
    pub display_name: &'static str,
    /// Description of the connector.
    pub description: &'static str,
    /// Connector Type
    pub connector_type: PaymentConnectorCategory,
    pub homepage_url: &'static str,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentConnectorCategory {
    PaymentGateway,
    AlternativePaymentMethod,
    BankAcquirer,
}
