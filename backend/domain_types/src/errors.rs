pub use common_utils::errors::{CustomResult, ParsingError, ValidationError};

/// Errors raised while turning a payment operation into a connector call and back
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConnectorError {
    #[error("Failed to obtain authentication type")]
    FailedToObtainAuthType,
    #[error("Missing {field_name} in connector auth")]
    MissingAuthField { field_name: &'static str },
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
    #[error("Failed to obtain integration url")]
    FailedToObtainIntegrationUrl,
    #[error("Failed to encode connector request")]
    RequestEncodingFailed,
    #[error("Failed to deserialize connector response")]
    ResponseDeserializationFailed,
    #[error("Failed to convert amount to required type")]
    AmountConversionFailed,
    /// Carries the transport error as raised by the HTTP client
    #[error("Connector call failed: {0}")]
    TransportFailed(ApiClientError),
}

/// Errors raised by the HTTP client while talking to a connector
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ApiClientError {
    #[error("URL encoding of request payload failed")]
    UrlEncodingFailed,
    #[error("Failed to construct API client")]
    ClientConstructionFailed,
    #[error("Header map construction failed")]
    HeaderMapConstructionFailed,
    #[error("Failed to send request to connector {0}")]
    RequestNotSent(String),
    #[error("Server responded with Request Timeout")]
    RequestTimeoutReceived,
    #[error("Failed to decode response")]
    ResponseDecodingFailed,
    #[error("Server responded with unexpected status {status_code}")]
    UnexpectedServerResponse { status_code: u16 },
}

