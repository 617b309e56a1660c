//! Commonly used constants

/// Base64 engine used for encoding credentials into headers
pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Mask applied to sensitive texts before they are logged
pub const MASKED_VALUE: &str = "*** masked ***";
