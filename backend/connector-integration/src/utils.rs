use base64::Engine;
use common_utils::{consts::BASE64_ENGINE, consts::MASKED_VALUE, request::Headers};
use domain_types::errors;
use error_stack::ResultExt;
use hyperswitch_masking::{Mask, Maskable, PeekInterface, Secret};
use serde_json::{Map, Value};

type Error = error_stack::Report<errors::ConnectorError>;

/// `Basic` authorization header value for a login and password pair
pub fn get_basic_auth_header(login: &Secret<String>, password: &Secret<String>) -> Maskable<String> {
    let credentials = format!("{}:{}", login.peek(), password.peek());
    format!("Basic {}", BASE64_ENGINE.encode(credentials)).into_masked()
}

/// Host component of a connector endpoint
pub fn get_host(base_url: &str) -> Result<String, Error> {
    let url = url::Url::parse(base_url)
        .change_context(errors::ConnectorError::FailedToObtainIntegrationUrl)
        .attach_printable_lazy(|| format!("invalid connector url `{base_url}`"))?;
    url.host_str()
        .map(str::to_string)
        .ok_or(errors::ConnectorError::FailedToObtainIntegrationUrl)
        .attach_printable("connector url has no host")
}

/// Header names and values as json, with masked values replaced
pub fn masked_headers_json(headers: &Headers) -> Value {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Maskable::Masked(_) => MASKED_VALUE.to_string(),
                Maskable::Normal(value) => value.clone(),
            };
            (name.clone(), Value::String(value))
        })
        .collect::<Map<String, Value>>();
    Value::Object(headers)
}
