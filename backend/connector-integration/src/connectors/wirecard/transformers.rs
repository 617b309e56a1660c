use common_utils::xml::XmlElement;
use domain_types::{
    connector_types::{PaymentsAuthorizeData, RecurringPaymentData},
    errors::{self, CustomResult},
    router_data::ConnectorAuthType,
    router_response_types::{FlatFieldMap, PaymentOutcome},
    utils::missing_field_err,
};
use error_stack::ResultExt;
use hyperswitch_masking::{PeekInterface, Secret};

use super::{
    requests::WirecardFunction,
    responses::{self, FunctionResult},
};

/// Text found in the HTML page served instead of XML when credentials are rejected
pub const AUTH_ERROR_MARKER: &str = "This is an error page";
pub const AUTH_ERROR_MESSAGE: &str = "Authentication Error";

#[derive(Debug, Clone)]
pub struct WirecardAuthType {
    pub login: Secret<String>,
    pub password: Secret<String>,
    pub business_case_signature: Secret<String>,
}

impl TryFrom<&ConnectorAuthType> for WirecardAuthType {
    type Error = error_stack::Report<errors::ConnectorError>;

    fn try_from(auth_type: &ConnectorAuthType) -> Result<Self, Self::Error> {
        match auth_type {
            ConnectorAuthType::SignatureKey {
                api_key,
                key1,
                api_secret,
            } => Ok(Self {
                login: required_auth_field(api_key, "login")?,
                password: required_auth_field(key1, "password")?,
                business_case_signature: required_auth_field(
                    api_secret,
                    "business_case_signature",
                )?,
            }),
            _ => Err(errors::ConnectorError::FailedToObtainAuthType.into()),
        }
    }
}

fn required_auth_field(
    value: &Secret<String>,
    field_name: &'static str,
) -> Result<Secret<String>, error_stack::Report<errors::ConnectorError>> {
    if value.peek().trim().is_empty() {
        Err(errors::ConnectorError::MissingAuthField { field_name }.into())
    } else {
        Ok(value.clone())
    }
}

/// Recurring charge rewritten as the job actually sent to the gateway
#[derive(Debug, Clone)]
pub struct WirecardRecurringRequest {
    pub function: WirecardFunction,
    pub payment: PaymentsAuthorizeData,
}

impl TryFrom<&RecurringPaymentData> for WirecardRecurringRequest {
    type Error = error_stack::Report<errors::ConnectorError>;

    fn try_from(item: &RecurringPaymentData) -> Result<Self, Self::Error> {
        if item.initial_request {
            return Ok(Self {
                function: WirecardFunction::Authorization,
                payment: PaymentsAuthorizeData {
                    transaction: item.transaction.clone(),
                    card: item.card.clone(),
                    recurring: true,
                    previous_authorization: item.previous_authorization.clone(),
                },
            });
        }

        // Repeated charges are only supported as purchases
        let guwid = item
            .get_previous_authorization()
            .ok_or_else(missing_field_err("guwid"))?;
        Ok(Self {
            function: WirecardFunction::Purchase,
            payment: PaymentsAuthorizeData {
                transaction: item.transaction.clone(),
                card: item.card.clone(),
                recurring: true,
                previous_authorization: Some(Secret::new(guwid.to_string())),
            },
        })
    }
}

pub fn is_authentication_error_page(raw_body: &str) -> bool {
    raw_body.contains(AUTH_ERROR_MARKER)
}

/// Turn a raw response body into an outcome.
///
/// The authentication page is recognized before any parsing. Anything else
/// must be well formed XML.
pub fn handle_response(
    raw_body: String,
    test: bool,
) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
    if is_authentication_error_page(&raw_body) {
        return Ok(authentication_error_outcome(raw_body, test));
    }
    let document = XmlElement::parse(&raw_body)
        .change_context(errors::ConnectorError::ResponseDeserializationFailed)
        .attach_printable("wirecard response is not well formed xml")?;
    let fields = responses::flatten(&document);
    Ok(classify(raw_body, fields, test))
}

pub fn classify(raw_body: String, fields: FlatFieldMap, test: bool) -> PaymentOutcome {
    if is_authentication_error_page(&raw_body) {
        return authentication_error_outcome(raw_body, test);
    }

    let success = FunctionResult::from_fields(&fields).is_success();
    let (message, authorization) = if success {
        (
            fields.get(responses::INFO).unwrap_or_default().to_string(),
            fields.get(responses::GUWID).map(str::to_string),
        )
    } else {
        (
            fields.get(responses::MESSAGE).unwrap_or_default().to_string(),
            None,
        )
    };

    PaymentOutcome {
        success,
        message,
        fields,
        authorization,
        raw_body,
        test,
    }
}

fn authentication_error_outcome(raw_body: String, test: bool) -> PaymentOutcome {
    PaymentOutcome {
        success: false,
        message: AUTH_ERROR_MESSAGE.to_string(),
        fields: FlatFieldMap::new(),
        authorization: None,
        raw_body,
        test,
    }
}
