pub mod requests;
pub mod responses;
pub mod transformers;

#[cfg(test)]
mod test;

use std::{sync::Arc, time::Instant};

use common_enums::{CardNetwork, CountryAlpha2, Currency, CurrencyUnit};
use common_utils::{
    consts::MASKED_VALUE,
    errors::CustomResult,
    id_type::{IdGenerator, UuidGenerator},
    request::{Method, Request, RequestBuilder, RequestContent},
    types::{AmountConvertor, StringMinorUnit, StringMinorUnitForConnector},
    xml::XmlElement,
};
use domain_types::{
    connector_flow::FlowName,
    connector_types::{
        OperationRequest, PaymentsAuthorizeData, PaymentsCaptureData, RecurringPaymentData,
    },
    errors,
    router_data::ConnectorAuthType,
    router_response_types::PaymentOutcome,
    types::{ConnectorInfo, ConnectorParamsWithTestUrl, PaymentConnectorCategory},
    utils::convert_amount,
};
use error_stack::ResultExt;
use external_services::{configs::Config, ConnectorTransport, ReqwestTransport};
use hyperswitch_masking::{Maskable, Secret};
use serde_json::json;

use requests::{WirecardFunction, WirecardJobContext, WirecardJobIds, SENSITIVE_TAGS};
use transformers::{WirecardAuthType, WirecardRecurringRequest};

use crate::utils;

pub(crate) mod headers {
    pub(crate) const CONTENT_LENGTH: &str = "Content-length";
    pub(crate) const CONTENT_TYPE: &str = "Content-type";
    pub(crate) const HOST: &str = "Host";
    pub(crate) const CONNECTION: &str = "Connection";
    pub(crate) const AUTHORIZATION: &str = "Authorization";
}

const CONTENT_TYPE_XML: &str = "text/xml";
const CONNECTION_CLOSE: &str = "close";

pub const CONNECTOR_NAME: &str = "wirecard";
pub const SUPPORTED_COUNTRIES: [CountryAlpha2; 1] = [CountryAlpha2::DE];
pub const SUPPORTED_CARD_NETWORKS: [CardNetwork; 2] = [CardNetwork::Visa, CardNetwork::Mastercard];
pub const DEFAULT_CURRENCY: Currency = Currency::EUR;
pub const CURRENCY_UNIT: CurrencyUnit = CurrencyUnit::Minor;

pub static WIRECARD_CONNECTOR_INFO: ConnectorInfo = ConnectorInfo {
    display_name: "WireCard",
    description: "Wirecard processes card payments through its XML based BXML gateway, supporting authorizations, captures, purchases and recurring charges.",
    connector_type: PaymentConnectorCategory::PaymentGateway,
    homepage_url: "http://www.wirecard.com/",
};

/// Wirecard gateway client.
///
/// Holds read-only credentials and shared handles only, so one instance can
/// serve many threads.
#[derive(Clone)]
pub struct Wirecard {
    auth: WirecardAuthType,
    params: ConnectorParamsWithTestUrl,
    id_generator: Arc<dyn IdGenerator>,
    transport: Arc<dyn ConnectorTransport>,
    amount_converter: &'static (dyn AmountConvertor<Output = StringMinorUnit> + Sync),
}

impl std::fmt::Debug for Wirecard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wirecard")
            .field("params", &self.params)
            .field("id_generator", &self.id_generator)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl Wirecard {
    /// Build a client from `SignatureKey` credentials: login, password and business case signature
    pub fn new(
        auth_type: &ConnectorAuthType,
        params: ConnectorParamsWithTestUrl,
        transport: Arc<dyn ConnectorTransport>,
    ) -> CustomResult<Self, errors::ConnectorError> {
        let auth = WirecardAuthType::try_from(auth_type)?;
        tracing::debug!(
            auth_type = ?auth_type.get_masked_keys(),
            base_url = params.active_base_url(),
            "wirecard connector configured"
        );
        Ok(Self {
            auth,
            params,
            id_generator: Arc::new(UuidGenerator),
            transport,
            amount_converter: &StringMinorUnitForConnector,
        })
    }

    /// Client talking to the endpoints and proxy from the loaded configuration
    pub fn from_config(
        config: &Config,
        auth_type: &ConnectorAuthType,
    ) -> CustomResult<Self, errors::ConnectorError> {
        Self::new(
            auth_type,
            config.connectors.wirecard.clone(),
            Arc::new(ReqwestTransport::new(config.proxy.clone())),
        )
    }

    pub fn with_id_generator(mut self, id_generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = id_generator;
        self
    }

    pub fn is_test(&self) -> bool {
        self.params.test_mode
    }

    pub fn base_url(&self) -> &str {
        self.params.active_base_url()
    }

    pub fn get_connector_about(&self) -> &'static ConnectorInfo {
        &WIRECARD_CONNECTOR_INFO
    }

    /// Send an authorization.
    ///
    /// A failed exchange surfaces as `ConnectorError::TransportFailed` carrying the
    /// transport's `ApiClientError` unchanged; the other operations behave the same.
    pub fn authorize(
        &self,
        data: &PaymentsAuthorizeData,
    ) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
        let document = self.build_payment_document(WirecardFunction::Authorization, data)?;
        self.execute(FlowName::Authorize, &document)
    }

    pub fn capture(
        &self,
        data: &PaymentsCaptureData,
    ) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
        let document = self.build_capture_document(data)?;
        self.execute(FlowName::Capture, &document)
    }

    pub fn purchase(
        &self,
        data: &PaymentsAuthorizeData,
    ) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
        let document = self.build_payment_document(WirecardFunction::Purchase, data)?;
        self.execute(FlowName::Purchase, &document)
    }

    /// Initial charges go out as authorizations, repeated ones as purchases
    pub fn recurring(
        &self,
        data: &RecurringPaymentData,
    ) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
        let document = self.build_recurring_document(data)?;
        self.execute(FlowName::Recurring, &document)
    }

    pub fn process(
        &self,
        request: &OperationRequest,
    ) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
        match request {
            OperationRequest::Authorize(data) => self.authorize(data),
            OperationRequest::Capture(data) => self.capture(data),
            OperationRequest::Purchase(data) => self.purchase(data),
            OperationRequest::Recurring(data) => self.recurring(data),
        }
    }

    /// Request document for an operation, without sending it
    pub fn build_request_document(
        &self,
        request: &OperationRequest,
    ) -> CustomResult<XmlElement, errors::ConnectorError> {
        match request {
            OperationRequest::Authorize(data) => {
                self.build_payment_document(WirecardFunction::Authorization, data)
            }
            OperationRequest::Capture(data) => self.build_capture_document(data),
            OperationRequest::Purchase(data) => {
                self.build_payment_document(WirecardFunction::Purchase, data)
            }
            OperationRequest::Recurring(data) => self.build_recurring_document(data),
        }
    }

    fn build_payment_document(
        &self,
        function: WirecardFunction,
        data: &PaymentsAuthorizeData,
    ) -> CustomResult<XmlElement, errors::ConnectorError> {
        if let Some(card) = data.card.as_ref() {
            tracing::debug!(
                card_number = %card.card_number.get_masked_number(),
                card_network = ?card.get_card_network(),
                "card payment"
            );
        }
        let context = self.job_context(&data.transaction)?;
        match function {
            WirecardFunction::Purchase => requests::build_purchase_request(&context, data),
            WirecardFunction::Authorization | WirecardFunction::CaptureAuthorization => {
                requests::build_authorization_request(&context, data)
            }
        }
    }

    fn build_capture_document(
        &self,
        data: &PaymentsCaptureData,
    ) -> CustomResult<XmlElement, errors::ConnectorError> {
        let context = self.job_context(&data.transaction)?;
        requests::build_capture_request(&context, data)
    }

    fn build_recurring_document(
        &self,
        data: &RecurringPaymentData,
    ) -> CustomResult<XmlElement, errors::ConnectorError> {
        let recurring = WirecardRecurringRequest::try_from(data)?;
        self.build_payment_document(recurring.function, &recurring.payment)
    }

    fn job_context(
        &self,
        transaction: &domain_types::connector_types::TransactionDetails,
    ) -> CustomResult<WirecardJobContext<'_>, errors::ConnectorError> {
        let amount = convert_amount(
            self.amount_converter,
            transaction.amount,
            transaction.currency,
        )?;
        Ok(WirecardJobContext {
            business_case_signature: &self.auth.business_case_signature,
            ids: WirecardJobIds::resolve(transaction, self.id_generator.as_ref()),
            amount,
        })
    }

    fn build_request(&self, document: &XmlElement) -> CustomResult<Request, errors::ConnectorError> {
        let body = RequestContent::Xml(Secret::new(
            document
                .to_document()
                .change_context(errors::ConnectorError::RequestEncodingFailed)?,
        ));
        let url = self.base_url();
        let headers = vec![
            (
                headers::CONTENT_LENGTH.to_string(),
                Maskable::Normal(body.content_length().to_string()),
            ),
            (
                headers::CONTENT_TYPE.to_string(),
                Maskable::Normal(CONTENT_TYPE_XML.to_string()),
            ),
            (
                headers::HOST.to_string(),
                Maskable::Normal(utils::get_host(url)?),
            ),
            (
                headers::CONNECTION.to_string(),
                Maskable::Normal(CONNECTION_CLOSE.to_string()),
            ),
            (
                headers::AUTHORIZATION.to_string(),
                utils::get_basic_auth_header(&self.auth.login, &self.auth.password),
            ),
        ];
        Ok(RequestBuilder::new()
            .method(Method::Post)
            .url(url)
            .headers(headers)
            .set_body(body)
            .build())
    }

    #[tracing::instrument(
        name = "wirecard_execute",
        skip_all,
        fields(
            flow = %flow,
            connector = CONNECTOR_NAME,
            request.url = tracing::field::Empty,
            response.function_result = tracing::field::Empty,
            latency = tracing::field::Empty,
        )
    )]
    fn execute(
        &self,
        flow: FlowName,
        document: &XmlElement,
    ) -> CustomResult<PaymentOutcome, errors::ConnectorError> {
        let request = self.build_request(document)?;
        let current_span = tracing::Span::current();
        current_span.record("request.url", request.url.as_str());

        let masked_body = document
            .with_masked_leaves(&SENSITIVE_TAGS, MASKED_VALUE)
            .to_document()
            .change_context(errors::ConnectorError::RequestEncodingFailed)?;
        external_services::info_log(
            "OUTGOING_API",
            &json!({
                "flow": flow.to_string(),
                "url": request.url,
                "headers": utils::masked_headers_json(&request.headers),
                "body": masked_body,
            }),
        );

        let started_at = Instant::now();
        let raw_body = self
            .transport
            .post(request)
            .inspect_err(|error| {
                external_services::error_log(
                    "REQUEST_FAILURE",
                    &json!({ "flow": flow.to_string(), "error": format!("{error:?}") }),
                );
            })
            .map_err(|report| {
                let source = report.current_context().clone();
                report.change_context(errors::ConnectorError::TransportFailed(source))
            })?;
        let latency = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        current_span.record("latency", latency);

        external_services::debug_log(
            "INCOMING_API",
            &json!({ "flow": flow.to_string(), "body": raw_body }),
        );

        let outcome = transformers::handle_response(raw_body, self.is_test())?;
        let function_result = outcome
            .fields
            .get(responses::FUNCTION_RESULT)
            .unwrap_or_default();
        current_span.record("response.function_result", function_result);

        if outcome.is_success() {
            tracing::info!(authorization = ?outcome.authorization, "wirecard job accepted");
        } else {
            tracing::warn!(message = %outcome.message, "wirecard job declined");
        }

        Ok(outcome)
    }
}
