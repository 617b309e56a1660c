#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::indexing_slicing)]

use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use common_enums::{CountryAlpha2, Currency};
use common_utils::{
    errors::CustomResult, id_type::IdGenerator, request::Request, xml::XmlElement, MinorUnit,
};
use domain_types::{
    connector_types::{
        OperationRequest, PaymentsAuthorizeData, PaymentsCaptureData, RecurringPaymentData,
        RecurringStage, TransactionDetails,
    },
    errors::{ApiClientError, ConnectorError},
    payment_method_data::Card,
    router_data::ConnectorAuthType,
    router_response_types::FlatFieldMap,
    types::ConnectorParamsWithTestUrl,
};
use external_services::ConnectorTransport;
use hyperswitch_masking::Secret;

use super::{
    requests::{tags, WirecardFunction, FUNCTION_ID},
    responses::{self, FunctionResult},
    transformers::{self, WirecardAuthType, WirecardRecurringRequest},
    Wirecard,
};

#[derive(Debug, Default)]
struct SequenceIdGenerator(AtomicUsize);

impl IdGenerator for SequenceIdGenerator {
    fn next_unique_id(&self) -> String {
        format!("id-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[derive(Debug)]
struct OfflineTransport;

impl ConnectorTransport for OfflineTransport {
    fn post(&self, _request: Request) -> CustomResult<String, ApiClientError> {
        Err(ApiClientError::RequestNotSent("offline".to_string()).into())
    }
}

fn auth() -> ConnectorAuthType {
    ConnectorAuthType::SignatureKey {
        api_key: Secret::new("login".to_string()),
        key1: Secret::new("password".to_string()),
        api_secret: Secret::new("123".to_string()),
    }
}

fn connector() -> Wirecard {
    Wirecard::new(
        &auth(),
        ConnectorParamsWithTestUrl::default(),
        Arc::new(OfflineTransport),
    )
    .unwrap()
    .with_id_generator(Arc::new(SequenceIdGenerator::default()))
}

fn card(cvc: Option<&str>) -> Card {
    Card {
        card_number: cards::CardNumber::from_str("4200000000000000").unwrap(),
        card_cvc: cvc.map(|cvc| cards::CardSecurityCode::from_str(cvc).unwrap()),
        card_exp_month: 9u8.try_into().unwrap(),
        card_exp_year: 2030u16.try_into().unwrap(),
        card_holder_first_name: Secret::new("Longbob".to_string()),
        card_holder_last_name: Secret::new("Longsen".to_string()),
        card_network: None,
    }
}

fn transaction() -> TransactionDetails {
    TransactionDetails::new(MinorUnit::new(100))
        .with_currency(Currency::CHF)
        .with_country(CountryAlpha2::CH)
        .with_description("Unit Tests of WireCard Gateway Usage")
}

fn job(document: &XmlElement) -> &XmlElement {
    document
        .child(tags::REQUEST)
        .and_then(|request| request.child(tags::JOB))
        .expect("request document has a job")
}

fn cc_transaction<'a>(document: &'a XmlElement, function: WirecardFunction) -> &'a XmlElement {
    job(document)
        .child(&function.to_string())
        .and_then(|block| block.child(tags::TRANSACTION))
        .expect("function block has a transaction")
}

fn names(element: &XmlElement) -> Vec<&str> {
    element.children().iter().map(XmlElement::name).collect()
}

#[test]
fn authorization_document_has_the_job_envelope() {
    let data = PaymentsAuthorizeData::new(transaction(), card(Some("123")));
    let document = connector()
        .build_request_document(&OperationRequest::Authorize(data))
        .unwrap();

    assert_eq!(document.name(), tags::ROOT);
    assert_eq!(
        document.attribute("xmlns:xsi"),
        Some("http://www.w3.org/1999/XMLSchema-instance")
    );
    assert_eq!(
        document.attribute("xsi:noNamespaceSchemaLocation"),
        Some("wirecard.xsd")
    );

    let job = job(&document);
    assert_eq!(
        names(job),
        vec![
            tags::JOB_ID,
            tags::BUSINESS_CASE_SIGNATURE,
            "FNC_CC_AUTHORIZATION"
        ]
    );
    assert_eq!(job.child(tags::JOB_ID).unwrap().text(), Some("id-1"));
    assert_eq!(
        job.child(tags::BUSINESS_CASE_SIGNATURE).unwrap().text(),
        Some("123")
    );
    let function = job.child("FNC_CC_AUTHORIZATION").unwrap();
    assert_eq!(
        function.child(tags::FUNCTION_ID).unwrap().text(),
        Some(FUNCTION_ID)
    );
}

#[test]
fn one_off_authorization_carries_exactly_one_card_block() {
    let data = PaymentsAuthorizeData::new(transaction(), card(Some("123")));
    let document = connector()
        .build_request_document(&OperationRequest::Authorize(data))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Authorization);

    assert_eq!(
        names(transaction),
        vec![
            tags::TRANSACTION_ID,
            tags::AMOUNT,
            tags::CURRENCY,
            tags::COUNTRY_CODE,
            tags::USAGE,
            tags::CREDIT_CARD_DATA
        ]
    );
    assert_eq!(
        transaction.child(tags::TRANSACTION_ID).unwrap().text(),
        Some("id-2")
    );
    assert_eq!(transaction.child(tags::CURRENCY).unwrap().text(), Some("CHF"));
    assert_eq!(
        transaction.child(tags::COUNTRY_CODE).unwrap().text(),
        Some("CH")
    );

    let card = transaction.child(tags::CREDIT_CARD_DATA).unwrap();
    assert_eq!(
        names(card),
        vec![
            tags::CREDIT_CARD_NUMBER,
            tags::CVC2,
            tags::EXPIRATION_YEAR,
            tags::EXPIRATION_MONTH,
            tags::CARD_HOLDER_NAME
        ]
    );
    assert_eq!(
        card.child(tags::CREDIT_CARD_NUMBER).unwrap().text(),
        Some("4200000000000000")
    );
    assert_eq!(card.child(tags::EXPIRATION_YEAR).unwrap().text(), Some("2030"));
    assert_eq!(card.child(tags::EXPIRATION_MONTH).unwrap().text(), Some("09"));
    assert_eq!(
        card.child(tags::CARD_HOLDER_NAME).unwrap().text(),
        Some("Longsen Longbob")
    );
}

#[test]
fn amount_is_sent_in_minor_units() {
    let data = PaymentsAuthorizeData::new(transaction(), card(None));
    let document = connector()
        .build_request_document(&OperationRequest::Purchase(data))
        .unwrap();
    let amount = cc_transaction(&document, WirecardFunction::Purchase)
        .child(tags::AMOUNT)
        .unwrap();
    assert_eq!(amount.text(), Some("100"));
    assert_eq!(amount.attribute("minorunits"), Some("2"));
    assert!(document
        .to_document()
        .unwrap()
        .contains(r#"<Amount minorunits="2">100</Amount>"#));
}

#[test]
fn missing_cvc_omits_the_element() {
    let data = PaymentsAuthorizeData::new(transaction(), card(None));
    let document = connector()
        .build_request_document(&OperationRequest::Purchase(data))
        .unwrap();
    let card = cc_transaction(&document, WirecardFunction::Purchase)
        .child(tags::CREDIT_CARD_DATA)
        .unwrap();
    assert!(card.child(tags::CVC2).is_none());
    assert_eq!(card.children().len(), 4);
}

#[test]
fn caller_ids_are_used_as_given() {
    let data = PaymentsAuthorizeData::new(
        transaction()
            .with_job_id("job-7")
            .with_transaction_id("txn-7"),
        card(None),
    );
    let document = connector()
        .build_request_document(&OperationRequest::Purchase(data))
        .unwrap();
    assert_eq!(
        job(&document).child(tags::JOB_ID).unwrap().text(),
        Some("job-7")
    );
    assert_eq!(
        cc_transaction(&document, WirecardFunction::Purchase)
            .child(tags::TRANSACTION_ID)
            .unwrap()
            .text(),
        Some("txn-7")
    );
}

#[test]
fn capture_references_the_authorization_and_never_the_card() {
    let data = PaymentsCaptureData {
        transaction: transaction(),
        authorization: Secret::new("C242720181323966504820".to_string()),
    };
    let document = connector()
        .build_request_document(&OperationRequest::Capture(data))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::CaptureAuthorization);

    assert_eq!(
        names(transaction),
        vec![
            tags::TRANSACTION_ID,
            tags::GUWID,
            tags::AMOUNT,
            tags::CURRENCY,
            tags::COUNTRY_CODE,
            tags::USAGE
        ]
    );
    assert_eq!(
        transaction.child(tags::GUWID).unwrap().text(),
        Some("C242720181323966504820")
    );
}

#[test]
fn capture_without_authorization_is_rejected() {
    let data = PaymentsCaptureData {
        transaction: transaction(),
        authorization: Secret::new("  ".to_string()),
    };
    let error = connector()
        .build_request_document(&OperationRequest::Capture(data))
        .unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::MissingRequiredField {
            field_name: "guwid"
        }
    );
}

#[test]
fn payment_without_card_is_rejected() {
    let data = PaymentsAuthorizeData {
        transaction: transaction(),
        card: None,
        recurring: false,
        previous_authorization: None,
    };
    let error = connector()
        .build_request_document(&OperationRequest::Authorize(data))
        .unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::MissingRequiredField {
            field_name: "payment_method_data.card"
        }
    );
}

#[test]
fn initial_recurring_charge_is_an_authorization_with_card() {
    let data = RecurringPaymentData {
        transaction: transaction(),
        card: Some(card(Some("123"))),
        initial_request: true,
        previous_authorization: None,
    };
    let document = connector()
        .build_request_document(&OperationRequest::Recurring(data))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Authorization);

    assert_eq!(
        names(transaction)[5..],
        [tags::RECURRING_TRANSACTION, tags::CREDIT_CARD_DATA]
    );
    let recurring = transaction.child(tags::RECURRING_TRANSACTION).unwrap();
    assert_eq!(
        recurring.child(tags::RECURRING_TYPE).unwrap().text(),
        Some("Initial")
    );
}

#[test]
fn repeated_recurring_charge_is_a_purchase_without_card() {
    let data = RecurringPaymentData {
        transaction: transaction(),
        card: Some(card(Some("123"))),
        initial_request: false,
        previous_authorization: Some(Secret::new("C242720181323966504820".to_string())),
    };
    let document = connector()
        .build_request_document(&OperationRequest::Recurring(data))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Purchase);

    assert_eq!(
        names(transaction)[5..],
        [tags::GUWID, tags::RECURRING_TRANSACTION]
    );
    assert_eq!(
        transaction.child(tags::GUWID).unwrap().text(),
        Some("C242720181323966504820")
    );
    assert!(transaction.child(tags::CREDIT_CARD_DATA).is_none());
}

#[test]
fn repeated_authorization_sends_only_the_recurring_block() {
    let data = PaymentsAuthorizeData {
        transaction: transaction(),
        card: None,
        recurring: true,
        previous_authorization: Some(Secret::new("C242720181323966504820".to_string())),
    };
    let document = connector()
        .build_request_document(&OperationRequest::Authorize(data))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Authorization);
    assert_eq!(names(transaction)[5..], [tags::RECURRING_TRANSACTION]);
}

fn recurring_payment(previous_authorization: Option<&str>) -> PaymentsAuthorizeData {
    PaymentsAuthorizeData {
        transaction: transaction(),
        card: Some(card(Some("123"))),
        recurring: true,
        previous_authorization: previous_authorization
            .map(|token| Secret::new(token.to_string())),
    }
}

fn recurring_type(transaction: &XmlElement) -> Option<&str> {
    transaction
        .child(tags::RECURRING_TRANSACTION)
        .and_then(|recurring| recurring.child(tags::RECURRING_TYPE))
        .and_then(XmlElement::text)
}

#[test]
fn recurring_payment_without_token_starts_a_series() {
    for (request, function) in [
        (
            OperationRequest::Authorize(recurring_payment(None)),
            WirecardFunction::Authorization,
        ),
        (
            OperationRequest::Purchase(recurring_payment(None)),
            WirecardFunction::Purchase,
        ),
        (
            OperationRequest::Purchase(recurring_payment(Some("  "))),
            WirecardFunction::Purchase,
        ),
    ] {
        let document = connector().build_request_document(&request).unwrap();
        let transaction = cc_transaction(&document, function);
        assert_eq!(
            names(transaction)[5..],
            [tags::RECURRING_TRANSACTION, tags::CREDIT_CARD_DATA]
        );
        assert_eq!(recurring_type(transaction), Some("Initial"));
    }
}

#[test]
fn recurring_payment_with_token_repeats_the_series() {
    let document = connector()
        .build_request_document(&OperationRequest::Purchase(recurring_payment(Some(
            "C242720181323966504820",
        ))))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Purchase);
    assert_eq!(
        names(transaction)[5..],
        [tags::GUWID, tags::RECURRING_TRANSACTION]
    );
    assert_eq!(recurring_type(transaction), Some("Repeated"));

    let document = connector()
        .build_request_document(&OperationRequest::Authorize(recurring_payment(Some(
            "C242720181323966504820",
        ))))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Authorization);
    assert_eq!(names(transaction)[5..], [tags::RECURRING_TRANSACTION]);
    assert_eq!(recurring_type(transaction), Some("Repeated"));
}

#[test]
fn initial_recurring_request_with_token_keeps_it() {
    let data = RecurringPaymentData {
        transaction: transaction(),
        card: Some(card(Some("123"))),
        initial_request: true,
        previous_authorization: Some(Secret::new("C242720181323966504820".to_string())),
    };
    let recurring = WirecardRecurringRequest::try_from(&data).unwrap();
    assert_eq!(recurring.function, WirecardFunction::Authorization);
    assert_eq!(
        recurring.payment.get_recurring_stage(),
        Some(RecurringStage::Repeated)
    );

    let document = connector()
        .build_request_document(&OperationRequest::Recurring(data))
        .unwrap();
    let transaction = cc_transaction(&document, WirecardFunction::Authorization);
    assert_eq!(names(transaction)[5..], [tags::RECURRING_TRANSACTION]);
    assert_eq!(recurring_type(transaction), Some("Repeated"));
}

#[test]
fn repeated_recurring_charge_needs_a_token() {
    let data = RecurringPaymentData {
        transaction: transaction(),
        card: None,
        initial_request: false,
        previous_authorization: Some(Secret::new(String::new())),
    };
    let error = WirecardRecurringRequest::try_from(&data).unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::MissingRequiredField {
            field_name: "guwid"
        }
    );
}

#[test]
fn auth_type_requires_signature_key() {
    let auth = WirecardAuthType::try_from(&auth()).unwrap();
    assert_eq!(hyperswitch_masking::PeekInterface::peek(&auth.login), "login");

    let error = WirecardAuthType::try_from(&ConnectorAuthType::HeaderKey {
        api_key: Secret::new("key".to_string()),
    })
    .unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::FailedToObtainAuthType
    );

    let error = WirecardAuthType::try_from(&ConnectorAuthType::SignatureKey {
        api_key: Secret::new("login".to_string()),
        key1: Secret::new("password".to_string()),
        api_secret: Secret::new(String::new()),
    })
    .unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::MissingAuthField {
            field_name: "business_case_signature"
        }
    );
}

#[test]
fn flatten_collects_every_leaf() {
    let document = XmlElement::container(
        "ROOT",
        vec![XmlElement::container(
            "A",
            vec![
                XmlElement::leaf("GuWID", "C1"),
                XmlElement::container("B", vec![XmlElement::leaf("Info", "demo")]),
                XmlElement::leaf("Empty", ""),
            ],
        )],
    );
    let fields = responses::flatten(&document);
    assert_eq!(fields.len(), 3);
    assert_eq!(fields.get("GuWID"), Some("C1"));
    assert_eq!(fields.get("Info"), Some("demo"));
    assert_eq!(fields.get("Empty"), Some(""));
    assert!(!fields.contains_key("ROOT"));
    assert!(!fields.contains_key("A"));
}

#[test]
fn flatten_hoists_top_level_advice_only() {
    let document = XmlElement::container(
        "ROOT",
        vec![
            XmlElement::leaf("Advice", "check the card"),
            XmlElement::container("ERROR", vec![XmlElement::leaf("Advice", "nested")]),
        ],
    );
    let fields = responses::flatten(&document);
    assert_eq!(fields.get("message"), Some("check the card"));
    assert_eq!(fields.get("Advice"), Some("nested"));
}

#[test]
fn flatten_keeps_the_last_duplicate() {
    let document = XmlElement::container(
        "ROOT",
        vec![
            XmlElement::container("ERROR", vec![XmlElement::leaf("Type", "REJECTED")]),
            XmlElement::container(
                "RECURRING_TRANSACTION",
                vec![XmlElement::leaf("Type", "Repeated")],
            ),
        ],
    );
    assert_eq!(responses::flatten(&document).get("Type"), Some("Repeated"));
}

fn fields(entries: &[(&str, &str)]) -> FlatFieldMap {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn acknowledged_job_is_a_success_with_token() {
    let outcome = transformers::classify(
        "<ok/>".to_string(),
        fields(&[
            ("FunctionResult", "ACK"),
            ("GuWID", "C242720181323966504820"),
            ("Info", "demo"),
        ]),
        true,
    );
    assert!(outcome.is_success());
    assert_eq!(outcome.authorization.as_deref(), Some("C242720181323966504820"));
    assert_eq!(outcome.message, "demo");
    assert!(outcome.test);
    assert_eq!(outcome.fraud_review(), "<ok/>");
}

#[test]
fn declined_job_has_message_and_no_token() {
    let outcome = transformers::classify(
        String::new(),
        fields(&[
            ("FunctionResult", "NOK"),
            ("GuWID", "C242720181323966504827"),
            ("Message", "Credit card number invalid."),
        ]),
        false,
    );
    assert!(!outcome.is_success());
    assert_eq!(outcome.authorization, None);
    assert_eq!(outcome.message, "Credit card number invalid.");
}

#[test]
fn pending_job_uses_guwid_not_authorization_code() {
    let outcome = transformers::classify(
        String::new(),
        fields(&[
            ("FunctionResult", "PENDING"),
            ("GuWID", "X"),
            ("AuthorizationCode", "153620"),
        ]),
        true,
    );
    assert!(outcome.is_success());
    assert_eq!(outcome.authorization.as_deref(), Some("X"));
    assert_eq!(outcome.message, "");
}

#[test]
fn unknown_or_missing_result_is_a_failure() {
    let outcome = transformers::classify(
        String::new(),
        fields(&[("FunctionResult", "MAYBE"), ("GuWID", "X")]),
        true,
    );
    assert!(!outcome.is_success());
    assert_eq!(outcome.authorization, None);

    let outcome = transformers::classify(String::new(), FlatFieldMap::new(), true);
    assert!(!outcome.is_success());
    assert_eq!(outcome.message, "");
}

#[test]
fn function_result_reads_gateway_words() {
    assert_eq!(FunctionResult::from("ACK"), FunctionResult::Ack);
    assert_eq!(FunctionResult::from("PENDING"), FunctionResult::Pending);
    assert_eq!(FunctionResult::from("NOK"), FunctionResult::Nok);
    assert_eq!(
        FunctionResult::from("ack"),
        FunctionResult::Unknown("ack".to_string())
    );
    assert_eq!(FunctionResult::Pending.to_string(), "PENDING");
}

#[test]
fn authentication_page_wins_over_any_xml() {
    let body = "<html><body>This is an error page<FunctionResult>ACK</FunctionResult></body></html>";
    let outcome = transformers::classify(
        body.to_string(),
        fields(&[("FunctionResult", "ACK"), ("GuWID", "X")]),
        true,
    );
    assert!(!outcome.is_success());
    assert_eq!(outcome.message, transformers::AUTH_ERROR_MESSAGE);
    assert!(outcome.fields.is_empty());
    assert_eq!(outcome.authorization, None);

    let outcome = transformers::handle_response(body.to_string(), true).unwrap();
    assert_eq!(outcome.message, transformers::AUTH_ERROR_MESSAGE);
}

#[test]
fn unparseable_body_is_a_deserialization_error() {
    let error = transformers::handle_response("Service Unavailable".to_string(), true).unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::ResponseDeserializationFailed
    );
}

#[test]
fn transport_failure_is_passed_through() {
    let data = PaymentsAuthorizeData::new(transaction(), card(Some("123")));
    let error = connector().authorize(&data).unwrap_err();
    assert_eq!(
        error.current_context(),
        &ConnectorError::TransportFailed(ApiClientError::RequestNotSent("offline".to_string()))
    );
}
