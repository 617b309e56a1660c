use common_utils::{id_type::IdGenerator, xml::XmlElement, StringMinorUnit};
use domain_types::{
    connector_types::{
        PaymentsAuthorizeData, PaymentsCaptureData, RecurringStage, TransactionDetails,
    },
    errors::ConnectorError,
    payment_method_data::Card,
    utils::missing_field_err,
};
use hyperswitch_masking::{PeekInterface, Secret};

type Error = error_stack::Report<ConnectorError>;

pub const FUNCTION_ID: &str = "A WireCard Function";
/// Switch for the contact data block, off for every job
pub const DO_CONTACT_DATA: bool = false;

const XSI_NAMESPACE: &str = "http://www.w3.org/1999/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "wirecard.xsd";
const AMOUNT_MINOR_UNITS: &str = "2";

pub mod tags {
    pub const ROOT: &str = "WIRECARD_BXML";
    pub const REQUEST: &str = "W_REQUEST";
    pub const JOB: &str = "W_JOB";
    pub const JOB_ID: &str = "JobID";
    pub const BUSINESS_CASE_SIGNATURE: &str = "BusinessCaseSignature";
    pub const FUNCTION_ID: &str = "FunctionID";
    pub const TRANSACTION: &str = "CC_TRANSACTION";
    pub const TRANSACTION_ID: &str = "TransactionID";
    pub const GUWID: &str = "GuWID";
    pub const AMOUNT: &str = "Amount";
    pub const CURRENCY: &str = "Currency";
    pub const COUNTRY_CODE: &str = "CountryCode";
    pub const USAGE: &str = "Usage";
    pub const RECURRING_TRANSACTION: &str = "RECURRING_TRANSACTION";
    pub const RECURRING_TYPE: &str = "Type";
    pub const CREDIT_CARD_DATA: &str = "CREDIT_CARD_DATA";
    pub const CREDIT_CARD_NUMBER: &str = "CreditCardNumber";
    pub const CVC2: &str = "CVC2";
    pub const EXPIRATION_YEAR: &str = "ExpirationYear";
    pub const EXPIRATION_MONTH: &str = "ExpirationMonth";
    pub const CARD_HOLDER_NAME: &str = "CardHolderName";
    pub const CONTACT_DATA: &str = "CONTACT_DATA";
    pub const IP_ADDRESS: &str = "IPAddress";
}

/// Leaves holding card data, masked before a request body is logged
pub const SENSITIVE_TAGS: [&str; 2] = [tags::CREDIT_CARD_NUMBER, tags::CVC2];

/// Gateway operation requested by a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum WirecardFunction {
    #[strum(serialize = "FNC_CC_AUTHORIZATION")]
    Authorization,
    #[strum(serialize = "FNC_CC_CAPTURE_AUTHORIZATION")]
    CaptureAuthorization,
    #[strum(serialize = "FNC_CC_PURCHASE")]
    Purchase,
}

/// Identifiers stamped on one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirecardJobIds {
    pub job_id: String,
    pub transaction_id: String,
}

impl WirecardJobIds {
    /// Use the caller's ids where given, drawing the job id first and the transaction id second
    pub fn resolve(transaction: &TransactionDetails, id_generator: &dyn IdGenerator) -> Self {
        let job_id = transaction
            .job_id
            .clone()
            .unwrap_or_else(|| id_generator.next_unique_id());
        let transaction_id = transaction
            .transaction_id
            .clone()
            .unwrap_or_else(|| id_generator.next_unique_id());
        Self {
            job_id,
            transaction_id,
        }
    }
}

/// Everything a job needs besides the operation's own data
#[derive(Debug)]
pub struct WirecardJobContext<'a> {
    pub business_case_signature: &'a Secret<String>,
    pub ids: WirecardJobIds,
    pub amount: StringMinorUnit,
}

pub fn build_authorization_request(
    context: &WirecardJobContext<'_>,
    data: &PaymentsAuthorizeData,
) -> Result<XmlElement, Error> {
    let mut transaction = transaction_fields(context, &data.transaction, None);
    transaction.extend(payment_fields(WirecardFunction::Authorization, data)?);
    transaction.extend(contact_data());
    Ok(envelope(
        context,
        WirecardFunction::Authorization,
        transaction,
    ))
}

pub fn build_purchase_request(
    context: &WirecardJobContext<'_>,
    data: &PaymentsAuthorizeData,
) -> Result<XmlElement, Error> {
    let mut transaction = transaction_fields(context, &data.transaction, None);
    transaction.extend(payment_fields(WirecardFunction::Purchase, data)?);
    transaction.extend(contact_data());
    Ok(envelope(context, WirecardFunction::Purchase, transaction))
}

/// Capture never carries card or recurring data
pub fn build_capture_request(
    context: &WirecardJobContext<'_>,
    data: &PaymentsCaptureData,
) -> Result<XmlElement, Error> {
    let guwid = data.get_authorization().ok_or_else(missing_field_err("guwid"))?;
    let transaction = transaction_fields(context, &data.transaction, Some(guwid));
    Ok(envelope(
        context,
        WirecardFunction::CaptureAuthorization,
        transaction,
    ))
}

fn envelope(
    context: &WirecardJobContext<'_>,
    function: WirecardFunction,
    transaction: Vec<XmlElement>,
) -> XmlElement {
    let function_block = XmlElement::container(
        function.to_string(),
        vec![
            XmlElement::leaf(tags::FUNCTION_ID, FUNCTION_ID),
            XmlElement::container(tags::TRANSACTION, transaction),
        ],
    );
    let job = XmlElement::container(
        tags::JOB,
        vec![
            XmlElement::leaf(tags::JOB_ID, context.ids.job_id.as_str()),
            XmlElement::leaf(
                tags::BUSINESS_CASE_SIGNATURE,
                context.business_case_signature.peek().as_str(),
            ),
            function_block,
        ],
    );
    XmlElement::container(
        tags::ROOT,
        vec![XmlElement::container(tags::REQUEST, vec![job])],
    )
    .with_attribute("xmlns:xsi", XSI_NAMESPACE)
    .with_attribute("xsi:noNamespaceSchemaLocation", SCHEMA_LOCATION)
}

fn transaction_fields(
    context: &WirecardJobContext<'_>,
    transaction: &TransactionDetails,
    guwid: Option<&str>,
) -> Vec<XmlElement> {
    let mut fields = vec![XmlElement::leaf(
        tags::TRANSACTION_ID,
        context.ids.transaction_id.as_str(),
    )];
    fields.extend(guwid.map(|guwid| XmlElement::leaf(tags::GUWID, guwid)));
    fields.extend([
        XmlElement::leaf(tags::AMOUNT, context.amount.get_amount_as_string())
            .with_attribute("minorunits", AMOUNT_MINOR_UNITS),
        XmlElement::leaf(tags::CURRENCY, transaction.currency.to_string()),
        XmlElement::leaf(tags::COUNTRY_CODE, transaction.country.to_string()),
        XmlElement::leaf(tags::USAGE, transaction.description.as_str()),
    ]);
    fields
}

fn payment_fields(
    function: WirecardFunction,
    data: &PaymentsAuthorizeData,
) -> Result<Vec<XmlElement>, Error> {
    let card = || {
        data.card
            .as_ref()
            .map(card_block)
            .ok_or_else(missing_field_err("payment_method_data.card"))
    };

    match data.get_recurring_stage() {
        None => Ok(vec![card()?]),
        Some(RecurringStage::Initial) => {
            Ok(vec![recurring_block(RecurringStage::Initial), card()?])
        }
        Some(RecurringStage::Repeated) => {
            let guwid = data
                .get_previous_authorization()
                .ok_or_else(missing_field_err("guwid"))?;
            let repeated = recurring_block(RecurringStage::Repeated);
            // Only purchase references the prior charge
            Ok(match function {
                WirecardFunction::Purchase => vec![XmlElement::leaf(tags::GUWID, guwid), repeated],
                WirecardFunction::Authorization | WirecardFunction::CaptureAuthorization => {
                    vec![repeated]
                }
            })
        }
    }
}

fn recurring_block(stage: RecurringStage) -> XmlElement {
    XmlElement::container(
        tags::RECURRING_TRANSACTION,
        vec![XmlElement::leaf(tags::RECURRING_TYPE, stage.to_string())],
    )
}

fn card_block(card: &Card) -> XmlElement {
    let mut fields = vec![XmlElement::leaf(
        tags::CREDIT_CARD_NUMBER,
        card.card_number.get_card_no(),
    )];
    fields.extend(
        card.card_cvc
            .as_ref()
            .map(|cvc| XmlElement::leaf(tags::CVC2, cvc.peek().as_str())),
    );
    fields.extend([
        XmlElement::leaf(tags::EXPIRATION_YEAR, card.get_expiry_year_4_digit()),
        XmlElement::leaf(tags::EXPIRATION_MONTH, card.get_expiry_month_2_digit()),
        XmlElement::leaf(
            tags::CARD_HOLDER_NAME,
            format!(
                "{} {}",
                card.card_holder_last_name.peek(),
                card.card_holder_first_name.peek()
            ),
        ),
    ]);
    XmlElement::container(tags::CREDIT_CARD_DATA, fields)
}

fn contact_data() -> Option<XmlElement> {
    DO_CONTACT_DATA.then(|| {
        XmlElement::container(
            tags::CONTACT_DATA,
            vec![XmlElement::leaf(tags::IP_ADDRESS, "")],
        )
    })
}
