use common_enums::{CountryAlpha2, Currency};
use common_utils::MinorUnit;
use hyperswitch_masking::{PeekInterface, Secret};
use serde::{Deserialize, Serialize};

use crate::{connector_flow::FlowName, payment_method_data::Card};

pub const DEFAULT_USAGE_DESCRIPTION: &str = "Default Usage description";

fn default_usage_description() -> String {
    DEFAULT_USAGE_DESCRIPTION.to_string()
}

/// Fields shared by every payment operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Amount in minor units, sent without scaling
    pub amount: MinorUnit,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub country: CountryAlpha2,
    #[serde(default = "default_usage_description")]
    pub description: String,
    /// Caller supplied transaction id; generated when absent
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Caller supplied job id; generated when absent
    #[serde(default)]
    pub job_id: Option<String>,
}

impl TransactionDetails {
    pub fn new(amount: MinorUnit) -> Self {
        Self {
            amount,
            currency: Currency::default(),
            country: CountryAlpha2::default(),
            description: default_usage_description(),
            transaction_id: None,
            job_id: None,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_country(mut self, country: CountryAlpha2) -> Self {
        self.country = country;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }
}

/// Position of a charge in a recurring series
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
pub enum RecurringStage {
    /// First charge of the series, carries full card data
    Initial,
    /// Follow-up charge referencing a prior authorization
    Repeated,
}

/// Request data for authorize and purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsAuthorizeData {
    #[serde(flatten)]
    pub transaction: TransactionDetails,
    pub card: Option<Card>,
    /// Part of a recurring series
    #[serde(default)]
    pub recurring: bool,
    /// Prior authorization token (GuWID), makes a recurring charge a repeated one
    #[serde(default)]
    pub previous_authorization: Option<Secret<String>>,
}

impl PaymentsAuthorizeData {
    pub fn new(transaction: TransactionDetails, card: Card) -> Self {
        Self {
            transaction,
            card: Some(card),
            recurring: false,
            previous_authorization: None,
        }
    }

    /// Stage of a recurring charge: `Repeated` once a prior token is known, `Initial` before
    pub fn get_recurring_stage(&self) -> Option<RecurringStage> {
        self.recurring
            .then(|| match self.get_previous_authorization() {
                Some(_) => RecurringStage::Repeated,
                None => RecurringStage::Initial,
            })
    }

    /// The prior token, with blank values read as absent
    pub fn get_previous_authorization(&self) -> Option<&str> {
        non_blank(self.previous_authorization.as_ref())
    }
}

/// Request data for capturing an earlier authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsCaptureData {
    #[serde(flatten)]
    pub transaction: TransactionDetails,
    /// GuWID returned by the authorization being captured
    pub authorization: Secret<String>,
}

impl PaymentsCaptureData {
    pub fn get_authorization(&self) -> Option<&str> {
        non_blank(Some(&self.authorization))
    }
}

/// Request data for a recurring charge, dispatched on `initial_request`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPaymentData {
    #[serde(flatten)]
    pub transaction: TransactionDetails,
    pub card: Option<Card>,
    pub initial_request: bool,
    #[serde(default)]
    pub previous_authorization: Option<Secret<String>>,
}

impl RecurringPaymentData {
    pub fn get_previous_authorization(&self) -> Option<&str> {
        non_blank(self.previous_authorization.as_ref())
    }
}

fn non_blank(value: Option<&Secret<String>>) -> Option<&str> {
    value
        .map(|secret| secret.peek().as_str())
        .filter(|token| !token.trim().is_empty())
}

/// A payment operation the connector can execute
#[derive(Debug, Clone)]
pub enum OperationRequest {
    Authorize(PaymentsAuthorizeData),
    Capture(PaymentsCaptureData),
    Purchase(PaymentsAuthorizeData),
    Recurring(RecurringPaymentData),
}

impl OperationRequest {
    pub fn flow_name(&self) -> FlowName {
        match self {
            Self::Authorize(_) => FlowName::Authorize,
            Self::Capture(_) => FlowName::Capture,
            Self::Purchase(_) => FlowName::Purchase,
            Self::Recurring(_) => FlowName::Recurring,
        }
    }

    pub fn transaction(&self) -> &TransactionDetails {
        match self {
            Self::Authorize(data) | Self::Purchase(data) => &data.transaction,
            Self::Capture(data) => &data.transaction,
            Self::Recurring(data) => &data.transaction,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn transaction_details_fall_back_to_gateway_defaults() {
        let details: TransactionDetails = serde_json::from_str(r#"{"amount": 100}"#).unwrap();
        assert_eq!(details.amount, MinorUnit::new(100));
        assert_eq!(details.currency, Currency::EUR);
        assert_eq!(details.country, CountryAlpha2::DE);
        assert_eq!(details.description, "Default Usage description");
        assert!(details.transaction_id.is_none());
        assert!(details.job_id.is_none());
    }

    #[test]
    fn blank_tokens_count_as_absent() {
        let capture = PaymentsCaptureData {
            transaction: TransactionDetails::new(MinorUnit::new(100)),
            authorization: Secret::new("   ".to_string()),
        };
        assert_eq!(capture.get_authorization(), None);

        let recurring = RecurringPaymentData {
            transaction: TransactionDetails::new(MinorUnit::new(100)),
            card: None,
            initial_request: false,
            previous_authorization: Some(Secret::new("C242720181323966504820".to_string())),
        };
        assert_eq!(
            recurring.get_previous_authorization(),
            Some("C242720181323966504820")
        );
    }

    #[test]
    fn recurring_stage_follows_the_prior_token() {
        let mut payment = PaymentsAuthorizeData {
            transaction: TransactionDetails::new(MinorUnit::new(100)),
            card: None,
            recurring: false,
            previous_authorization: Some(Secret::new("C242720181323966504820".to_string())),
        };
        assert_eq!(payment.get_recurring_stage(), None);

        payment.recurring = true;
        assert_eq!(payment.get_recurring_stage(), Some(RecurringStage::Repeated));

        payment.previous_authorization = Some(Secret::new(" ".to_string()));
        assert_eq!(payment.get_recurring_stage(), Some(RecurringStage::Initial));

        payment.previous_authorization = None;
        assert_eq!(payment.get_recurring_stage(), Some(RecurringStage::Initial));
    }

    #[test]
    fn recurring_stage_renders_wire_words() {
        assert_eq!(RecurringStage::Initial.to_string(), "Initial");
        assert_eq!(RecurringStage::Repeated.to_string(), "Repeated");
    }

    #[test]
    fn flow_name_follows_operation() {
        let capture = OperationRequest::Capture(PaymentsCaptureData {
            transaction: TransactionDetails::new(MinorUnit::new(1)),
            authorization: Secret::new("C1".to_string()),
        });
        assert_eq!(capture.flow_name(), FlowName::Capture);
        assert_eq!(capture.transaction().amount, MinorUnit::new(1));
    }
}
