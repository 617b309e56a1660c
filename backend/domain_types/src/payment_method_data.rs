use common_enums::CardNetwork;
use hyperswitch_masking::Secret;
use serde::{Deserialize, Serialize};

/// Card details supplied with an authorization or purchase
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub card_number: cards::CardNumber,
    /// Verification code; `None` omits it from the request entirely
    pub card_cvc: Option<cards::CardSecurityCode>,
    pub card_exp_month: cards::CardExpirationMonth,
    pub card_exp_year: cards::CardExpirationYear,
    pub card_holder_first_name: Secret<String>,
    pub card_holder_last_name: Secret<String>,
    pub card_network: Option<CardNetwork>,
}

impl Card {
    pub fn get_expiry_month_2_digit(&self) -> String {
        self.card_exp_month.two_digits()
    }

    pub fn get_expiry_year_4_digit(&self) -> String {
        self.card_exp_year.four_digits()
    }

    /// Network given by the caller, else detected from the card number
    pub fn get_card_network(&self) -> Option<CardNetwork> {
        self.card_network
            .or_else(|| self.card_number.get_card_network())
    }
}
