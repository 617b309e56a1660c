use std::{fmt, str::FromStr};

use common_enums::CardNetwork;
use hyperswitch_masking::{ExposeInterface, PeekInterface, Secret, Strategy};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Minimum length of a card number
pub const MIN_CARD_NUMBER_LENGTH: usize = 12;
/// Maximum length of a card number
pub const MAX_CARD_NUMBER_LENGTH: usize = 19;

#[derive(Debug, Deserialize, Serialize, Error)]
#[error("{0}")]
pub struct CardNumberValidationErr(&'static str);

/// Card number
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CardNumber(Secret<String, CardNumberStrategy>);

impl CardNumber {
    /// Issuer identification number, the first six digits
    pub fn get_card_isin(&self) -> String {
        self.0.peek().chars().take(6).collect()
    }

    pub fn get_last4(&self) -> String {
        let number = self.0.peek();
        number
            .chars()
            .skip(number.len().saturating_sub(4))
            .collect()
    }

    /// The full card number, for placing on the wire
    pub fn get_card_no(&self) -> String {
        self.0.clone().expose()
    }

    /// Card number with everything but the first six and last four digits replaced by `*`
    pub fn get_masked_number(&self) -> String {
        mask_card_number(self.0.peek())
    }

    /// Detect the card network from the number's prefix
    pub fn get_card_network(&self) -> Option<CardNetwork> {
        let number = self.0.peek();
        let two_digit_prefix = prefix_value(number, 2)?;
        let four_digit_prefix = prefix_value(number, 4)?;
        if number.starts_with('4') {
            Some(CardNetwork::Visa)
        } else if (51..=55).contains(&two_digit_prefix)
            || (2221..=2720).contains(&four_digit_prefix)
        {
            Some(CardNetwork::Mastercard)
        } else {
            None
        }
    }
}

fn prefix_value(number: &str, length: usize) -> Option<u32> {
    number.get(..length).and_then(|prefix| prefix.parse().ok())
}

fn mask_card_number(number: &str) -> String {
    if number.len() <= 10 {
        return "*".repeat(number.len());
    }
    let hidden = number.len() - 10;
    let first_six: String = number.chars().take(6).collect();
    let last_four: String = number.chars().skip(6 + hidden).collect();
    format!("{first_six}{}{last_four}", "*".repeat(hidden))
}

impl FromStr for CardNumber {
    type Err = CardNumberValidationErr;

    fn from_str(card_number: &str) -> Result<Self, Self::Err> {
        let number: String = card_number.split_whitespace().collect();

        if !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(CardNumberValidationErr("card number must contain only digits"));
        }
        if !(MIN_CARD_NUMBER_LENGTH..=MAX_CARD_NUMBER_LENGTH).contains(&number.len()) {
            return Err(CardNumberValidationErr("card number has an invalid length"));
        }

        Ok(Self(Secret::new(number)))
    }
}

impl TryFrom<String> for CardNumber {
    type Error = CardNumberValidationErr;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl<'de> Deserialize<'de> for CardNumber {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

pub enum CardNumberStrategy {}

impl<T> Strategy<T> for CardNumberStrategy
where
    T: AsRef<str>,
{
    fn fmt(val: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&mask_card_number(val.as_ref()))
    }
}
