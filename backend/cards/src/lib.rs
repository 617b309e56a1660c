pub mod validate;

use std::str::FromStr;

use common_utils::errors::ValidationError;
use error_stack::report;
use hyperswitch_masking::{PeekInterface, Secret};
use serde::{Deserialize, Deserializer, Serialize};

pub use crate::validate::{CardNumber, CardNumberStrategy, CardNumberValidationErr};

/// Card verification code (CVC2 / CVV2); kept as text so leading zeros survive
#[derive(Clone, Debug, Serialize)]
pub struct CardSecurityCode(Secret<String>);

impl TryFrom<String> for CardSecurityCode {
    type Error = error_stack::Report<ValidationError>;

    fn try_from(csc: String) -> Result<Self, Self::Error> {
        if (3..=4).contains(&csc.len()) && csc.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(Secret::new(csc)))
        } else {
            Err(report!(ValidationError::InvalidValue {
                message: "invalid card security code".to_string()
            }))
        }
    }
}

impl FromStr for CardSecurityCode {
    type Err = error_stack::Report<ValidationError>;

    fn from_str(csc: &str) -> Result<Self, Self::Err> {
        Self::try_from(csc.to_string())
    }
}

impl<'de> Deserialize<'de> for CardSecurityCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let csc = String::deserialize(deserializer)?;
        csc.try_into().map_err(serde::de::Error::custom)
    }
}

impl PeekInterface<String> for CardSecurityCode {
    fn peek(&self) -> &String {
        self.0.peek()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CardExpirationMonth(Secret<u8>);

impl CardExpirationMonth {
    /// Month zero padded to two digits, e.g. `03`
    pub fn two_digits(&self) -> String {
        format!("{:02}", self.0.peek())
    }
}

impl TryFrom<u8> for CardExpirationMonth {
    type Error = error_stack::Report<ValidationError>;

    fn try_from(month: u8) -> Result<Self, Self::Error> {
        if (1..=12).contains(&month) {
            Ok(Self(Secret::new(month)))
        } else {
            Err(report!(ValidationError::InvalidValue {
                message: "invalid card expiration month".to_string()
            }))
        }
    }
}

impl FromStr for CardExpirationMonth {
    type Err = error_stack::Report<ValidationError>;

    fn from_str(month: &str) -> Result<Self, Self::Err> {
        let month = month.trim().parse::<u8>().map_err(|_| {
            report!(ValidationError::IncorrectValueProvided {
                field_name: "card_exp_month"
            })
        })?;
        Self::try_from(month)
    }
}

impl<'de> Deserialize<'de> for CardExpirationMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let month = u8::deserialize(deserializer)?;
        month.try_into().map_err(serde::de::Error::custom)
    }
}

impl PeekInterface<u8> for CardExpirationMonth {
    fn peek(&self) -> &u8 {
        self.0.peek()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct CardExpirationYear(Secret<u16>);

impl CardExpirationYear {
    pub fn four_digits(&self) -> String {
        self.0.peek().to_string()
    }
}

impl TryFrom<u16> for CardExpirationYear {
    type Error = error_stack::Report<ValidationError>;

    /// Accepts four digit years, and two digit years which are read as `20YY`
    fn try_from(year: u16) -> Result<Self, Self::Error> {
        match year {
            0..=99 => Ok(Self(Secret::new(2000 + year))),
            1000..=9999 => Ok(Self(Secret::new(year))),
            _ => Err(report!(ValidationError::InvalidValue {
                message: "invalid card expiration year".to_string()
            })),
        }
    }
}

impl FromStr for CardExpirationYear {
    type Err = error_stack::Report<ValidationError>;

    fn from_str(year: &str) -> Result<Self, Self::Err> {
        let year = year.trim().parse::<u16>().map_err(|_| {
            report!(ValidationError::IncorrectValueProvided {
                field_name: "card_exp_year"
            })
        })?;
        Self::try_from(year)
    }
}

impl<'de> Deserialize<'de> for CardExpirationYear {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let year = u16::deserialize(deserializer)?;
        year.try_into().map_err(serde::de::Error::custom)
    }
}

impl PeekInterface<u16> for CardExpirationYear {
    fn peek(&self) -> &u16 {
        self.0.peek()
    }
}
