//! Field rules for incoming card bodies.
//!
//! Rules are declared per field as an ordered list of checks. The first failing
//! check of a field yields that field's message; fields are reported in
//! alphabetical order, joined by `"; "` and closed with a single `"."`.

use super::model::CardRequest;
use regex::Regex;
use std::{collections::BTreeMap, fmt};

const MSG_REQUIRED: &str = "cannot be blank";
const MSG_CVV_MIN: &str = "must be no less than 100";
const MSG_CVV_MAX: &str = "must be no greater than 999";
const MSG_EXPIRATION_DATE: &str = "дата не коректна";
const MSG_HOLDER_LENGTH: &str = "the length must be between 5 and 50";
const MSG_NUMBER: &str = "must be a valid credit card number";

const CVV_MIN: i64 = 100;
const CVV_MAX: i64 = 999;
const HOLDER_MIN_CHARS: usize = 5;
const HOLDER_MAX_CHARS: usize = 50;

const EXPIRATION_DATE_PATTERN: &str = r"^(0[1-9]|1[0-2])/[0-9]{2}$";

// Visa, Mastercard, Discover, Amex, Diners, JCB and 62/67 prefixed numbers.
const CARD_NUMBER_PATTERN: &str = r"^(?:4[0-9]{12}(?:[0-9]{3})?|5[1-5][0-9]{14}|(?:222[1-9]|22[3-9][0-9]|2[3-6][0-9]{2}|27[01][0-9]|2720)[0-9]{12}|6(?:011|5[0-9][0-9])[0-9]{12}|3[47][0-9]{13}|3(?:0[0-5]|[68][0-9])[0-9]{11}|(?:2131|1800|35[0-9]{3})[0-9]{11}|6[27][0-9]{14})$";

type Check = fn(&CardRequest) -> Result<(), &'static str>;

struct FieldRules {
    field: &'static str,
    checks: &'static [Check],
}

const RULES: &[FieldRules] = &[
    FieldRules {
        field: "cvv",
        checks: &[cvv_required, cvv_min, cvv_max],
    },
    FieldRules {
        field: "expiration_date",
        checks: &[expiration_date_required, expiration_date_format],
    },
    FieldRules {
        field: "holder",
        checks: &[holder_required, holder_length],
    },
    FieldRules {
        field: "number",
        checks: &[number_required, number_format],
    },
];

/// Field violations keyed by JSON field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    #[cfg(test)]
    fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        f.write_str(".")
    }
}

impl std::error::Error for ValidationErrors {}

/// Run every field rule against `card`.
///
/// # Errors
/// Returns the collected [`ValidationErrors`] when at least one field is invalid.
pub fn validate(card: &CardRequest) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for rules in RULES {
        if let Some(message) = rules.checks.iter().find_map(|check| check(card).err()) {
            errors.0.insert(rules.field, message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Issuer prefix/length check followed by the Luhn checksum. Spaces and dashes
/// between digit groups are ignored.
#[must_use]
pub fn valid_card_number(number: &str) -> bool {
    let sanitized: String = number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    if !Regex::new(CARD_NUMBER_PATTERN).is_ok_and(|re| re.is_match(&sanitized)) {
        return false;
    }

    luhn(&sanitized)
}

#[must_use]
pub fn valid_expiration_date(date: &str) -> bool {
    Regex::new(EXPIRATION_DATE_PATTERN).is_ok_and(|re| re.is_match(date))
}

// expects ASCII digits only
fn luhn(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(index, byte)| {
            let digit = u32::from(byte - b'0');
            if index % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

fn cvv_required(card: &CardRequest) -> Result<(), &'static str> {
    if card.cvv == 0 { Err(MSG_REQUIRED) } else { Ok(()) }
}

fn cvv_min(card: &CardRequest) -> Result<(), &'static str> {
    if card.cvv < CVV_MIN { Err(MSG_CVV_MIN) } else { Ok(()) }
}

fn cvv_max(card: &CardRequest) -> Result<(), &'static str> {
    if card.cvv > CVV_MAX { Err(MSG_CVV_MAX) } else { Ok(()) }
}

fn expiration_date_required(card: &CardRequest) -> Result<(), &'static str> {
    if card.expiration_date.is_empty() {
        Err(MSG_REQUIRED)
    } else {
        Ok(())
    }
}

fn expiration_date_format(card: &CardRequest) -> Result<(), &'static str> {
    if valid_expiration_date(&card.expiration_date) {
        Ok(())
    } else {
        Err(MSG_EXPIRATION_DATE)
    }
}

fn holder_required(card: &CardRequest) -> Result<(), &'static str> {
    if card.holder.is_empty() { Err(MSG_REQUIRED) } else { Ok(()) }
}

fn holder_length(card: &CardRequest) -> Result<(), &'static str> {
    let chars = card.holder.chars().count();
    if (HOLDER_MIN_CHARS..=HOLDER_MAX_CHARS).contains(&chars) {
        Ok(())
    } else {
        Err(MSG_HOLDER_LENGTH)
    }
}

fn number_required(card: &CardRequest) -> Result<(), &'static str> {
    if card.number.is_empty() { Err(MSG_REQUIRED) } else { Ok(()) }
}

fn number_format(card: &CardRequest) -> Result<(), &'static str> {
    if valid_card_number(&card.number) {
        Ok(())
    } else {
        Err(MSG_NUMBER)
    }
}
