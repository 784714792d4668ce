use crate::domain::Transaction;
use chrono::{DateTime, NaiveDateTime};
use std::fmt;
use std::net::IpAddr;

pub const ID_MAX_LEN: usize = 255;
pub const NAME_MAX_LEN: usize = 255;
pub const CURRENCY_CODE_LEN: usize = 3;
pub const COUNTRY_CODE_LEN: usize = 2;
pub const LAST_FOUR_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_required(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }

    Ok(())
}

pub fn validate_max_len(field: &'static str, value: &str, max_len: usize) -> ValidationResult {
    if value.len() > max_len {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
    }

    Ok(())
}

pub fn validate_identifier(field: &'static str, value: &str) -> ValidationResult {
    validate_required(field, value)?;
    validate_max_len(field, value, ID_MAX_LEN)
}

pub fn validate_alpha_code(field: &'static str, value: &str, len: usize) -> ValidationResult {
    if value.len() != len || !value.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(ValidationError::new(
            field,
            format!("must be a {}-letter code", len),
        ));
    }

    Ok(())
}

/// ISO-8601 date-times with an offset
const OFFSET_FORMATS: &[&str] = &["%Y%m%dT%H%M%S%.f%#z"];
/// ISO-8601 local date-times
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y%m%dT%H%M%S%.f"];

/// Accepts extended and basic ISO-8601 date-times, with or without an offset.
pub fn validate_timestamp(value: &str) -> ValidationResult {
    let parsed = DateTime::parse_from_rfc3339(value).is_ok()
        || OFFSET_FORMATS
            .iter()
            .any(|format| DateTime::parse_from_str(value, format).is_ok())
        || LOCAL_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok());

    if !parsed {
        return Err(ValidationError::new(
            "timestamp",
            "must be an ISO-8601 timestamp",
        ));
    }

    Ok(())
}

pub fn validate_amount(amount: f64) -> ValidationResult {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::new("amount", "must be a non-negative number"));
    }

    Ok(())
}

pub fn validate_last_four(value: &str) -> ValidationResult {
    if value.len() != LAST_FOUR_LEN || !value.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::new(
            "payment_method.last_four",
            "must be exactly 4 digits",
        ));
    }

    Ok(())
}

pub fn validate_ip_address(value: &str) -> ValidationResult {
    value
        .parse::<IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("customer.ip_address", "must be an IP address"))
}

/// Field-level checks applied at ingress, after serde has enforced presence.
pub fn validate_transaction(tx: &Transaction) -> ValidationResult {
    validate_identifier("transaction_id", &tx.transaction_id)?;
    validate_timestamp(&tx.timestamp)?;
    validate_amount(tx.amount)?;
    validate_alpha_code("currency", &tx.currency, CURRENCY_CODE_LEN)?;

    validate_identifier("customer.id", &tx.customer.id)?;
    validate_alpha_code("customer.country", &tx.customer.country, COUNTRY_CODE_LEN)?;
    validate_ip_address(&tx.customer.ip_address)?;

    validate_required("payment_method.type", &tx.payment_method.kind)?;
    validate_last_four(&tx.payment_method.last_four)?;
    validate_alpha_code(
        "payment_method.country_of_issue",
        &tx.payment_method.country_of_issue,
        COUNTRY_CODE_LEN,
    )?;

    validate_identifier("merchant.id", &tx.merchant.id)?;
    validate_required("merchant.name", &tx.merchant.name)?;
    validate_max_len("merchant.name", &tx.merchant.name, NAME_MAX_LEN)?;
    validate_required("merchant.category", &tx.merchant.category)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::fixtures::sample_transaction;

    #[test]
    fn validates_required_field() {
        assert!(validate_required("field", "value").is_ok());
        assert!(validate_required("field", "   ").is_err());
    }

    #[test]
    fn validates_max_len() {
        assert!(validate_max_len("field", "abc", 3).is_ok());
        assert!(validate_max_len("field", "abcd", 3).is_err());
    }

    #[test]
    fn validates_codes() {
        assert!(validate_alpha_code("currency", "USD", 3).is_ok());
        assert!(validate_alpha_code("currency", "usd", 3).is_ok());
        assert!(validate_alpha_code("currency", "US", 3).is_err());
        assert!(validate_alpha_code("currency", "U5D", 3).is_err());
        assert!(validate_alpha_code("country", "CA", 2).is_ok());
        assert!(validate_alpha_code("country", "CAN", 2).is_err());
    }

    #[test]
    fn validates_timestamp() {
        assert!(validate_timestamp("2025-05-07T14:30:45Z").is_ok());
        assert!(validate_timestamp("2025-05-07T14:30:45+02:00").is_ok());
        assert!(validate_timestamp("yesterday").is_err());
    }

    #[test]
    fn validates_local_and_basic_timestamps() {
        assert!(validate_timestamp("2025-05-07T14:30:45").is_ok());
        assert!(validate_timestamp("2025-05-07T14:30:45.123456").is_ok());
        assert!(validate_timestamp("20250507T143045Z").is_ok());
        assert!(validate_timestamp("20250507T143045+0200").is_ok());
        assert!(validate_timestamp("20250507T143045").is_ok());

        assert!(validate_timestamp("2025-05-07").is_err());
        assert!(validate_timestamp("2025-13-07T14:30:45").is_err());
        assert!(validate_timestamp("2025-05-07 14:30").is_err());
    }

    #[test]
    fn validates_amount() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(129.99).is_ok());
        assert!(validate_amount(-0.01).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }

    #[test]
    fn validates_last_four() {
        assert!(validate_last_four("4242").is_ok());
        assert!(validate_last_four("424").is_err());
        assert!(validate_last_four("42a2").is_err());
    }

    #[test]
    fn validates_ip_address() {
        assert!(validate_ip_address("192.168.1.1").is_ok());
        assert!(validate_ip_address("::1").is_ok());
        assert!(validate_ip_address("not-an-ip").is_err());
    }

    #[test]
    fn accepts_sample_transaction() {
        assert!(validate_transaction(&sample_transaction()).is_ok());
    }

    #[test]
    fn reports_offending_field() {
        let mut tx = sample_transaction();
        tx.merchant.id = String::new();
        let err = validate_transaction(&tx).unwrap_err();
        assert_eq!(err.field, "merchant.id");
        assert_eq!(err.to_string(), "merchant.id: must not be empty");
    }
}
