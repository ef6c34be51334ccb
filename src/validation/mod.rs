use bigdecimal::BigDecimal;
use std::fmt;

pub const TRANSACTION_ID_MAX_LEN: usize = 255;
pub const CURRENCY_MAX_LEN: usize = 10;
pub const AMOUNT_MAX_DIGITS: u64 = 18;
pub const AMOUNT_MAX_SCALE: i64 = 2;

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

/// Strips control characters and collapses runs of whitespace.
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

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

pub fn validate_transaction_id(transaction_id: &str) -> ValidationResult {
    let transaction_id = sanitize_string(transaction_id);
    validate_required("transaction_id", &transaction_id)?;
    validate_max_len("transaction_id", &transaction_id, TRANSACTION_ID_MAX_LEN)?;

    Ok(())
}

pub fn validate_account(field: &'static str, account: &str) -> ValidationResult {
    let account = sanitize_string(account);
    validate_required(field, &account)?;

    Ok(())
}

pub fn validate_currency(currency: &str) -> ValidationResult {
    let currency = sanitize_string(currency);
    validate_required("currency", &currency)?;
    validate_max_len("currency", &currency, CURRENCY_MAX_LEN)?;

    Ok(())
}

/// Enforces the NUMERIC(18, 2) shape of the amount column: at most two
/// decimal places and at most 18 digits overall, counted on the normalized
/// value so trailing zeros don't penalize the caller.
pub fn validate_amount(amount: &BigDecimal) -> ValidationResult {
    let normalized = amount.normalized();
    let (_, exponent) = normalized.as_bigint_and_exponent();

    if exponent > AMOUNT_MAX_SCALE {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} decimal places", AMOUNT_MAX_SCALE),
        ));
    }

    // digits() counts the unscaled integer; a negative exponent means
    // trailing integer zeros that still occupy column width.
    let total_digits = normalized.digits() + if exponent < 0 { (-exponent) as u64 } else { 0 };
    if total_digits > AMOUNT_MAX_DIGITS {
        return Err(ValidationError::new(
            "amount",
            format!("must have at most {} digits", AMOUNT_MAX_DIGITS),
        ));
    }

    Ok(())
}
