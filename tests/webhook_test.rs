use bigdecimal::BigDecimal;
use serde_json::json;
use std::str::FromStr;
use txflow_core::handlers::webhook::WebhookTransactionIn;
use txflow_core::validation::{validate_amount, validate_currency, validate_transaction_id};

#[test]
fn test_webhook_payload_structure() {
    let payload = json!({
        "transaction_id": "txn_abc123def456",
        "source_account": "acct_source",
        "destination_account": "acct_destination",
        "amount": "100.00",
        "currency": "USD"
    });

    let parsed: WebhookTransactionIn = serde_json::from_value(payload).unwrap();
    assert_eq!(parsed.transaction_id, "txn_abc123def456");
    assert_eq!(parsed.amount, BigDecimal::from_str("100.00").unwrap());
    assert_eq!(parsed.currency, "USD");
}

#[test]
fn test_amount_accepted_as_json_number() {
    let payload = json!({
        "transaction_id": "txn_1",
        "source_account": "A",
        "destination_account": "B",
        "amount": 100,
        "currency": "USD"
    });

    let parsed: WebhookTransactionIn = serde_json::from_value(payload).unwrap();
    assert_eq!(parsed.amount, BigDecimal::from(100));
    assert!(validate_amount(&parsed.amount).is_ok());
}

#[test]
fn test_amount_precision_limits() {
    // NUMERIC(18, 2): at most two decimal places, at most 18 digits.
    assert!(validate_amount(&BigDecimal::from_str("100.00").unwrap()).is_ok());
    assert!(validate_amount(&BigDecimal::from_str("9999999999999999.99").unwrap()).is_ok());
    assert!(validate_amount(&BigDecimal::from_str("100.001").unwrap()).is_err());
    assert!(validate_amount(&BigDecimal::from_str("12345678901234567.89").unwrap()).is_err());
}

#[test]
fn test_currency_length_limit() {
    assert!(validate_currency("USD").is_ok());
    assert!(validate_currency("CUSTOMCOIN").is_ok());
    assert!(validate_currency("TOOLONGCURR").is_err());
    assert!(validate_currency("").is_err());
}

#[test]
fn test_transaction_id_required() {
    assert!(validate_transaction_id("txn_abc123def456").is_ok());
    assert!(validate_transaction_id("").is_err());
    assert!(validate_transaction_id("  \t ").is_err());
}

#[test]
fn test_payload_rejects_unknown_amount_format() {
    let payload = json!({
        "transaction_id": "txn_1",
        "source_account": "A",
        "destination_account": "B",
        "amount": "not-a-number",
        "currency": "USD"
    });

    assert!(serde_json::from_value::<WebhookTransactionIn>(payload).is_err());
}
