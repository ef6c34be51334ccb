use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::FromRow;

/// Lifecycle of a transaction. The happy path is one-directional:
/// PROCESSING -> PROCESSED. PROCESSED is terminal; FAILED is retryable
/// by re-submitting the webhook or via `tx requeue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Processing,
    Processed,
    Failed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub source_account: String,
    pub destination_account: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn new(
        transaction_id: String,
        source_account: String,
        destination_account: String,
        amount: BigDecimal,
        currency: String,
    ) -> Self {
        Self {
            transaction_id,
            source_account,
            destination_account,
            amount,
            currency,
            status: TransactionStatus::Processing,
            created_at: Utc::now(),
            processed_at: None,
        }
    }
}
