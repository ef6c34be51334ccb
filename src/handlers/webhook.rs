use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Transaction, TransactionStatus};
use crate::db::queries::{self, InsertOutcome};
use crate::db::with_retries;
use crate::error::AppError;
use crate::queue::Job;
use crate::validation::{
    validate_account, validate_amount, validate_currency, validate_transaction_id,
};
use crate::AppState;

pub const MSG_ACCEPTED: &str = "Transaction accepted for processing";
pub const MSG_ALREADY_RECEIVED: &str = "Transaction already received";

#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookTransactionIn {
    pub transaction_id: String,
    pub source_account: String,
    pub destination_account: String,
    pub amount: BigDecimal,
    pub currency: String,
}

impl WebhookTransactionIn {
    fn validate(&self) -> Result<(), AppError> {
        validate_transaction_id(&self.transaction_id)?;
        validate_account("source_account", &self.source_account)?;
        validate_account("destination_account", &self.destination_account)?;
        validate_amount(&self.amount)?;
        validate_currency(&self.currency)?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct Acknowledgment {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TransactionOut {
    pub transaction_id: String,
    pub source_account: String,
    pub destination_account: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl From<Transaction> for TransactionOut {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id,
            source_account: tx.source_account,
            destination_account: tx.destination_account,
            amount: tx.amount,
            currency: tx.currency,
            status: tx.status,
            created_at: tx.created_at,
            processed_at: tx.processed_at,
        }
    }
}

/// Idempotent webhook ingestion. Repeated delivery of the same
/// `transaction_id` yields exactly one stored row and at most one live job;
/// the uniqueness constraint resolves concurrent first-time submissions.
pub async fn ingest_transaction(
    State(state): State<AppState>,
    Json(payload): Json<WebhookTransactionIn>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if let Some(existing) =
        with_retries(|| queries::get_transaction(&state.db, &payload.transaction_id)).await?
    {
        // A FAILED transaction gets another processing attempt on
        // re-submission; PROCESSING and PROCESSED never re-enqueue.
        if existing.status == TransactionStatus::Failed {
            state
                .queue
                .enqueue(Job::process_transaction(&existing.transaction_id))
                .await
                .map_err(|e| AppError::Queue(e.to_string()))?;
            tracing::info!(
                transaction_id = %existing.transaction_id,
                "re-enqueued failed transaction"
            );
        }
        return Ok((
            StatusCode::ACCEPTED,
            Json(Acknowledgment {
                message: MSG_ALREADY_RECEIVED,
            }),
        ));
    }

    let tx = Transaction::new(
        payload.transaction_id,
        payload.source_account,
        payload.destination_account,
        payload.amount,
        payload.currency,
    );

    let inserted = match with_retries(|| queries::insert_transaction(&state.db, &tx)).await? {
        InsertOutcome::Inserted(inserted) => inserted,
        // Lost the race against a concurrent submission of the same id:
        // the winner owns the enqueue.
        InsertOutcome::Duplicate => {
            return Ok((
                StatusCode::ACCEPTED,
                Json(Acknowledgment {
                    message: MSG_ALREADY_RECEIVED,
                }),
            ));
        }
    };

    if let Err(enqueue_err) = state
        .queue
        .enqueue(Job::process_transaction(&inserted.transaction_id))
        .await
    {
        tracing::error!(
            transaction_id = %inserted.transaction_id,
            "enqueue failed after insert: {}", enqueue_err
        );
        // A FAILED row is re-enqueued on the next submission of the same id.
        if let Err(db_err) = queries::mark_failed(&state.db, &inserted.transaction_id).await {
            tracing::error!(
                transaction_id = %inserted.transaction_id,
                "could not mark transaction failed: {}", db_err
            );
        }
        return Err(AppError::Queue(enqueue_err.to_string()));
    }

    tracing::info!(transaction_id = %inserted.transaction_id, "transaction accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(Acknowledgment {
            message: MSG_ACCEPTED,
        }),
    ))
}

/// Status lookup. An unknown id is an empty array, not an error.
pub async fn get_transaction_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Vec<TransactionOut>>, AppError> {
    let tx = with_retries(|| queries::get_transaction(&state.db, &transaction_id)).await?;

    Ok(Json(tx.map(TransactionOut::from).into_iter().collect()))
}
