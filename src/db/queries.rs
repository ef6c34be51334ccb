use sqlx::{PgPool, Result};

use crate::db::models::Transaction;

/// Outcome of an insert-if-absent attempt. A duplicate is a normal result,
/// not an error: the uniqueness constraint is what serializes concurrent
/// first-time submissions of the same id.
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(Transaction),
    Duplicate,
}

pub async fn insert_transaction(pool: &PgPool, tx: &Transaction) -> Result<InsertOutcome> {
    let result = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            transaction_id, source_account, destination_account,
            amount, currency, status, created_at, processed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING transaction_id, source_account, destination_account,
                  amount, currency, status, created_at, processed_at
        "#,
    )
    .bind(&tx.transaction_id)
    .bind(&tx.source_account)
    .bind(&tx.destination_account)
    .bind(&tx.amount)
    .bind(&tx.currency)
    .bind(tx.status)
    .bind(tx.created_at)
    .bind(tx.processed_at)
    .fetch_one(pool)
    .await;

    match result {
        Ok(inserted) => Ok(InsertOutcome::Inserted(inserted)),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Ok(InsertOutcome::Duplicate)
        }
        Err(e) => Err(e),
    }
}

pub async fn get_transaction(pool: &PgPool, transaction_id: &str) -> Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>(
        "SELECT transaction_id, source_account, destination_account, amount, currency, \
         status, created_at, processed_at FROM transactions WHERE transaction_id = $1",
    )
    .bind(transaction_id)
    .fetch_optional(pool)
    .await
}

/// Terminal transition. The status guard makes redelivered jobs no-ops and
/// keeps `processed_at` from ever being overwritten.
pub async fn mark_processed(pool: &PgPool, transaction_id: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE transactions SET status = 'PROCESSED', processed_at = NOW() \
         WHERE transaction_id = $1 AND status <> 'PROCESSED'",
    )
    .bind(transaction_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Only an in-flight transaction can fail; a concurrent successful delivery
/// wins over a late failure verdict.
pub async fn mark_failed(pool: &PgPool, transaction_id: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE transactions SET status = 'FAILED' \
         WHERE transaction_id = $1 AND status = 'PROCESSING'",
    )
    .bind(transaction_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
