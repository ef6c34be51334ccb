use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

use crate::db::models::TransactionStatus;
use crate::db::{queries, with_retries};
use crate::queue::{RedisQueue, TASK_PROCESS_TRANSACTION};
use crate::settlement::SettlementClient;

const RESERVE_TIMEOUT_SECS: usize = 5;
const RESERVE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Processed,
    AlreadyProcessed,
    Missing,
    Failed,
}

/// Consumes processing jobs until the process is stopped. Jobs run on
/// spawned tasks gated by a semaphore; a slow settlement call occupies one
/// slot, not the whole loop. A job is acknowledged only after its task
/// finishes, so a crash mid-flight leaves it recoverable.
pub async fn run_worker(
    pool: PgPool,
    queue: RedisQueue,
    settlement: SettlementClient,
    concurrency: usize,
) {
    info!("transaction worker started (concurrency {})", concurrency);

    match queue.recover_orphans().await {
        Ok(0) => {}
        Ok(n) => warn!("recovered {} orphaned in-flight job(s)", n),
        Err(e) => error!("orphan recovery failed: {}", e),
    }

    let slots = Arc::new(Semaphore::new(concurrency));

    loop {
        let reserved = match queue.reserve(RESERVE_TIMEOUT_SECS).await {
            Ok(Some(reserved)) => reserved,
            Ok(None) => continue,
            Err(e) => {
                error!("queue reserve error: {}", e);
                sleep(RESERVE_ERROR_BACKOFF).await;
                continue;
            }
        };

        let Ok(permit) = slots.clone().acquire_owned().await else {
            break;
        };

        let pool = pool.clone();
        let queue = queue.clone();
        let settlement = settlement.clone();

        tokio::spawn(async move {
            let _permit = permit;

            if reserved.job.task != TASK_PROCESS_TRANSACTION {
                warn!(task = %reserved.job.task, "discarding job with unknown task");
                if let Err(e) = queue.ack(&reserved).await {
                    error!("ack failed: {}", e);
                }
                return;
            }

            let transaction_id = reserved.job.transaction_id.clone();
            match process_transaction(&pool, &settlement, &transaction_id).await {
                Ok(outcome) => {
                    info!(transaction_id = %transaction_id, ?outcome, "job finished");
                    if let Err(e) = queue.ack(&reserved).await {
                        error!(transaction_id = %transaction_id, "ack failed: {}", e);
                    }
                }
                // Leave the job in-flight: it is retried after the next
                // worker restart rather than dropped.
                Err(e) => error!(transaction_id = %transaction_id, "job failed: {}", e),
            }
        });
    }
}

/// One processing attempt for one transaction. Safe under at-least-once
/// redelivery: the settlement wait holds no database resources, and both
/// terminal transitions are status-guarded single-row updates.
pub async fn process_transaction(
    pool: &PgPool,
    settlement: &SettlementClient,
    transaction_id: &str,
) -> Result<ProcessOutcome, sqlx::Error> {
    let verdict = settlement.verify(transaction_id).await;

    let Some(tx) = with_retries(|| queries::get_transaction(pool, transaction_id)).await? else {
        warn!(transaction_id, "job references a transaction that no longer exists");
        return Ok(ProcessOutcome::Missing);
    };

    if tx.status == TransactionStatus::Processed {
        return Ok(ProcessOutcome::AlreadyProcessed);
    }

    match verdict {
        Ok(()) => {
            let updated =
                with_retries(|| queries::mark_processed(pool, transaction_id)).await?;
            if updated {
                info!(transaction_id, "transaction processed");
                Ok(ProcessOutcome::Processed)
            } else {
                Ok(ProcessOutcome::AlreadyProcessed)
            }
        }
        Err(e) => {
            warn!(transaction_id, "settlement verification failed: {}", e);
            with_retries(|| queries::mark_failed(pool, transaction_id)).await?;
            Ok(ProcessOutcome::Failed)
        }
    }
}
