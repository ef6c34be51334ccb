use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub const TASK_PROCESS_TRANSACTION: &str = "process_transaction";

const PENDING_KEY: &str = "txflow:jobs:pending";
const IN_FLIGHT_KEY: &str = "txflow:jobs:in_flight";

/// One deferred task: process a single transaction. Delivery is
/// at-least-once; consumers must tolerate duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub task: String,
    pub transaction_id: String,
}

impl Job {
    pub fn process_transaction(transaction_id: impl Into<String>) -> Self {
        Self {
            task: TASK_PROCESS_TRANSACTION.to_string(),
            transaction_id: transaction_id.into(),
        }
    }
}

/// A job popped from the queue but not yet acknowledged. Holds the raw
/// payload so `ack` can remove exactly this entry from the in-flight list.
#[derive(Debug)]
pub struct ReservedJob {
    pub job: Job,
    raw: String,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: Job) -> anyhow::Result<()>;
}

/// Redis-backed queue using the reliable-queue list pattern: BRPOPLPUSH
/// moves a job to an in-flight list, and only `ack` removes it. A worker
/// crash between the two leaves the job recoverable by `recover_orphans`.
#[derive(Clone)]
pub struct RedisQueue {
    client: redis::Client,
}

impl RedisQueue {
    pub fn new(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// Blocks up to `timeout_secs` waiting for a job. Returns `None` on
    /// timeout. A payload that fails to parse is discarded with a warning.
    pub async fn reserve(&self, timeout_secs: usize) -> anyhow::Result<Option<ReservedJob>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let raw: Option<String> = redis::cmd("BRPOPLPUSH")
            .arg(PENDING_KEY)
            .arg(IN_FLIGHT_KEY)
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<Job>(&raw) {
            Ok(job) => Ok(Some(ReservedJob { job, raw })),
            Err(e) => {
                tracing::warn!("discarding malformed job payload: {}", e);
                let _: () = conn.lrem(IN_FLIGHT_KEY, 1, &raw).await?;
                Ok(None)
            }
        }
    }

    /// Removes a finished job from the in-flight list.
    pub async fn ack(&self, reserved: &ReservedJob) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.lrem(IN_FLIGHT_KEY, 1, &reserved.raw).await?;
        Ok(())
    }

    /// Moves jobs stranded on the in-flight list by a crashed worker back to
    /// the pending list. Call once at worker startup, before consuming.
    pub async fn recover_orphans(&self) -> anyhow::Result<u64> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let stranded: u64 = conn.llen(IN_FLIGHT_KEY).await?;
        let mut moved = 0;
        for _ in 0..stranded {
            let raw: Option<String> = conn.rpoplpush(IN_FLIGHT_KEY, PENDING_KEY).await?;
            if raw.is_none() {
                break;
            }
            moved += 1;
        }

        Ok(moved)
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn enqueue(&self, job: Job) -> anyhow::Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(&job)?;
        let _: () = conn.lpush(PENDING_KEY, payload).await?;
        Ok(())
    }
}

/// In-memory queue for tests: records enqueued jobs without a broker.
#[derive(Clone, Default)]
pub struct MemoryQueue {
    jobs: Arc<Mutex<Vec<Job>>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().expect("queue mutex poisoned").clone()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn enqueue(&self, job: Job) -> anyhow::Result<()> {
        self.jobs.lock().expect("queue mutex poisoned").push(job);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_payload_shape() {
        let job = Job::process_transaction("txn_1");
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["task"], "process_transaction");
        assert_eq!(json["transaction_id"], "txn_1");
    }

    #[test]
    fn job_round_trips_through_json() {
        let job = Job::process_transaction("txn_abc123def456");
        let raw = serde_json::to_string(&job).unwrap();
        let parsed: Job = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, job);
    }

    #[tokio::test]
    async fn memory_queue_records_jobs_in_order() {
        let queue = MemoryQueue::new();
        queue.enqueue(Job::process_transaction("a")).await.unwrap();
        queue.enqueue(Job::process_transaction("b")).await.unwrap();

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].transaction_id, "a");
        assert_eq!(jobs[1].transaction_id, "b");
    }
}
