use redis::AsyncCommands;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::redis::Redis;
use txflow_core::queue::{Job, JobQueue, RedisQueue};

async fn setup_queue() -> (RedisQueue, String, impl std::any::Any) {
    let container = Redis::default().start().await.unwrap();
    let host_port = container.get_host_port_ipv4(6379).await.unwrap();
    let redis_url = format!("redis://127.0.0.1:{}", host_port);
    let queue = RedisQueue::new(&redis_url).unwrap();
    (queue, redis_url, container)
}

#[tokio::test]
async fn test_enqueue_reserve_ack_cycle() {
    let (queue, _url, _container) = setup_queue().await;

    queue
        .enqueue(Job::process_transaction("txn_1"))
        .await
        .unwrap();

    let reserved = queue.reserve(1).await.unwrap().expect("job available");
    assert_eq!(reserved.job.task, "process_transaction");
    assert_eq!(reserved.job.transaction_id, "txn_1");

    queue.ack(&reserved).await.unwrap();

    assert!(queue.reserve(1).await.unwrap().is_none());
    assert_eq!(queue.recover_orphans().await.unwrap(), 0);
}

#[tokio::test]
async fn test_reserve_times_out_on_empty_queue() {
    let (queue, _url, _container) = setup_queue().await;
    assert!(queue.reserve(1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unacked_job_is_recovered() {
    let (queue, _url, _container) = setup_queue().await;

    queue
        .enqueue(Job::process_transaction("txn_crash"))
        .await
        .unwrap();

    // Reserve without acking, as a worker that died mid-job would.
    let reserved = queue.reserve(1).await.unwrap().expect("job available");
    drop(reserved);
    assert!(queue.reserve(1).await.unwrap().is_none());

    assert_eq!(queue.recover_orphans().await.unwrap(), 1);

    let recovered = queue.reserve(1).await.unwrap().expect("job recovered");
    assert_eq!(recovered.job.transaction_id, "txn_crash");
}

#[tokio::test]
async fn test_malformed_payload_is_discarded() {
    let (queue, redis_url, _container) = setup_queue().await;

    let client = redis::Client::open(redis_url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = conn.lpush("txflow:jobs:pending", "not json").await.unwrap();

    assert!(queue.reserve(1).await.unwrap().is_none());

    // The poison pill is gone, not parked on the in-flight list.
    assert_eq!(queue.recover_orphans().await.unwrap(), 0);
    let pending: i64 = conn.llen("txflow:jobs:pending").await.unwrap();
    assert_eq!(pending, 0);
}
