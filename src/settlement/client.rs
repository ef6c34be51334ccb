use failsafe::futures::CircuitBreaker as FuturesCircuitBreaker;
use failsafe::{backoff, failure_policy, Config, Error as FailsafeError, StateMachine};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettlementError {
    #[error("settlement verification timed out after {0:?}")]
    Timeout(Duration),
    #[error("settlement circuit breaker is open")]
    CircuitOpen,
}

/// Client for the external settlement/verification system. The remote call
/// is simulated as configurable latency; every call is bounded by a timeout
/// and guarded by a circuit breaker.
#[derive(Clone)]
pub struct SettlementClient {
    latency: Duration,
    call_timeout: Duration,
    circuit_breaker: StateMachine<failure_policy::ConsecutiveFailures<backoff::EqualJittered>, ()>,
}

impl SettlementClient {
    pub fn new(latency: Duration, call_timeout: Duration) -> Self {
        Self::with_circuit_breaker(latency, call_timeout, 3, 30)
    }

    pub fn with_circuit_breaker(
        latency: Duration,
        call_timeout: Duration,
        failure_threshold: u32,
        reset_timeout_secs: u64,
    ) -> Self {
        let backoff = backoff::equal_jittered(
            Duration::from_secs(reset_timeout_secs),
            Duration::from_secs(reset_timeout_secs * 2),
        );
        let policy = failure_policy::consecutive_failures(failure_threshold, backoff);
        let circuit_breaker = Config::new().failure_policy(policy).build();

        SettlementClient {
            latency,
            call_timeout,
            circuit_breaker,
        }
    }

    /// Returns the current state of the circuit breaker
    pub fn circuit_state(&self) -> &'static str {
        if self.circuit_breaker.is_call_permitted() {
            "closed"
        } else {
            "open"
        }
    }

    /// Submits a transaction for settlement verification. Stands in for the
    /// remote API round-trip; the artificial latency is the modeled network
    /// and settlement time.
    pub async fn verify(&self, transaction_id: &str) -> Result<(), SettlementError> {
        let latency = self.latency;
        let call_timeout = self.call_timeout;

        let result = self
            .circuit_breaker
            .call(async move {
                tokio::time::timeout(call_timeout, remote_settlement_call(latency))
                    .await
                    .map_err(|_| SettlementError::Timeout(call_timeout))
            })
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(transaction_id, "settlement verification completed");
                Ok(())
            }
            Err(FailsafeError::Rejected) => Err(SettlementError::CircuitOpen),
            Err(FailsafeError::Inner(e)) => Err(e),
        }
    }
}

async fn remote_settlement_call(latency: Duration) {
    tokio::time::sleep(latency).await;
}
