use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub redis_url: String,
    pub api_prefix: String,
    pub settlement_latency: Duration,
    pub settlement_timeout: Duration,
    pub worker_concurrency: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/v1".to_string()),
            settlement_latency: Duration::from_secs(
                env::var("SETTLEMENT_LATENCY_SECS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()?,
            ),
            settlement_timeout: Duration::from_secs(
                env::var("SETTLEMENT_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "45".to_string())
                    .parse()?,
            ),
            worker_concurrency: env::var("WORKER_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,
        })
    }
}
