use clap::Parser;
use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use txflow_core::cli::{self, Cli, Commands, DbCommands, TxCommands};
use txflow_core::config::Config;
use txflow_core::queue::RedisQueue;
use txflow_core::services::run_worker;
use txflow_core::settlement::SettlementClient;
use txflow_core::{create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Worker => worker(config).await,
        Commands::Tx(TxCommands::Requeue { transaction_id }) => {
            let pool = db::create_pool(&config).await?;
            let queue = RedisQueue::new(&config.redis_url)?;
            cli::handle_tx_requeue(&pool, &queue, &transaction_id).await
        }
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let queue = RedisQueue::new(&config.redis_url)?;

    let state = AppState {
        db: pool,
        queue: Arc::new(queue),
        redis_url: config.redis_url.clone(),
        start_time: Instant::now(),
    };
    let app = create_app(state, &config.api_prefix);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn worker(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config).await?;
    let queue = RedisQueue::new(&config.redis_url)?;
    let settlement = SettlementClient::new(config.settlement_latency, config.settlement_timeout);

    run_worker(pool, queue, settlement, config.worker_concurrency).await;

    Ok(())
}
