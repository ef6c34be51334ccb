pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod queue;
pub mod services;
pub mod settlement;
pub mod startup;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    routing::{get, post},
    Router,
};

use crate::queue::JobQueue;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub queue: Arc<dyn JobQueue>,
    pub redis_url: String,
    pub start_time: Instant,
}

pub fn create_app(state: AppState, api_prefix: &str) -> Router {
    let api = Router::new()
        .route(
            "/webhooks/transactions",
            post(handlers::webhook::ingest_transaction),
        )
        .route(
            "/transactions/:transaction_id",
            get(handlers::webhook::get_transaction_status),
        );

    Router::new()
        .route("/", get(handlers::root_health))
        .route("/health", get(handlers::health))
        .nest(api_prefix, api)
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(state)
}
