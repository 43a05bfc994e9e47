//! Observability module for centralized metrics, tracing, and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Metrics collection and Prometheus export
//! - Liveness/readiness endpoints served next to the metrics
//! - Span helpers shared by the bot handlers and repository

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Initialize logging and metrics, and start the metrics server when enabled
pub async fn init_observability(
    config: &ObservabilityConfig,
    db_pool: Option<Arc<PgPool>>,
) -> Result<()> {
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    init_tracing_with_config(config)?;

    let metrics_handle = init_metrics_with_config(config)?;

    if config.enable_metrics_export {
        start_metrics_server(metrics_handle, config.metrics_port, db_pool.clone()).await?;
    }

    tracing::info!(
        environment = %config.environment,
        metrics_port = %config.metrics_port,
        metrics_export = %config.enable_metrics_export,
        has_db_pool = %db_pool.is_some(),
        "Observability stack initialized successfully"
    );
    Ok(())
}

/// Initialize structured logging with tracing and configuration
fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("vocab_trainer={}", config.log_level).parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("teloxide=warn".parse()?);

    // Pretty for development, JSON for everything else
    if config.is_development()
        || std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string()) == "pretty"
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Install the Prometheus recorder with the configured global labels
fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<PrometheusHandle> {
    let builder = config
        .tags
        .iter()
        .fold(PrometheusBuilder::new(), |builder, (key, value)| {
            builder.add_global_label(key.clone(), value.clone())
        });
    let handle = builder.install_recorder()?;

    tracing::info!(
        global_labels = config.tags.len(),
        "Metrics collection initialized"
    );
    Ok(handle)
}

/// Serve `/metrics`, `/health/live` and `/health/ready` on the given port
async fn start_metrics_server(
    metrics_handle: PrometheusHandle,
    port: u16,
    db_pool: Option<Arc<PgPool>>,
) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on {}", addr);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let metrics_handle = metrics_handle.clone();
                    let db_pool = db_pool.clone();

                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);

                        let service = hyper::service::service_fn(
                            move |req: hyper::Request<hyper::body::Incoming>| {
                                let metrics_handle = metrics_handle.clone();
                                let db_pool = db_pool.clone();
                                async move {
                                    let response = match (req.method(), req.uri().path()) {
                                        (&hyper::Method::GET, "/metrics") => {
                                            hyper::Response::new(metrics_handle.render())
                                        }
                                        (&hyper::Method::GET, "/health/live") => {
                                            hyper::Response::new("OK".to_string())
                                        }
                                        (&hyper::Method::GET, "/health/ready") => {
                                            readiness_response(db_pool.as_deref()).await
                                        }
                                        _ => {
                                            let mut response =
                                                hyper::Response::new("Not Found".to_string());
                                            *response.status_mut() = hyper::StatusCode::NOT_FOUND;
                                            response
                                        }
                                    };
                                    Ok::<_, std::convert::Infallible>(response)
                                }
                            },
                        );

                        if let Err(err) = http1::Builder::new().serve_connection(io, service).await
                        {
                            tracing::error!("Error serving connection: {:?}", err);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Error accepting connection: {}", e);
                }
            }
        }
    });

    Ok(())
}

async fn readiness_response(db_pool: Option<&PgPool>) -> hyper::Response<String> {
    let check = match db_pool {
        Some(pool) => check_database_health(pool).await,
        None => Ok(()),
    };

    match check {
        Ok(()) => hyper::Response::new("OK".to_string()),
        Err(e) => {
            let mut response = hyper::Response::new(format!("NOT READY: {}", e));
            *response.status_mut() = hyper::StatusCode::SERVICE_UNAVAILABLE;
            response
        }
    }
}

/// Check database connectivity and basic query capability
pub async fn check_database_health(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Database health check failed: {}", e))?;

    tracing::debug!("Database health check passed");
    Ok(())
}

/// Create a span for database operations
pub fn db_span(operation: &str, table: &str) -> tracing::Span {
    tracing::info_span!(
        "db_operation",
        operation = operation,
        table = table,
        component = "database"
    )
}

/// Create a span for Telegram bot operations
pub fn telegram_span(operation: &str, user_id: Option<i64>) -> tracing::Span {
    tracing::info_span!(
        "telegram_operation",
        operation = operation,
        user_id = user_id,
        component = "telegram"
    )
}

/// Record database operation metrics
pub fn record_db_metrics(operation: &str, duration: std::time::Duration) {
    let operation = operation.to_string();
    metrics::counter!("db_operations_total", "operation" => operation).increment(1);
    metrics::histogram!("db_operation_duration_seconds").record(duration.as_secs_f64());
}

/// Record request metrics
pub fn record_request_metrics(method: &str, status: u16, duration: std::time::Duration) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("requests_total", "method" => method, "status" => status).increment(1);
    metrics::histogram!("request_duration_seconds").record(duration.as_secs_f64());
}

/// Record Telegram message processing metrics
pub fn record_telegram_message(message_type: &str) {
    let message_type = message_type.to_string();
    metrics::counter!("telegram_messages_total", "type" => message_type).increment(1);
}

/// Record a quiz answer by result (`correct`, `wrong`, `exhausted`)
pub fn record_quiz_answer(result: &'static str) {
    metrics::counter!("quiz_answers_total", "result" => result).increment(1);
}

/// Record a dictionary change (`added`, `deleted`, `learned`, `reset`)
pub fn record_dictionary_change(action: &'static str, count: u64) {
    metrics::counter!("dictionary_changes_total", "action" => action).increment(count);
}

/// Update the number of live quiz sessions
pub fn update_active_sessions(count: usize) {
    metrics::gauge!("quiz_active_sessions").set(count as f64);
}
