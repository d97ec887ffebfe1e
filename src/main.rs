use std::time::Instant;

use admitdesk::logging::{init_tracing, shutdown_tracer};
use admitdesk::metrics::{init_metrics, metrics_app};
use admitdesk::router::init_router;
use admitdesk::state::{AppState, init_app_state};
use admitdesk_config::ServerConfig;
use admitdesk_db::{init_db_pool, run_migrations};
use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %format!("{:#}", e), "Server failed");
        shutdown_tracer().await;
        std::process::exit(1);
    }

    shutdown_tracer().await;
}

async fn run() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env();

    if let Some(handle) = init_metrics() {
        let metrics_addr = server_config.metrics_addr.clone();
        tokio::spawn(async move {
            match tokio::net::TcpListener::bind(&metrics_addr).await {
                Ok(listener) => {
                    tracing::info!("Metrics available at http://{}/metrics", metrics_addr);
                    if let Err(e) = axum::serve(listener, metrics_app(handle)).await {
                        tracing::error!(error = %e, "Metrics server stopped");
                    }
                }
                Err(e) => tracing::error!(error = %e, addr = %metrics_addr, "Failed to bind metrics server"),
            }
        });
    }

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = init_db_pool(&database_url).await?;
    run_migrations(&pool).await?;

    let state = init_app_state(pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e.error))?;
    spawn_sweeper(state.clone());

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    tracing::info!("Server running on http://{}", server_config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Drops expired OTP entries and idle rate limiter buckets.
fn spawn_sweeper(state: AppState) {
    let interval = state.otp_store.config().sweep_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let removed = state.otp_store.sweep(Instant::now()).await;
            state.rate_limiters.sweep();
            if removed > 0 {
                tracing::debug!(removed, "Expired OTP entries removed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
