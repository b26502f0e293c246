//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use domain::{Clock, SystemClock};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn serve<S: OrderStore + 'static>(
    store: S,
    config: &Config,
    clock: Arc<dyn Clock>,
    metrics_handle: PrometheusHandle,
) {
    let state = api::create_state(store, clock);
    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, utc_offset = %config.utc_offset, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. "Today" on the dashboard is the calendar day in the configured zone
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset));

    // 4. Pick the order store and serve
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresOrderStore::connect(url)
                .await
                .expect("failed to connect to database");
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            serve(store, &config, clock, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using an empty in-memory order store");
            serve(InMemoryOrderStore::new(), &config, clock, metrics_handle).await;
        }
    }

    tracing::info!("server shut down gracefully");
}
