use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use amora_matching::config::AppConfig;
use amora_matching::directory::{HttpDirectory, InMemoryDirectory, UserDirectory};
use amora_matching::registry::MatchRegistry;
use amora_matching::{routes, AppState};
use amora_shared::middleware::{init_metrics, init_tracing, metrics_middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("amora-matching");

    let config = AppConfig::load()?;
    let port = config.port;
    let metrics_handle = init_metrics();

    let directory: Arc<dyn UserDirectory> = match &config.directory_url {
        Some(url) => Arc::new(HttpDirectory::new(
            url.clone(),
            Duration::from_secs(config.directory_timeout_secs),
        )?),
        None => {
            tracing::warn!("no directory_url configured; using an empty in-memory directory");
            Arc::new(InMemoryDirectory::new())
        }
    };

    let state = Arc::new(AppState {
        config,
        directory,
        registry: MatchRegistry::new(),
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .route("/likes", post(routes::likes::send_like))
        .route("/likes/:target_id", delete(routes::likes::pass_user))
        .route("/matches", get(routes::matches::list_matches))
        .route("/browse", post(routes::browse::browse))
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
