use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use socketioxide::SocketIo;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use amora_shared::middleware::{init_metrics, init_tracing, metrics_middleware};
use amora_signaling::config::AppConfig;
use amora_signaling::events::SignalBus;
use amora_signaling::presence::PresenceTracker;
use amora_signaling::relay::SignalingRelay;
use amora_signaling::{routes, socket, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("amora-signaling");

    let config = AppConfig::load()?;
    let port = config.port;
    let ring_timeout = chrono::Duration::seconds(config.ring_timeout_secs as i64);
    let retention = chrono::Duration::seconds(config.session_retention_secs as i64);
    let ring_sweep_enabled = config.ring_timeout_secs > 0;
    let metrics_handle = init_metrics();

    let presence = Arc::new(PresenceTracker::new());
    let bus = SignalBus::with_capacity(config.bus_capacity);
    let relay = Arc::new(SignalingRelay::new(
        presence.clone(),
        bus,
        config.require_reachable_peer,
    ));

    let state = Arc::new(AppState {
        config,
        presence,
        relay: relay.clone(),
    });

    // Socket.IO setup
    let (sio_layer, io) = SocketIo::builder().with_state(state.clone()).build_layer();
    io.ns("/", socket::handlers::on_connect);
    socket::spawn_forwarder(io, relay.bus());

    // Janitor: ring timeouts and terminal-session retention.
    {
        let relay = relay.clone();
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(std::time::Duration::from_secs(5));
            loop {
                tick.tick().await;
                let now = chrono::Utc::now();
                if ring_sweep_enabled {
                    relay.expire_stale_ringing(now, ring_timeout);
                }
                relay.prune_terminal(now, retention);
            }
        });
    }

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/metrics",
            get(move || async move { metrics_handle.render() }),
        )
        .layer(sio_layer)
        .layer(axum::middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-signaling starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
