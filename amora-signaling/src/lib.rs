pub mod config;
pub mod events;
pub mod presence;
pub mod relay;
pub mod routes;
pub mod socket;

use std::sync::Arc;

pub struct AppState {
    pub config: config::AppConfig,
    pub presence: Arc<presence::PresenceTracker>,
    pub relay: Arc<relay::SignalingRelay>,
}
