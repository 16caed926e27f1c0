pub mod config;
pub mod directory;
pub mod discovery;
pub mod models;
pub mod registry;
pub mod routes;

use std::sync::Arc;

pub struct AppState {
    pub config: config::AppConfig,
    pub directory: Arc<dyn directory::UserDirectory>,
    pub registry: registry::MatchRegistry,
}
