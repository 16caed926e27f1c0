use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Refuse call requests when the receiver has no live connection.
    #[serde(default = "default_require_reachable_peer")]
    pub require_reachable_peer: bool,
    /// How long a call may ring unanswered before the janitor ends it.
    /// 0 disables the sweep.
    #[serde(default = "default_ring_timeout")]
    pub ring_timeout_secs: u64,
    /// How long finished sessions are kept around before being dropped.
    #[serde(default = "default_session_retention")]
    pub session_retention_secs: u64,
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

fn default_port() -> u16 {
    3005
}

fn default_require_reachable_peer() -> bool {
    true
}

fn default_ring_timeout() -> u64 {
    45
}

fn default_session_retention() -> u64 {
    900
}

fn default_bus_capacity() -> usize {
    4096
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            require_reachable_peer: default_require_reachable_peer(),
            ring_timeout_secs: default_ring_timeout(),
            session_retention_secs: default_session_retention(),
            bus_capacity: default_bus_capacity(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("AMORA_SIGNALING").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_default())
    }
}
