use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base url of the profile service. Unset falls back to an empty
    /// in-memory directory (useful for local runs and tests).
    pub directory_url: Option<String>,
    #[serde(default = "default_directory_timeout")]
    pub directory_timeout_secs: u64,
}

fn default_port() -> u16 {
    3004
}

fn default_directory_timeout() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            directory_url: None,
            directory_timeout_secs: default_directory_timeout(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("AMORA_MATCHING").separator("__"))
            .build()?;
        Ok(config.try_deserialize().unwrap_or_default())
    }
}
