use serde::Deserialize;

/// Runtime configuration for both binaries.
///
/// Loaded from an optional YAML file named by `COURIER_CONFIG`, with the
/// `LISTEN` and `TARGET` environment variables overriding the addresses.
/// Missing file, missing keys, or no configuration at all fall back to
/// defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds, e.g. "127.0.0.1:8080"
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Authority the client connects to, e.g. "127.0.0.1:8080"
    pub target_addr: String,
    /// Connect deadline in milliseconds
    pub connect_timeout_ms: u64,
    /// Full-exchange deadline in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target_addr: "127.0.0.1:8080".to_string(),
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = Self::from_file().unwrap_or_default();

        if let Ok(listen) = std::env::var("LISTEN") {
            config.server.listen_addr = listen;
        }
        if let Ok(target) = std::env::var("TARGET") {
            config.client.target_addr = target;
        }

        config
    }

    fn from_file() -> Option<Self> {
        let path = std::env::var("COURIER_CONFIG").ok()?;

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Could not read config file");
                return None;
            }
        };

        match serde_yaml::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Could not parse config file");
                None
            }
        }
    }
}
