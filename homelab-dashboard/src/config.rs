use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use anyhow::{Context, Result};
use shared::protocol::DEFAULT_PROBE_TIMEOUT_MS;
use shared::types::{ServiceEndpoint, ServiceSet};

pub const ENV_CONFIG: &str = "HOMELAB_CONFIG";
pub const ENV_PORT: &str = "HOMELAB_PORT";
pub const ENV_TITLE: &str = "HOMELAB_TITLE";
pub const ENV_SERVICES: &str = "HOMELAB_SERVICES";
pub const ENV_PROBE_TIMEOUT_MS: &str = "HOMELAB_PROBE_TIMEOUT_MS";

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_services")]
    pub services: ServiceSet,
}

fn default_port() -> u16 {
    8080
}

fn default_title() -> String {
    "Local Cloud Control Center".to_string()
}

fn default_probe_timeout() -> u64 {
    DEFAULT_PROBE_TIMEOUT_MS
}

fn default_services() -> ServiceSet {
    [
        ("Portainer", 9000),
        ("Grafana", 3000),
        ("Prometheus", 9090),
        ("NextCloud", 8081),
        ("Home Assistant", 8123),
        ("Pi-hole", 8082),
    ]
    .into_iter()
    .map(|(name, port)| {
        let endpoint = ServiceEndpoint::new(
            shared::protocol::DEFAULT_PROBE_HOST,
            port,
            format!("http://localhost:{}", port),
        );
        (name.to_string(), endpoint)
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            title: default_title(),
            probe_timeout_ms: default_probe_timeout(),
            services: default_services(),
        }
    }
}

/// Config file path: first CLI argument, then `HOMELAB_CONFIG`, then `config.json`.
pub fn resolve_path(arg: Option<String>, env: impl Fn(&str) -> Option<String>) -> String {
    arg.or_else(|| env(ENV_CONFIG).filter(|p| !p.is_empty()))
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

impl Config {
    /// Built-in defaults with environment overrides applied.
    /// Values that fail to parse are logged and ignored.
    pub fn from_env(env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(port) = env(ENV_PORT) {
            match port.parse::<u16>() {
                Ok(p) => config.port = p,
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_PORT, port, e),
            }
        }

        if let Some(title) = env(ENV_TITLE).filter(|t| !t.is_empty()) {
            config.title = title;
        }

        if let Some(services) = env(ENV_SERVICES).filter(|s| !s.is_empty()) {
            match serde_json::from_str::<ServiceSet>(&services) {
                Ok(services) => config.services = services,
                Err(e) => tracing::warn!("Ignoring malformed {}: {}", ENV_SERVICES, e),
            }
        }

        if let Some(timeout) = env(ENV_PROBE_TIMEOUT_MS) {
            match timeout.parse::<u64>() {
                Ok(ms) if ms > 0 => config.probe_timeout_ms = ms,
                Ok(_) => tracing::warn!("Ignoring {}=0", ENV_PROBE_TIMEOUT_MS),
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_PROBE_TIMEOUT_MS, timeout, e),
            }
        }

        config
    }

    /// Defaults, then environment, then the config file as a full override.
    ///
    /// A missing file is skipped silently. A file that cannot be read or parsed
    /// is logged and the environment/default configuration is kept, so this
    /// never fails.
    pub fn load(path: impl AsRef<Path>, env: impl Fn(&str) -> Option<String>) -> Self {
        let path = path.as_ref();
        let config = Config::from_env(env);

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults and environment", path.display());
            return config;
        }

        match Config::from_file(path) {
            Ok(mut file_config) => {
                if file_config.probe_timeout_ms == 0 {
                    tracing::warn!("Ignoring probe_timeout_ms = 0 in {}", path.display());
                    file_config.probe_timeout_ms = default_probe_timeout();
                }
                file_config
            }
            Err(e) => {
                tracing::error!("Error loading config file: {:#}", e);
                config
            }
        }
    }

    /// Parse a config file. `.toml` files are read as TOML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let config: Config = if is_toml {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        };

        Ok(config)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Listen on every interface at the configured port
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
