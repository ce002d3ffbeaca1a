use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Default, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub storage: StorageConfig,

    #[command(flatten)]
    pub clock: ClockConfig,

    #[command(flatten)]
    pub paste: PasteConfig,

    #[command(flatten)]
    pub health: HealthConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "PASTEBIN_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PASTEBIN_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management server (health probes)
    #[arg(long, env = "PASTEBIN_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// How long to wait for in-flight work during shutdown
    #[arg(long, env = "PASTEBIN_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Public origin used to build paste URLs (e.g. `https://paste.example.com`).
    /// Falls back to the request's Host header when unset.
    #[arg(long, env = "PASTEBIN_PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            mgmt_port: 9090,
            shutdown_timeout_secs: 5,
            public_base_url: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Shared Redis (or Valkey) server. Safe across multiple service processes.
    #[default]
    Redis,
    /// Process-local map. Pastes are lost on restart and not shared between processes.
    Memory,
}

#[derive(Clone, Debug, Args)]
pub struct StorageConfig {
    /// Which paste store to use
    #[arg(long = "storage-backend", env = "PASTEBIN_STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Redis)]
    pub backend: StorageBackend,

    /// Redis connection URL
    #[arg(long, env = "PASTEBIN_REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,

    /// Prefix prepended to paste ids to form Redis keys
    #[arg(long, env = "PASTEBIN_KEY_PREFIX", default_value = "paste:")]
    pub key_prefix: String,

    /// Minimum backoff between initial connection attempts
    #[arg(long, env = "PASTEBIN_CONNECT_MIN_BACKOFF_MS", default_value_t = 100)]
    pub connect_min_backoff_ms: u64,

    /// Maximum backoff between initial connection attempts
    #[arg(long, env = "PASTEBIN_CONNECT_MAX_BACKOFF_MS", default_value_t = 2000)]
    pub connect_max_backoff_ms: u64,

    /// Number of retries for the initial connection before giving up
    #[arg(long, env = "PASTEBIN_CONNECT_MAX_ATTEMPTS", default_value_t = 5)]
    pub connect_max_attempts: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            key_prefix: "paste:".to_string(),
            connect_min_backoff_ms: 100,
            connect_max_backoff_ms: 2000,
            connect_max_attempts: 5,
        }
    }
}

#[derive(Clone, Debug, Default, Args)]
pub struct ClockConfig {
    /// Honor the `x-test-now-ms` request header as the current time.
    /// Never enable this for untrusted traffic.
    #[arg(long, env = "PASTEBIN_TEST_MODE", default_value_t = false)]
    pub test_mode: bool,
}

#[derive(Clone, Debug, Args)]
pub struct PasteConfig {
    /// Length of generated paste identifiers
    #[arg(long, env = "PASTEBIN_ID_LENGTH", default_value_t = 10, value_parser = clap::value_parser!(u16).range(4..=64))]
    pub id_length: u16,

    /// How many identifiers to try before giving up on a collision
    #[arg(long, env = "PASTEBIN_ID_MAX_ATTEMPTS", default_value_t = 5)]
    pub id_max_attempts: u32,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self { id_length: 10, id_max_attempts: 5 }
    }
}

#[derive(Clone, Debug, Args)]
pub struct HealthConfig {
    /// Timeout for the storage readiness check
    #[arg(long = "health-timeout-ms", env = "PASTEBIN_HEALTH_TIMEOUT_MS", default_value_t = 2000)]
    pub timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { timeout_ms: 2000 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "PASTEBIN_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint for traces and metrics. Export is disabled when unset.
    #[arg(long, env = "PASTEBIN_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let parsed = Config::try_parse_from(["pastebin-lite"]).unwrap();
        let defaults = Config::default();

        assert_eq!(parsed.server.port, defaults.server.port);
        assert_eq!(parsed.server.mgmt_port, defaults.server.mgmt_port);
        assert_eq!(parsed.storage.key_prefix, defaults.storage.key_prefix);
        assert_eq!(parsed.paste.id_length, defaults.paste.id_length);
        assert_eq!(parsed.health.timeout_ms, defaults.health.timeout_ms);
    }

    #[test]
    fn test_memory_backend_and_test_mode_flags() {
        let parsed =
            Config::try_parse_from(["pastebin-lite", "--storage-backend", "memory", "--test-mode"]).unwrap();
        assert_eq!(parsed.storage.backend, StorageBackend::Memory);
        assert!(parsed.clock.test_mode);
    }

    #[test]
    fn test_id_length_is_bounded() {
        assert!(Config::try_parse_from(["pastebin-lite", "--id-length", "2"]).is_err());
    }
}
