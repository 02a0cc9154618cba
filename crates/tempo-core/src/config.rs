use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_WORKER_COUNT: usize = 5;
pub const DEFAULT_EFFECT_TIMEOUT_SECS: u64 = 5;

/// Top-level config (tempo.toml + TEMPO_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TempoConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub effect: EffectConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Execution engine knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seconds between discovery cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Bounded parallelism for execution units.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// When true (the default), a schedule is marked executed even if its
    /// effect call failed. Set false to only mark on success.
    #[serde(default = "bool_true")]
    pub mark_executed_on_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            worker_count: DEFAULT_WORKER_COUNT,
            mark_executed_on_failure: true,
        }
    }
}

/// Outbound effect call configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Endpoint the effect POST is sent to; the schedule id is appended as
    /// an `id` query parameter.
    #[serde(default = "default_effect_endpoint")]
    pub endpoint: String,
    /// Client-side timeout so a slow endpoint cannot pin a worker.
    #[serde(default = "default_effect_timeout")]
    pub timeout_secs: u64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            endpoint: default_effect_endpoint(),
            timeout_secs: DEFAULT_EFFECT_TIMEOUT_SECS,
        }
    }
}

impl TempoConfig {
    /// Load config from a TOML file with TEMPO_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ./tempo.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("tempo.toml");

        let config: TempoConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TEMPO_").split("_"))
            .extract()
            .map_err(|e| crate::error::TempoError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_db_path() -> String {
    "tempo.db".to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_worker_count() -> usize {
    DEFAULT_WORKER_COUNT
}

fn default_effect_endpoint() -> String {
    format!("http://{DEFAULT_BIND}:{DEFAULT_PORT}/api/mock-effect")
}

fn default_effect_timeout() -> u64 {
    DEFAULT_EFFECT_TIMEOUT_SECS
}

fn bool_true() -> bool {
    true
}
