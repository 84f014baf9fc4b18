use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub anon_cookie: AnonCookieConfig,
    pub dog_ceo: DogCeoConfig,
    pub stats: StatsConfig,
    pub logging: LoggingConfig,
}

/// Where and how the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. An empty list allows any origin.
    pub cors_origins: Vec<String>,
    pub body_limit_bytes: usize,
}

/// Connection pool tuning. The URL itself comes from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// The cookie that carries a browser's anonymous id.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnonCookieConfig {
    pub name: String,
    pub max_age_days: i64,
    /// Only send the cookie over HTTPS.
    pub secure: bool,
}

/// Settings for talking to the public Dog CEO API during imports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DogCeoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    /// How many breeds are fetched concurrently.
    pub batch_size: usize,
    /// Pause between two batches, to stay polite with the public API.
    pub batch_delay_ms: u64,
    pub images_per_breed: usize,
}

/// Thresholds used when ranking and summarizing ratings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub leaderboard_min_ratings: i64,
    pub favorite_breed_min_ratings: i64,
    pub top_dogs_min_ratings: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directive used when `RUST_LOG` is not set.
    pub filter: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<String>,
}

// --- Default Implementations ---
// These allow a user to omit any section (or the whole file) and still get
// a working service.

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            body_limit_bytes: 64 * 1024,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for AnonCookieConfig {
    fn default() -> Self {
        Self {
            name: "rtd_anon_id".to_string(),
            max_age_days: 365,
            secure: false,
        }
    }
}

impl Default for DogCeoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dog.ceo/api".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            initial_backoff_ms: 500,
            batch_size: 5,
            batch_delay_ms: 1000,
            images_per_breed: 20,
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            leaderboard_min_ratings: 3,
            favorite_breed_min_ratings: 3,
            top_dogs_min_ratings: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

impl ServerConfig {
    /// The `host:port` string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl DogCeoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
