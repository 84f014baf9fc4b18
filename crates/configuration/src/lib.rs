use crate::error::ConfigError;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AnonCookieConfig, DatabaseConfig, DogCeoConfig, LogFormat, LoggingConfig, ServerConfig,
    Settings, StatsConfig,
};

/// Browsers cap cookie lifetimes at 400 days.
pub const MAX_COOKIE_AGE_DAYS: i64 = 400;

/// The prefix for environment overrides, e.g. `RTD__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "RTD";

/// Loads the application configuration from the TOML file at `path` and the
/// environment.
///
/// The file is optional; every setting has a default. Environment variables
/// take precedence over the file.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(environment());

    build_settings(builder)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
}

/// Deserializes and validates the merged sources of `builder`.
fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings, ConfigError> {
    let settings = builder.build()?.try_deserialize::<Settings>()?;
    validate(&settings)?;
    tracing::debug!(
        host = %settings.server.host,
        port = settings.server.port,
        "Configuration loaded."
    );
    Ok(settings)
}

/// Rejects settings that would make the service misbehave at runtime.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port must not be 0".to_string(),
        ));
    }
    if settings.dog_ceo.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "dog_ceo.batch_size must be at least 1".to_string(),
        ));
    }
    if settings.dog_ceo.images_per_breed == 0 {
        return Err(ConfigError::ValidationError(
            "dog_ceo.images_per_breed must be at least 1".to_string(),
        ));
    }
    if !(1..=MAX_COOKIE_AGE_DAYS).contains(&settings.anon_cookie.max_age_days) {
        return Err(ConfigError::ValidationError(format!(
            "anon_cookie.max_age_days must be between 1 and {}",
            MAX_COOKIE_AGE_DAYS
        )));
    }
    if settings.anon_cookie.name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "anon_cookie.name must not be empty".to_string(),
        ));
    }
    Ok(())
}
