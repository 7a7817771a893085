// In crates/app-config/src/lib.rs

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};

pub mod error;
pub mod runtime;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use runtime::Runtime;
pub use types::Settings;

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Built-in defaults for every field.
/// 2. Reads from a default `config/base.toml` file, if present.
/// 3. Merges settings from an environment-specific file (e.g., `config/production.toml`).
/// 4. Merges settings from environment variables (e.g., `APP_BINANCE__API_KEY=...`).
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    let builder = Config::builder()
        .add_source(File::with_name("config/base").required(false))
        .add_source(File::with_name(&format!("config/{}", environment)).required(false))
        // The prefix is `APP`, separator is `__`.
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        );

    build_settings(builder)
}

/// Deserializes whatever sources `builder` carries into `Settings`, falling
/// back to defaults for anything unset.
pub fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder.build()?.try_deserialize()?;
    Ok(settings)
}
