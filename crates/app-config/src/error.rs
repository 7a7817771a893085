// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Invalid runtime {0:?}: expected a whole number followed by s, m or h (e.g. 30m)")]
    InvalidRuntime(String),
}

pub type Result<T> = std::result::Result<T, Error>;
