// In crates/api-client/src/error.rs

use thiserror::Error;

/// Binance error codes that describe a temporary condition on the exchange
/// side rather than a problem with the request.
const TRANSIENT_API_CODES: [i64; 3] = [
    -1001, // Internal error; unable to process your request.
    -1003, // Too many requests.
    -1021, // Timestamp outside of recvWindow.
];

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("API error: code {code}, msg: {msg}")]
    ApiError { code: i64, msg: String },
    #[error("Symbol {0} is not listed on the exchange")]
    UnknownSymbol(String),
    #[error("Symbol {symbol} has no {filter} filter")]
    MissingFilter { symbol: String, filter: &'static str },
    #[error("Invalid number in field {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("Failed to sign request: {0}")]
    Signing(String),
}

/// Whether a Binance error code describes a temporary exchange-side condition.
pub fn is_transient_code(code: i64) -> bool {
    TRANSIENT_API_CODES.contains(&code)
}

impl Error {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RequestFailed(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.is_body()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            Error::ApiError { code, .. } => is_transient_code(*code),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
