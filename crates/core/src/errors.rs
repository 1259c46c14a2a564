//! Core error types for Coinfolio.
//!
//! Provider-level failures carry the provider they came from so that the
//! aggregator can report them per provider without aborting the others.

use coinfolio_market_data::errors::{MarketDataError, RetryClass, Retryable};
use thiserror::Error;

use crate::credentials::ProviderKind;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing credentials for {provider}: {}", missing_fields.join(", "))]
    MissingCredentials {
        provider: ProviderKind,
        missing_fields: Vec<&'static str>,
    },

    #[error("{provider} unavailable: {status_reason}")]
    ProviderUnavailable {
        provider: ProviderKind,
        status: Option<u16>,
        status_reason: String,
    },

    #[error("Malformed response from {provider}: {detail}")]
    MalformedResponse {
        provider: ProviderKind,
        detail: String,
    },

    #[error("No quote available for {symbol}")]
    NoQuoteAvailable { symbol: String },

    #[error("Value of {symbol} exceeds the representable range")]
    ValueOverflow { symbol: String },

    #[error("Market data operation failed: {0}")]
    MarketData(MarketDataError),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}

impl Error {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::MissingCredentials { .. } => "missingCredentials",
            Error::ProviderUnavailable { .. } => "providerUnavailable",
            Error::MalformedResponse { .. } => "malformedResponse",
            Error::NoQuoteAvailable { .. } => "noQuoteAvailable",
            Error::ValueOverflow { .. } => "valueOverflow",
            Error::MarketData(_) => "marketData",
            Error::Signing(_) => "signing",
            Error::InvalidConfigValue(_) => "invalidConfigValue",
        }
    }

    pub fn retry_class(&self) -> RetryClass {
        match self {
            Error::ProviderUnavailable { status, .. } => RetryClass::for_status(*status),
            Error::MarketData(e) => e.retry_class(),
            Error::MissingCredentials { .. }
            | Error::MalformedResponse { .. }
            | Error::NoQuoteAvailable { .. }
            | Error::ValueOverflow { .. }
            | Error::Signing(_)
            | Error::InvalidConfigValue(_) => RetryClass::Never,
        }
    }
}

impl Retryable for Error {
    fn retry_class(&self) -> RetryClass {
        Error::retry_class(self)
    }
}

impl From<MarketDataError> for Error {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::NoQuoteAvailable { symbol } => Error::NoQuoteAvailable { symbol },
            other => Error::MarketData(other),
        }
    }
}
