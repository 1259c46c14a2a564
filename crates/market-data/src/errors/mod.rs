//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`RetryClass`]: Classification for determining retry behavior
//! - [`RetryPolicy`]: Bounded exponential backoff used by the HTTP clients

mod retry;

pub use retry::{RetryClass, RetryPolicy, Retryable};

use thiserror::Error;

/// Errors that can occur during market data operations.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines whether the HTTP client may try the call again.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The symbol was never resolved to a provider asset id, or its quote
    /// was dropped because a required field was null.
    #[error("No quote available for {symbol}")]
    NoQuoteAvailable {
        /// The symbol that could not be priced
        symbol: String,
    },

    /// The provider cannot be called because its API key is not configured.
    #[error("No {provider} API key available")]
    MissingApiKey {
        /// The provider without credentials
        provider: String,
    },

    /// The provider answered with a non-success status, or could not be
    /// reached at all (`status` is `None` in that case).
    #[error("{provider} unavailable: {status_reason}")]
    ProviderUnavailable {
        /// The provider that failed
        provider: String,
        /// HTTP status code, if a response was received
        status: Option<u16>,
        /// Upstream reason (HTTP reason phrase or provider error message)
        status_reason: String,
    },

    /// The provider rate limited the request (HTTP 429).
    /// Should retry with exponential backoff.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The response body could not be decoded into the expected schema.
    #[error("Malformed response from {provider}: {detail}")]
    MalformedResponse {
        /// The provider that returned the body
        provider: String,
        /// Decoder message
        detail: String,
    },
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use coinfolio_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "COINMARKETCAP".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::NoQuoteAvailable { symbol: "XYZ".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::NoQuoteAvailable { .. }
            | Self::MissingApiKey { .. }
            | Self::MalformedResponse { .. } => RetryClass::Never,

            Self::RateLimited { .. } => RetryClass::WithBackoff,

            Self::ProviderUnavailable { status, .. } => RetryClass::for_status(*status),
        }
    }
}

impl Retryable for MarketDataError {
    fn retry_class(&self) -> RetryClass {
        MarketDataError::retry_class(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_quote_never_retries() {
        let error = MarketDataError::NoQuoteAvailable {
            symbol: "LDBNB".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_missing_api_key_never_retries() {
        let error = MarketDataError::MissingApiKey {
            provider: "CoinMarketCap".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "COINMARKETCAP".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_unavailable_follows_status() {
        let server_error = MarketDataError::ProviderUnavailable {
            provider: "COINMARKETCAP".to_string(),
            status: Some(503),
            status_reason: "Service Unavailable".to_string(),
        };
        assert_eq!(server_error.retry_class(), RetryClass::WithBackoff);

        let unauthorized = MarketDataError::ProviderUnavailable {
            provider: "COINMARKETCAP".to_string(),
            status: Some(401),
            status_reason: "Unauthorized".to_string(),
        };
        assert_eq!(unauthorized.retry_class(), RetryClass::Never);

        let unreachable = MarketDataError::ProviderUnavailable {
            provider: "COINMARKETCAP".to_string(),
            status: None,
            status_reason: "connection refused".to_string(),
        };
        assert_eq!(unreachable.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::NoQuoteAvailable {
            symbol: "BTC".to_string(),
        };
        assert_eq!(format!("{}", error), "No quote available for BTC");

        let error = MarketDataError::MissingApiKey {
            provider: "CoinMarketCap".to_string(),
        };
        assert_eq!(format!("{}", error), "No CoinMarketCap API key available");

        let error = MarketDataError::MalformedResponse {
            provider: "COINMARKETCAP".to_string(),
            detail: "missing field `data`".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Malformed response from COINMARKETCAP: missing field `data`"
        );
    }
}
