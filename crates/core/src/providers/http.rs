//! Shared HTTP plumbing for the wallet providers.

use std::time::Duration;

use coinfolio_market_data::RetryPolicy;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::credentials::{CredentialBundle, ProviderKind, SignableRequest};
use crate::errors::{Error, Result};

/// HTTP client bound to one provider host.
pub struct ProviderHttp {
    provider: ProviderKind,
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ProviderHttp {
    pub fn new(
        provider: ProviderKind,
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            provider,
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated GET, decoded as `T`. Retried per policy; every attempt
    /// is signed with a fresh timestamp.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        credentials: &CredentialBundle,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let body = self
            .retry
            .run(self.provider.name(), move || {
                self.get_once(Some(credentials), path, params)
            })
            .await?;
        decode(self.provider, &body)
    }

    /// Unauthenticated GET, decoded as `T`. Not retried.
    pub async fn get_public_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_once(None, path, &[]).await?;
        decode(self.provider, &body)
    }

    async fn get_once(
        &self,
        credentials: Option<&CredentialBundle>,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String> {
        let request = SignableRequest::get(path, params);

        let (url, headers) = match credentials {
            Some(bundle) => {
                let auth = bundle.build_auth(&request, chrono::Utc::now().timestamp_millis())?;
                (auth.url(&self.base_url, path), auth.headers)
            }
            None => (format!("{}{}", self.base_url, path), Vec::new()),
        };

        debug!("{} request: GET {}", self.provider, path);

        let mut builder = self.client.get(&url).header("Accept", "application/json");
        for (name, value) in headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| Error::ProviderUnavailable {
            provider: self.provider,
            status: None,
            status_reason: format!("Request failed: {}", e),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(self.provider, status));
        }

        response.text().await.map_err(|e| Error::ProviderUnavailable {
            provider: self.provider,
            status: None,
            status_reason: format!("Failed to read response: {}", e),
        })
    }
}

fn unavailable(provider: ProviderKind, status: StatusCode) -> Error {
    Error::ProviderUnavailable {
        provider,
        status: Some(status.as_u16()),
        status_reason: status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string(),
    }
}

/// Decodes a provider body, mapping schema violations to `MalformedResponse`.
pub fn decode<T: DeserializeOwned>(provider: ProviderKind, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        provider,
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_uses_reason_phrase() {
        let err = unavailable(ProviderKind::Celsius, StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "Celsius unavailable: Forbidden");
    }

    #[test]
    fn test_decode_maps_to_malformed() {
        let err = decode::<Vec<u32>>(ProviderKind::Kucoin, "{").unwrap_err();
        assert_eq!(err.kind(), "malformedResponse");
    }
}
