//! Per-provider request authentication.
//!
//! Every authenticated call goes through [`CredentialBundle::build_auth`],
//! which produces the exact query string and headers to send. Signatures are
//! computed over the query string that is transmitted, byte for byte.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;

use super::model::CredentialBundle;
use crate::errors::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// The parts of an outgoing request that authentication depends on.
#[derive(Clone, Debug)]
pub struct SignableRequest {
    pub method: Method,
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl SignableRequest {
    pub fn get(path: impl Into<String>, params: &[(&str, String)]) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }
}

/// Headers and final query string for one authenticated request.
#[derive(Clone, Debug, Default)]
pub struct AuthParts {
    pub headers: Vec<(&'static str, String)>,
    pub query: String,
}

impl AuthParts {
    /// Full request URL for `base_url` + `path`, with the signed query appended.
    pub fn url(&self, base_url: &str, path: &str) -> String {
        if self.query.is_empty() {
            format!("{}{}", base_url, path)
        } else {
            format!("{}{}?{}", base_url, path, self.query)
        }
    }
}

fn hmac_sha256(secret: &str, payload: &str) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Signing(format!("Invalid HMAC secret length: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn encode_query(params: &[(String, String)]) -> Result<String> {
    serde_urlencoded::to_string(params).map_err(|e| Error::Signing(e.to_string()))
}

impl CredentialBundle {
    /// Builds the authentication for one request at `timestamp_ms`.
    ///
    /// Callers pass a fresh timestamp on every attempt, so a retried request
    /// is signed again rather than replayed.
    pub fn build_auth(&self, request: &SignableRequest, timestamp_ms: i64) -> Result<AuthParts> {
        match self {
            CredentialBundle::Binance { api_key, secret } => {
                let mut params = request.params.clone();
                params.push(("timestamp".to_string(), timestamp_ms.to_string()));
                let query = encode_query(&params)?;
                let signature = hex::encode(hmac_sha256(secret.expose(), &query)?);

                Ok(AuthParts {
                    headers: vec![("X-MBX-APIKEY", api_key.expose().to_string())],
                    query: format!("{}&signature={}", query, signature),
                })
            }
            CredentialBundle::Kucoin {
                api_key,
                secret,
                passphrase,
            } => {
                let query = encode_query(&request.params)?;
                let endpoint = if query.is_empty() {
                    request.path.clone()
                } else {
                    format!("{}?{}", request.path, query)
                };
                let prehash = format!("{}{}{}", timestamp_ms, request.method.as_str(), endpoint);
                let signature = BASE64.encode(hmac_sha256(secret.expose(), &prehash)?);
                let signed_passphrase =
                    BASE64.encode(hmac_sha256(secret.expose(), passphrase.expose())?);

                Ok(AuthParts {
                    headers: vec![
                        ("KC-API-KEY", api_key.expose().to_string()),
                        ("KC-API-SIGN", signature),
                        ("KC-API-TIMESTAMP", timestamp_ms.to_string()),
                        ("KC-API-PASSPHRASE", signed_passphrase),
                        ("KC-API-KEY-VERSION", "2".to_string()),
                    ],
                    query,
                })
            }
            CredentialBundle::Ethereum { api_key, .. } => Ok(AuthParts {
                headers: vec![("x-api-key", api_key.expose().to_string())],
                query: encode_query(&request.params)?,
            }),
            CredentialBundle::Celsius {
                api_key,
                partner_token,
            } => Ok(AuthParts {
                headers: vec![
                    ("X-Cel-Api-Key", api_key.expose().to_string()),
                    ("X-Cel-Partner-Token", partner_token.expose().to_string()),
                ],
                query: encode_query(&request.params)?,
            }),
        }
    }
}
