use super::model::{CredentialBundle, ProviderKind, RawCredentials, Secret};
use crate::errors::{Error, Result};

/// Builds validated credential bundles from raw configuration.
///
/// All-or-nothing: either every required field is present or resolution
/// fails listing all of the missing ones. No network access.
pub struct CredentialResolver;

impl CredentialResolver {
    pub fn resolve(kind: ProviderKind, raw: &RawCredentials) -> Result<CredentialBundle> {
        let missing_fields: Vec<&'static str> = kind
            .required_fields()
            .iter()
            .copied()
            .filter(|field| raw.get(field).is_none())
            .collect();

        if !missing_fields.is_empty() {
            return Err(Error::MissingCredentials {
                provider: kind,
                missing_fields,
            });
        }

        let secret = |field: &str| Secret::new(raw.get(field).unwrap_or_default());

        let bundle = match kind {
            ProviderKind::Binance => CredentialBundle::Binance {
                api_key: secret("api_key"),
                secret: secret("secret"),
            },
            ProviderKind::Kucoin => CredentialBundle::Kucoin {
                api_key: secret("api_key"),
                secret: secret("secret"),
                passphrase: secret("passphrase"),
            },
            ProviderKind::Ethereum => CredentialBundle::Ethereum {
                api_key: secret("api_key"),
                address: raw.get("wallet_address").unwrap_or_default().to_string(),
            },
            ProviderKind::Celsius => CredentialBundle::Celsius {
                api_key: secret("api_key"),
                partner_token: secret("partner_token"),
            },
        };

        Ok(bundle)
    }
}
