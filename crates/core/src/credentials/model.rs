//! Credential domain models.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The wallet sources, in the fixed order used for every response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    Binance,
    #[serde(rename = "KuCoin")]
    Kucoin,
    Ethereum,
    Celsius,
}

impl ProviderKind {
    /// All providers in response order.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Binance,
        ProviderKind::Kucoin,
        ProviderKind::Ethereum,
        ProviderKind::Celsius,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Binance => "Binance",
            ProviderKind::Kucoin => "KuCoin",
            ProviderKind::Ethereum => "Ethereum",
            ProviderKind::Celsius => "Celsius",
        }
    }

    /// Credential fields that must all be present to build a bundle.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Binance => &["api_key", "secret"],
            ProviderKind::Kucoin => &["api_key", "secret", "passphrase"],
            ProviderKind::Ethereum => &["api_key", "wallet_address"],
            ProviderKind::Celsius => &["api_key", "partner_token"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Secret material. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Unvalidated credential fields for one provider, as read from configuration.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RawCredentials {
    fields: BTreeMap<String, String>,
}

impl RawCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter. `None` leaves the field unset.
    pub fn with(mut self, field: &str, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.fields.insert(field.to_string(), value.into());
        }
        self
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// The trimmed value of a field; whitespace-only values count as absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// True when at least one field carries a value.
    pub fn is_submitted(&self) -> bool {
        self.fields.keys().any(|field| self.get(field).is_some())
    }
}

impl fmt::Debug for RawCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fields.keys()).finish()
    }
}

/// Validated, provider-specific credentials.
///
/// Only [`CredentialResolver`](super::CredentialResolver) constructs these,
/// so a bundle is always complete.
#[derive(Clone, Debug)]
pub enum CredentialBundle {
    Binance {
        api_key: Secret,
        secret: Secret,
    },
    Kucoin {
        api_key: Secret,
        secret: Secret,
        passphrase: Secret,
    },
    Ethereum {
        api_key: Secret,
        address: String,
    },
    Celsius {
        api_key: Secret,
        partner_token: Secret,
    },
}

impl CredentialBundle {
    pub fn kind(&self) -> ProviderKind {
        match self {
            CredentialBundle::Binance { .. } => ProviderKind::Binance,
            CredentialBundle::Kucoin { .. } => ProviderKind::Kucoin,
            CredentialBundle::Ethereum { .. } => ProviderKind::Ethereum,
            CredentialBundle::Celsius { .. } => ProviderKind::Celsius,
        }
    }
}

/// Raw credentials for every provider.
#[derive(Clone, Debug, Default)]
pub struct CredentialSettings {
    providers: BTreeMap<ProviderKind, RawCredentials>,
}

impl CredentialSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ProviderKind, raw: RawCredentials) -> Self {
        self.providers.insert(kind, raw);
        self
    }

    pub fn insert(&mut self, kind: ProviderKind, raw: RawCredentials) {
        self.providers.insert(kind, raw);
    }

    /// Credentials for `kind`; empty when nothing was configured.
    pub fn for_provider(&self, kind: ProviderKind) -> RawCredentials {
        self.providers.get(&kind).cloned().unwrap_or_default()
    }
}
