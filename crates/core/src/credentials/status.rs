//! Credential presence and validity report.

use std::sync::Arc;

use futures::future::join_all;
use log::info;
use serde::Serialize;

use super::model::{CredentialSettings, ProviderKind};
use super::resolver::CredentialResolver;
use crate::providers::{AccessCheck, WalletProvider};

/// Credential status of one provider. `reason` is set on every negative
/// outcome and absent on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub provider: ProviderKind,
    pub submitted: bool,
    pub valid: bool,
    pub required_fields: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CredentialStatus {
    fn new(provider: ProviderKind, submitted: bool) -> Self {
        Self {
            provider,
            submitted,
            valid: false,
            required_fields: provider.required_fields().to_vec(),
            reason: None,
        }
    }

    fn invalid(mut self, reason: impl Into<String>) -> Self {
        self.valid = false;
        self.reason = Some(reason.into());
        self
    }

    fn valid(mut self) -> Self {
        self.valid = true;
        self.reason = None;
        self
    }
}

/// Checks every provider's credentials with a lightweight authenticated probe.
pub struct CredentialStatusChecker {
    providers: Vec<Arc<dyn WalletProvider>>,
    credentials: CredentialSettings,
}

impl CredentialStatusChecker {
    pub fn new(
        mut providers: Vec<Arc<dyn WalletProvider>>,
        credentials: CredentialSettings,
    ) -> Self {
        providers.sort_by_key(|p| p.kind());
        Self {
            providers,
            credentials,
        }
    }

    /// Status of every provider, in provider order. Probes run concurrently.
    pub async fn check_all(&self) -> Vec<CredentialStatus> {
        join_all(self.providers.iter().map(|p| self.check(p.as_ref()))).await
    }

    pub async fn check(&self, provider: &dyn WalletProvider) -> CredentialStatus {
        let kind = provider.kind();
        let raw = self.credentials.for_provider(kind);
        let status = CredentialStatus::new(kind, raw.is_submitted());

        let bundle = match CredentialResolver::resolve(kind, &raw) {
            Ok(bundle) => bundle,
            Err(e) => return status.invalid(e.to_string()),
        };

        let status = match provider.verify_access(&bundle).await {
            Ok(AccessCheck::Granted) => status.valid(),
            Ok(AccessCheck::Denied(reason)) => status.invalid(reason),
            Err(e) => status.invalid(e.to_string()),
        };

        info!(
            "{} credentials: submitted={} valid={}",
            kind, status.submitted, status.valid
        );
        status
    }
}
