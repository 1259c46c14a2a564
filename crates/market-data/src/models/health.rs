use std::fmt;

use serde::{Serialize, Serializer};

/// Reachability and quota status of an upstream provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderHealth {
    Ok,
    Unhealthy(String),
}

impl ProviderHealth {
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        ProviderHealth::Unhealthy(reason.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProviderHealth::Ok)
    }

    /// `"ok"` when healthy, otherwise the reason.
    pub fn status_message(&self) -> &str {
        match self {
            ProviderHealth::Ok => "ok",
            ProviderHealth::Unhealthy(reason) => reason,
        }
    }
}

impl fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_message())
    }
}

impl Serialize for ProviderHealth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.status_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_status_string() {
        assert_eq!(serde_json::to_string(&ProviderHealth::Ok).unwrap(), "\"ok\"");
        assert_eq!(
            serde_json::to_string(&ProviderHealth::unhealthy("Month credits exceeded")).unwrap(),
            "\"Month credits exceeded\""
        );
    }
}
