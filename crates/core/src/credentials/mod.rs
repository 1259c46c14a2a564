//! Provider credentials.
//!
//! - **Models** (`model.rs`) - ProviderKind, RawCredentials, CredentialBundle, Secret
//! - **Resolver** (`resolver.rs`) - All-or-nothing validation of raw configuration
//! - **Signing** (`signing.rs`) - Per-provider request authentication
//! - **Status** (`status.rs`) - Presence and validity report per provider

pub mod model;
pub mod resolver;
pub mod signing;
pub mod status;

pub use model::{CredentialBundle, CredentialSettings, ProviderKind, RawCredentials, Secret};
pub use resolver::CredentialResolver;
pub use signing::{AuthParts, SignableRequest};
pub use status::{CredentialStatus, CredentialStatusChecker};
