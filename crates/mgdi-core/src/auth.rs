//! Principal verification port.
//!
//! A verifier turns a presented credential into a [`Principal`]. The memory
//! service only ever sees principals produced this way.

use mgdi_types::error::AuthError;
use mgdi_types::identity::Principal;

/// Trait for credential verification backends.
///
/// Implementations live in mgdi-infra (e.g., `SqliteApiKeyRepository`).
pub trait PrincipalVerifier: Send + Sync {
    /// Verify a presented token. Blank tokens are `MissingCredentials`.
    fn verify(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Principal, AuthError>> + Send;
}
