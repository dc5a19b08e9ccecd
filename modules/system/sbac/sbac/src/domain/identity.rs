//! Token to principal resolution.

use std::sync::Arc;

use sbac_sdk::request::with_cancellation;
use sbac_sdk::{Principal, SbacStorePluginClient};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;

use super::DomainError;

/// Maps an opaque caller token to the principal holding it.
///
/// A token is accepted only if it is well formed, known to the store and
/// still enabled.
pub struct IdentityResolver {
    store: Arc<dyn SbacStorePluginClient>,
    max_token_length: usize,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(store: Arc<dyn SbacStorePluginClient>, max_token_length: usize) -> Self {
        Self {
            store,
            max_token_length,
        }
    }

    /// Resolve `token` to its principal.
    ///
    /// # Errors
    ///
    /// - `MissingToken`, `MalformedToken`, `UnknownToken`, `TokenDisabled` for identity failures
    /// - `Lookup` / `Cancelled` if the store lookup fails or is abandoned
    pub async fn resolve(
        &self,
        token: &SecretString,
        cancellation: &CancellationToken,
    ) -> Result<Principal, DomainError> {
        let raw = token.expose_secret();
        check_token_syntax(raw, self.max_token_length)?;

        let principal = with_cancellation(cancellation, self.store.resolve_token(raw))
            .await?
            .ok_or(DomainError::UnknownToken)?;

        if !principal.token_enabled {
            return Err(DomainError::TokenDisabled(principal.reference()));
        }
        Ok(principal)
    }
}

fn check_token_syntax(raw: &str, max_len: usize) -> Result<(), DomainError> {
    if raw.is_empty() {
        return Err(DomainError::MissingToken);
    }
    if raw.len() > max_len {
        return Err(DomainError::MalformedToken("token exceeds maximum length"));
    }
    if !raw.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(DomainError::MalformedToken(
            "token contains whitespace or non-printable characters",
        ));
    }
    Ok(())
}
