//! Plugin API trait for SBAC store implementations.

use async_trait::async_trait;

use crate::error::SbacError;
use crate::models::{AuthStrategy, Principal, PrincipalRef, ResourceEntry};

/// Plugin API trait for principal, strategy and ownership stores.
///
/// The engine calls the selected plugin through this trait. Every method is
/// an async point read and must be safe to call concurrently.
#[async_trait]
pub trait SbacStorePluginClient: Send + Sync {
    /// Look up the principal bound to `token`.
    ///
    /// Returns `Ok(None)` when no principal holds the token.
    ///
    /// # Errors
    ///
    /// [`SbacError::Lookup`] if the store cannot answer.
    async fn resolve_token(&self, token: &str) -> Result<Option<Principal>, SbacError>;

    /// Strategies that list `principal` among their principals.
    ///
    /// # Errors
    ///
    /// [`SbacError::Lookup`] if the store cannot answer.
    async fn strategies_for(&self, principal: &PrincipalRef)
    -> Result<Vec<AuthStrategy>, SbacError>;

    /// Owner of `entry`, or `None` if the store does not know it.
    ///
    /// # Errors
    ///
    /// [`SbacError::Lookup`] if the store cannot answer.
    async fn owner_of(&self, entry: &ResourceEntry) -> Result<Option<PrincipalRef>, SbacError>;
}
