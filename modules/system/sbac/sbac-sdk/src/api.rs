//! Public API trait for the SBAC engine.

use async_trait::async_trait;
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use crate::context::AcquireContext;
use crate::error::SbacError;
use crate::models::{CheckMode, Principal};

/// Public API trait for the SBAC engine.
///
/// Implemented in-process by the engine's local client and consumed by the
/// access enforcer wrapping each business server:
///
/// ```ignore
/// let principal = sbac.check_permission(&mut acquire, CheckMode::Strict).await?;
/// ```
#[async_trait]
pub trait SbacGatewayClient: Send + Sync {
    /// Resolve the context's token and evaluate its requested resources.
    ///
    /// Ownership lookups performed along the way are cached in the context's
    /// attachment.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the token is malformed, unknown or disabled
    /// - `Denied` if no strategy authorizes the operation
    /// - `Lookup` if the store fails
    /// - `Cancelled` if the request is cancelled during a lookup
    async fn check_permission(
        &self,
        ctx: &mut AcquireContext,
        mode: CheckMode,
    ) -> Result<Principal, SbacError>;

    /// Resolve a token to its principal without evaluating any strategy.
    ///
    /// # Errors
    ///
    /// Same identity errors as [`SbacGatewayClient::check_permission`].
    async fn resolve(
        &self,
        token: &SecretString,
        cancellation: &CancellationToken,
    ) -> Result<Principal, SbacError>;
}
