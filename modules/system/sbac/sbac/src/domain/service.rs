//! Auth manager service: identity resolution followed by strategy evaluation.

use std::sync::Arc;

use sbac_sdk::{
    AcquireContext, CheckMode, Decision, DenyReason, Principal, SbacStorePluginClient,
};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{DomainError, IdentityResolver, PermissionEvaluator};
use crate::config::SbacConfig;

/// SBAC engine service.
///
/// Resolves the caller from the context token, then evaluates the context
/// against the caller's strategies unless strategy checking is disabled.
pub struct Service {
    identity: IdentityResolver,
    evaluator: PermissionEvaluator,
    strategy_check_enabled: bool,
}

impl Service {
    #[must_use]
    pub fn new(store: Arc<dyn SbacStorePluginClient>, cfg: &SbacConfig) -> Self {
        Self {
            identity: IdentityResolver::new(store.clone(), cfg.max_token_length),
            evaluator: PermissionEvaluator::new(store),
            strategy_check_enabled: cfg.strategy_check_enabled,
        }
    }

    /// Resolve and authorize the caller of `ctx`.
    ///
    /// # Errors
    ///
    /// Identity errors, `Denied` with the evaluator's reason, or a store error.
    #[tracing::instrument(
        skip_all,
        fields(
            module = %ctx.module(),
            operation = %ctx.operation(),
            strict = mode.is_strict(),
            principal
        )
    )]
    pub async fn check_permission(
        &self,
        ctx: &mut AcquireContext,
        mode: CheckMode,
    ) -> Result<Principal, DomainError> {
        let principal = self
            .identity
            .resolve(ctx.token(), ctx.cancellation())
            .await?;
        tracing::Span::current()
            .record("principal", tracing::field::display(principal.reference()));

        // Owner-only operations stay restricted even with strategy checks off.
        if mode.requires_owner() && !principal.owner {
            return Err(denied(&principal, DenyReason::OwnerRequired));
        }
        if !self.strategy_check_enabled {
            debug!("strategy check disabled, allowing resolved principal");
            return Ok(principal);
        }

        match self.evaluator.evaluate(&principal, ctx, mode).await? {
            Decision::Allow => Ok(principal),
            Decision::Deny(reason) => Err(denied(&principal, reason)),
        }
    }

    /// Resolve a token without evaluating strategies.
    ///
    /// # Errors
    ///
    /// Identity errors or a store error.
    pub async fn resolve(
        &self,
        token: &SecretString,
        cancellation: &CancellationToken,
    ) -> Result<Principal, DomainError> {
        self.identity.resolve(token, cancellation).await
    }
}

fn denied(principal: &Principal, reason: DenyReason) -> DomainError {
    debug!(%reason, "permission denied");
    DomainError::Denied {
        principal: principal.reference(),
        reason,
    }
}
