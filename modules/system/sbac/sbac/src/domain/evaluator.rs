//! Strategy evaluation.
//!
//! Decides whether a resolved principal may perform the operation recorded
//! in an [`AcquireContext`].
//!
//! ## Strict mode (create / modify / delete, token reads)
//!
//! A single strategy held by the principal, directly or through one of its
//! groups, must be enabled, grant read-write and cover **every** requested
//! entry. Coverage is never combined across strategies. With no requested
//! entries any enabled read-write strategy suffices.
//!
//! ## Advisory mode (get / list)
//!
//! Any enabled strategy covering at least one requested entry allows. A call
//! naming no entry always passes; the business server narrows its results.
//!
//! ## Default strategies
//!
//! A default strategy also covers every entry owned by one of its principals.
//! Ownership is looked up only when explicit references miss, and every
//! lookup is cached in the context's attachment.

use std::collections::HashSet;
use std::sync::Arc;

use sbac_sdk::request::with_cancellation;
use sbac_sdk::{
    AcquireContext, AuthStrategy, CheckMode, Decision, DenyReason, Principal, ResourceEntry,
    SbacStorePluginClient,
};
use tokio_util::sync::CancellationToken;

use super::DomainError;

pub struct PermissionEvaluator {
    store: Arc<dyn SbacStorePluginClient>,
}

impl PermissionEvaluator {
    #[must_use]
    pub fn new(store: Arc<dyn SbacStorePluginClient>) -> Self {
        Self { store }
    }

    /// Evaluate `ctx` for `principal` under `mode`.
    ///
    /// # Errors
    ///
    /// `Lookup` or `Cancelled` when a store lookup fails. These are never
    /// turned into a decision.
    pub async fn evaluate(
        &self,
        principal: &Principal,
        ctx: &mut AcquireContext,
        mode: CheckMode,
    ) -> Result<Decision, DomainError> {
        if mode.requires_owner() && !principal.owner {
            return Ok(Decision::Deny(DenyReason::OwnerRequired));
        }
        if !mode.is_strict() && ctx.is_empty() {
            return Ok(Decision::Allow);
        }

        let strategies = self.strategies_of(principal, ctx.cancellation()).await?;
        if strategies.is_empty() {
            return Ok(Decision::Deny(DenyReason::NoStrategies));
        }

        let enabled: Vec<AuthStrategy> = strategies.into_iter().filter(|s| s.enabled).collect();
        if enabled.is_empty() {
            return Ok(Decision::Deny(DenyReason::AllStrategiesDisabled));
        }

        let entries: Vec<ResourceEntry> = ctx.entries().cloned().collect();
        if mode.is_strict() {
            self.evaluate_strict(&enabled, &entries, ctx).await
        } else {
            self.evaluate_advisory(&enabled, entries, ctx).await
        }
    }

    async fn evaluate_strict(
        &self,
        enabled: &[AuthStrategy],
        entries: &[ResourceEntry],
        ctx: &mut AcquireContext,
    ) -> Result<Decision, DomainError> {
        let mut best: Option<Vec<ResourceEntry>> = None;
        let mut saw_read_write = false;

        for strategy in enabled.iter().filter(|s| s.action.allows_write()) {
            saw_read_write = true;

            let mut uncovered = Vec::new();
            for entry in entries {
                if !self.covers(strategy, entry, ctx).await? {
                    uncovered.push(entry.clone());
                }
            }
            if uncovered.is_empty() {
                tracing::trace!(strategy = %strategy.id, "strategy covers every entry");
                return Ok(Decision::Allow);
            }
            if best.as_ref().is_none_or(|b| uncovered.len() < b.len()) {
                best = Some(uncovered);
            }
        }

        if !saw_read_write {
            return Ok(Decision::Deny(DenyReason::NoReadWriteStrategy));
        }
        Ok(Decision::Deny(DenyReason::NotCovered {
            resources: best.unwrap_or_default(),
        }))
    }

    async fn evaluate_advisory(
        &self,
        enabled: &[AuthStrategy],
        entries: Vec<ResourceEntry>,
        ctx: &mut AcquireContext,
    ) -> Result<Decision, DomainError> {
        for strategy in enabled {
            for entry in &entries {
                if self.covers(strategy, entry, ctx).await? {
                    return Ok(Decision::Allow);
                }
            }
        }
        Ok(Decision::Deny(DenyReason::NotCovered { resources: entries }))
    }

    async fn covers(
        &self,
        strategy: &AuthStrategy,
        entry: &ResourceEntry,
        ctx: &mut AcquireContext,
    ) -> Result<bool, DomainError> {
        if strategy.explicitly_covers(entry) {
            return Ok(true);
        }
        if !strategy.default_strategy {
            return Ok(false);
        }
        let record = ctx.resolve_owner(self.store.as_ref(), entry).await?;
        Ok(record.owner.is_some_and(|owner| strategy.binds(&owner)))
    }

    /// Strategies bound to the principal or any of its groups, deduplicated by id.
    async fn strategies_of(
        &self,
        principal: &Principal,
        cancellation: &CancellationToken,
    ) -> Result<Vec<AuthStrategy>, DomainError> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for subject in principal.subjects() {
            let found = with_cancellation(cancellation, self.store.strategies_for(&subject)).await?;
            for strategy in found {
                if seen.insert(strategy.id.clone()) {
                    out.push(strategy);
                }
            }
        }
        Ok(out)
    }
}
