#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sbac_sdk::{
    AuthStrategy, Principal, PrincipalKind, PrincipalRef, ResourceEntry, ResourceRef,
    SbacError, SbacStorePluginClient, StrategyAction,
};

/// In-memory store with call counters.
#[derive(Default)]
pub struct MemoryStore {
    tokens: HashMap<String, Principal>,
    strategies: Vec<AuthStrategy>,
    owners: HashMap<ResourceEntry, PrincipalRef>,
    failing: bool,
    pub token_calls: AtomicUsize,
    pub strategy_calls: AtomicUsize,
    pub owner_calls: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn with_token(mut self, token: &str, principal: Principal) -> Self {
        self.tokens.insert(token.to_owned(), principal);
        self
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: AuthStrategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    #[must_use]
    pub fn with_owner(mut self, entry: ResourceEntry, owner: PrincipalRef) -> Self {
        self.owners.insert(entry, owner);
        self
    }

    /// Every lookup fails with `SbacError::Lookup`.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    fn check(&self) -> Result<(), SbacError> {
        if self.failing {
            return Err(SbacError::Lookup("store unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl SbacStorePluginClient for MemoryStore {
    async fn resolve_token(&self, token: &str) -> Result<Option<Principal>, SbacError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.tokens.get(token).cloned())
    }

    async fn strategies_for(
        &self,
        principal: &PrincipalRef,
    ) -> Result<Vec<AuthStrategy>, SbacError> {
        self.strategy_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .strategies
            .iter()
            .filter(|s| s.binds(principal))
            .cloned()
            .collect())
    }

    async fn owner_of(&self, entry: &ResourceEntry) -> Result<Option<PrincipalRef>, SbacError> {
        self.owner_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.owners.get(entry).cloned())
    }
}

#[must_use]
pub fn user(id: &str, groups: &[&str]) -> Principal {
    Principal {
        id: id.to_owned(),
        name: format!("name-{id}"),
        kind: PrincipalKind::User,
        owner: false,
        owner_id: Some("owner".to_owned()),
        groups: groups.iter().map(|g| (*g).to_owned()).collect(),
        members: vec![],
        token_enabled: true,
    }
}

#[must_use]
pub fn owner(id: &str) -> Principal {
    Principal {
        owner: true,
        owner_id: None,
        ..user(id, &[])
    }
}

#[must_use]
pub fn strategy(
    id: &str,
    principals: Vec<PrincipalRef>,
    resources: Vec<ResourceRef>,
    action: StrategyAction,
) -> AuthStrategy {
    AuthStrategy {
        id: id.to_owned(),
        name: format!("strategy-{id}"),
        enabled: true,
        default_strategy: false,
        principals,
        resources,
        action,
    }
}
