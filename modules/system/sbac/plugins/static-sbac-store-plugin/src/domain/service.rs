//! Service implementation for the static SBAC store plugin.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use arc_swap::ArcSwap;
use sbac_sdk::{AuthStrategy, Principal, PrincipalKind, PrincipalRef, ResourceEntry};
use secrecy::ExposeSecret;

use super::error::ConfigError;
use crate::config::{PrincipalConfig, StaticSbacStoreConfig};

/// Immutable, fully indexed view of one configuration.
#[derive(Default)]
struct Snapshot {
    by_token: HashMap<String, PrincipalRef>,
    principals: HashMap<PrincipalRef, Principal>,
    strategies: HashMap<PrincipalRef, Vec<AuthStrategy>>,
    owners: HashMap<ResourceEntry, PrincipalRef>,
}

/// Static SBAC store service.
///
/// Serves point lookups from an in-memory snapshot. [`Service::reload`]
/// validates a new configuration and swaps the whole snapshot atomically;
/// concurrent readers see either the old or the new state, never a mix.
pub struct Service {
    snapshot: ArcSwap<Snapshot>,
}

impl Service {
    /// Create a service from plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is inconsistent.
    pub fn from_config(cfg: &StaticSbacStoreConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            snapshot: ArcSwap::from_pointee(build_snapshot(cfg)?),
        })
    }

    /// Replace the served state. A rejected configuration leaves the current state in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is inconsistent.
    pub fn reload(&self, cfg: &StaticSbacStoreConfig) -> Result<(), ConfigError> {
        let next = build_snapshot(cfg)?;
        self.snapshot.store(Arc::new(next));
        Ok(())
    }

    #[must_use]
    pub fn principal_by_token(&self, token: &str) -> Option<Principal> {
        let snapshot = self.snapshot.load();
        snapshot
            .by_token
            .get(token)
            .and_then(|r| snapshot.principals.get(r))
            .cloned()
    }

    #[must_use]
    pub fn strategies_for(&self, principal: &PrincipalRef) -> Vec<AuthStrategy> {
        self.snapshot
            .load()
            .strategies
            .get(principal)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn owner_of(&self, entry: &ResourceEntry) -> Option<PrincipalRef> {
        self.snapshot.load().owners.get(entry).cloned()
    }
}

fn principal_ref(p: &PrincipalConfig) -> PrincipalRef {
    PrincipalRef {
        kind: p.kind,
        id: p.id.clone(),
    }
}

fn build_snapshot(cfg: &StaticSbacStoreConfig) -> Result<Snapshot, ConfigError> {
    let mut snapshot = Snapshot::default();

    let mut ids = BTreeSet::new();
    for p in &cfg.principals {
        if !ids.insert(p.id.as_str()) {
            return Err(ConfigError::DuplicatePrincipal(p.id.clone()));
        }
        let misplaced = match p.kind {
            PrincipalKind::User => !p.members.is_empty(),
            PrincipalKind::Group => !p.groups.is_empty(),
        };
        if misplaced {
            return Err(ConfigError::InvalidMembership(p.id.clone()));
        }
    }

    let known = |r: &PrincipalRef| cfg.principals.iter().any(|p| principal_ref(p) == *r);
    let require = |context: &str, r: PrincipalRef| {
        if known(&r) {
            Ok(r)
        } else {
            Err(ConfigError::UnknownPrincipal {
                context: context.to_owned(),
                principal: r,
            })
        }
    };

    // Membership may be declared on either side; both sides see the union.
    let mut groups_of: HashMap<&str, BTreeSet<String>> = HashMap::new();
    let mut members_of: HashMap<&str, BTreeSet<String>> = HashMap::new();
    for p in &cfg.principals {
        let context = format!("principal '{}'", p.id);
        for g in &p.groups {
            require(&context, PrincipalRef::group(g.as_str()))?;
            groups_of.entry(p.id.as_str()).or_default().insert(g.clone());
            members_of.entry(g.as_str()).or_default().insert(p.id.clone());
        }
        for u in &p.members {
            require(&context, PrincipalRef::user(u.as_str()))?;
            members_of.entry(p.id.as_str()).or_default().insert(u.clone());
            groups_of.entry(u.as_str()).or_default().insert(p.id.clone());
        }
    }

    for p in &cfg.principals {
        let reference = principal_ref(p);
        for token in &p.tokens {
            let raw = token.expose_secret().to_owned();
            if let Some(first) = snapshot.by_token.get(&raw) {
                return Err(ConfigError::DuplicateToken {
                    first: first.id.clone(),
                    second: p.id.clone(),
                });
            }
            snapshot.by_token.insert(raw, reference.clone());
        }

        let principal = Principal {
            id: p.id.clone(),
            name: if p.name.is_empty() {
                p.id.clone()
            } else {
                p.name.clone()
            },
            kind: p.kind,
            owner: p.owner,
            owner_id: p.owner_id.clone(),
            groups: groups_of
                .remove(p.id.as_str())
                .map(|s| s.into_iter().collect())
                .unwrap_or_default(),
            members: members_of
                .remove(p.id.as_str())
                .map(|s| s.into_iter().collect())
                .unwrap_or_default(),
            token_enabled: p.token_enabled,
        };
        snapshot.principals.insert(reference, principal);
    }

    let mut strategy_ids = BTreeSet::new();
    for s in &cfg.strategies {
        if !strategy_ids.insert(s.id.as_str()) {
            return Err(ConfigError::DuplicateStrategy(s.id.clone()));
        }
        let context = format!("strategy '{}'", s.id);
        for principal in &s.principals {
            let principal = require(&context, principal.clone())?;
            snapshot
                .strategies
                .entry(principal)
                .or_default()
                .push(s.clone());
        }
    }

    for o in &cfg.ownership {
        let entry = ResourceEntry::new(o.resource_type, o.id.clone());
        let owner = require(&format!("ownership of {entry}"), o.owner.clone())?;
        snapshot.owners.insert(entry, owner);
    }

    tracing::debug!(
        principals = snapshot.principals.len(),
        strategies = strategy_ids.len(),
        owned_resources = snapshot.owners.len(),
        "built sbac store snapshot"
    );
    Ok(snapshot)
}
