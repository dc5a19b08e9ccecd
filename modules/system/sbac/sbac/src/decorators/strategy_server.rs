//! Strategy server guarded by SBAC.
//!
//! Granting a resource through a new or modified strategy requires full
//! control of that resource, so the granted references are part of the
//! checked resource set. A wildcard grant is only covered by a wildcard.

use std::sync::Arc;

use async_trait::async_trait;
use sbac_sdk::pep::{AccessEnforcer, Guard, query_entry};
use sbac_sdk::{
    BatchQueryResponse, BzModule, ModifyStrategyRequest, Query, RequestContext, ResourceEntry,
    ResourceOperation, ResourceRef, ResourceType, Response, StrategyRequest, StrategyServer,
};

const CREATE_STRATEGY: Guard<StrategyRequest> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Create, |s| {
        granted(&s.resources).collect()
    });
const UPDATE_STRATEGY: Guard<ModifyStrategyRequest> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, |s| {
        std::iter::once(strategy_entry(&s.id))
            .chain(granted(&s.add_resources))
            .collect()
    });
const DELETE_STRATEGY: Guard<StrategyRequest> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Delete, |s| {
        vec![strategy_entry(&s.id)]
    });
const LIST_STRATEGY: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "id", ResourceType::AuthStrategy)
});
const LIST_STRATEGY_BY_USER_ID: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "id", ResourceType::User)
});
const GET_STRATEGY: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "id", ResourceType::AuthStrategy)
});

fn strategy_entry(id: &str) -> ResourceEntry {
    ResourceEntry::new(ResourceType::AuthStrategy, id)
}

fn granted(refs: &[ResourceRef]) -> impl Iterator<Item = ResourceEntry> + '_ {
    refs.iter()
        .map(|r| ResourceEntry::new(r.resource_type, r.id.clone()))
}

/// [`StrategyServer`] that authorizes every call before reaching `target`.
pub struct StrategyServerWithAuth {
    enforcer: AccessEnforcer,
    target: Arc<dyn StrategyServer>,
}

impl StrategyServerWithAuth {
    #[must_use]
    pub fn new(enforcer: AccessEnforcer, target: Arc<dyn StrategyServer>) -> Self {
        Self { enforcer, target }
    }
}

#[async_trait]
impl StrategyServer for StrategyServerWithAuth {
    async fn create_strategy(&self, ctx: RequestContext, strategy: StrategyRequest) -> Response {
        self.enforcer
            .enforce(ctx, strategy, &CREATE_STRATEGY, |ctx, strategy| {
                self.target.create_strategy(ctx, strategy)
            })
            .await
    }

    async fn update_strategy(
        &self,
        ctx: RequestContext,
        strategy: ModifyStrategyRequest,
    ) -> Response {
        self.enforcer
            .enforce(ctx, strategy, &UPDATE_STRATEGY, |ctx, strategy| {
                self.target.update_strategy(ctx, strategy)
            })
            .await
    }

    async fn delete_strategy(&self, ctx: RequestContext, strategy: StrategyRequest) -> Response {
        self.enforcer
            .enforce(ctx, strategy, &DELETE_STRATEGY, |ctx, strategy| {
                self.target.delete_strategy(ctx, strategy)
            })
            .await
    }

    async fn list_strategy(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &LIST_STRATEGY, |ctx, query| {
                self.target.list_strategy(ctx, query)
            })
            .await
    }

    async fn list_strategy_by_user_id(
        &self,
        ctx: RequestContext,
        query: Query,
    ) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &LIST_STRATEGY_BY_USER_ID, |ctx, query| {
                self.target.list_strategy_by_user_id(ctx, query)
            })
            .await
    }

    async fn get_strategy(&self, ctx: RequestContext, query: Query) -> Response {
        self.enforcer
            .enforce(ctx, query, &GET_STRATEGY, |ctx, query| {
                self.target.get_strategy(ctx, query)
            })
            .await
    }
}
