//! Routing-config server guarded by SBAC.
//!
//! Routing rules are authorized against the service they attach to.

use std::sync::Arc;

use async_trait::async_trait;
use sbac_sdk::pep::{AccessEnforcer, Guard};
use sbac_sdk::{
    BatchQueryResponse, BatchWriteResponse, BzModule, Query, RequestContext, ResourceEntry,
    ResourceOperation, ResourceType, RoutingConfig, RoutingConfigServer,
};

const CREATE_ROUTING_CONFIGS: Guard<Vec<RoutingConfig>> =
    Guard::strict(BzModule::Naming, ResourceOperation::Create, routed_services);
const UPDATE_ROUTING_CONFIGS: Guard<Vec<RoutingConfig>> =
    Guard::strict(BzModule::Naming, ResourceOperation::Modify, routed_services);
const DELETE_ROUTING_CONFIGS: Guard<Vec<RoutingConfig>> =
    Guard::strict(BzModule::Naming, ResourceOperation::Delete, routed_services);
const GET_ROUTING_CONFIGS: Guard<Query> = Guard::advisory(BzModule::Naming, queried_service);

#[allow(clippy::ptr_arg)]
fn routed_services(routings: &Vec<RoutingConfig>) -> Vec<ResourceEntry> {
    routings
        .iter()
        .map(|r| ResourceEntry::service(&r.namespace, &r.service))
        .collect()
}

/// Service named by the `namespace` + `service` keys, or the namespace alone.
fn queried_service(query: &Query) -> Vec<ResourceEntry> {
    let namespace = query.get("namespace").filter(|v| !v.is_empty());
    let service = query.get("service").filter(|v| !v.is_empty());
    match (namespace, service) {
        (Some(ns), Some(svc)) => vec![ResourceEntry::service(ns, svc)],
        (Some(ns), None) => vec![ResourceEntry::new(ResourceType::Namespace, ns.clone())],
        _ => Vec::new(),
    }
}

/// [`RoutingConfigServer`] that authorizes every call before reaching `target`.
pub struct RoutingConfigServerWithAuth {
    enforcer: AccessEnforcer,
    target: Arc<dyn RoutingConfigServer>,
}

impl RoutingConfigServerWithAuth {
    #[must_use]
    pub fn new(enforcer: AccessEnforcer, target: Arc<dyn RoutingConfigServer>) -> Self {
        Self { enforcer, target }
    }
}

#[async_trait]
impl RoutingConfigServer for RoutingConfigServerWithAuth {
    async fn create_routing_configs(
        &self,
        ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse {
        self.enforcer
            .enforce(ctx, routings, &CREATE_ROUTING_CONFIGS, |ctx, routings| {
                self.target.create_routing_configs(ctx, routings)
            })
            .await
    }

    async fn update_routing_configs(
        &self,
        ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse {
        self.enforcer
            .enforce(ctx, routings, &UPDATE_ROUTING_CONFIGS, |ctx, routings| {
                self.target.update_routing_configs(ctx, routings)
            })
            .await
    }

    async fn delete_routing_configs(
        &self,
        ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse {
        self.enforcer
            .enforce(ctx, routings, &DELETE_ROUTING_CONFIGS, |ctx, routings| {
                self.target.delete_routing_configs(ctx, routings)
            })
            .await
    }

    async fn get_routing_configs(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &GET_ROUTING_CONFIGS, |ctx, query| {
                self.target.get_routing_configs(ctx, query)
            })
            .await
    }
}
