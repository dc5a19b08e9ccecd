//! Business-server surfaces protected by the SBAC engine.
//!
//! The engine wraps each trait with an authorizing decorator exposing the
//! same trait, so callers cannot tell a guarded server from a bare one.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{PrincipalRef, ResourceRef, StrategyAction};
use crate::request::RequestContext;
use crate::response::{BatchQueryResponse, BatchWriteResponse, Response};

/// Filter parameters of list/get calls (`id`, `name`, `group_id`, ...).
pub type Query = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub token_enable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub token_enable: bool,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// Membership and attribute changes applied to an existing group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyUserGroup {
    pub id: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub add_user_ids: Vec<String>,
    #[serde(default)]
    pub remove_user_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyRequest {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub principals: Vec<PrincipalRef>,
    #[serde(default)]
    pub resources: Vec<ResourceRef>,
    #[serde(default)]
    pub action: StrategyAction,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyStrategyRequest {
    pub id: String,
    #[serde(default)]
    pub add_principals: Vec<PrincipalRef>,
    #[serde(default)]
    pub remove_principals: Vec<PrincipalRef>,
    #[serde(default)]
    pub add_resources: Vec<ResourceRef>,
    #[serde(default)]
    pub remove_resources: Vec<ResourceRef>,
    #[serde(default)]
    pub action: Option<StrategyAction>,
}

/// Routing rule attached to a service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub service: String,
    #[serde(default)]
    pub enable: bool,
    #[serde(default)]
    pub priority: u32,
}

#[async_trait]
pub trait UserServer: Send + Sync {
    async fn create_users(&self, ctx: RequestContext, users: Vec<User>) -> BatchWriteResponse;

    async fn update_user(&self, ctx: RequestContext, user: User) -> Response;

    async fn delete_users(&self, ctx: RequestContext, users: Vec<User>) -> BatchWriteResponse;

    async fn list_users(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse;

    async fn get_user_token(&self, ctx: RequestContext, query: Query) -> Response;

    async fn change_user_token_status(&self, ctx: RequestContext, user: User) -> Response;

    async fn refresh_user_token(&self, ctx: RequestContext, user: User) -> Response;
}

#[async_trait]
pub trait UserGroupServer: Send + Sync {
    async fn create_user_group(&self, ctx: RequestContext, group: UserGroup) -> Response;

    async fn update_user_group(&self, ctx: RequestContext, group: ModifyUserGroup) -> Response;

    async fn delete_user_group(&self, ctx: RequestContext, group: UserGroup) -> Response;

    async fn list_groups(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse;

    /// Members of the group named by the `group_id` query key.
    async fn list_user_by_group(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse;

    /// Groups the user named by the `user_id` query key belongs to.
    async fn list_user_link_groups(&self, ctx: RequestContext, query: Query)
    -> BatchQueryResponse;

    async fn get_user_group_token(&self, ctx: RequestContext, query: Query) -> Response;

    async fn change_user_group_token_status(
        &self,
        ctx: RequestContext,
        group: UserGroup,
    ) -> Response;

    async fn refresh_user_group_token(&self, ctx: RequestContext, group: UserGroup) -> Response;
}

#[async_trait]
pub trait StrategyServer: Send + Sync {
    async fn create_strategy(&self, ctx: RequestContext, strategy: StrategyRequest) -> Response;

    async fn update_strategy(
        &self,
        ctx: RequestContext,
        strategy: ModifyStrategyRequest,
    ) -> Response;

    async fn delete_strategy(&self, ctx: RequestContext, strategy: StrategyRequest) -> Response;

    async fn list_strategy(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse;

    /// Strategies bound to the user named by the `id` query key.
    async fn list_strategy_by_user_id(&self, ctx: RequestContext, query: Query)
    -> BatchQueryResponse;

    async fn get_strategy(&self, ctx: RequestContext, query: Query) -> Response;
}

#[async_trait]
pub trait RoutingConfigServer: Send + Sync {
    async fn create_routing_configs(
        &self,
        ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse;

    async fn update_routing_configs(
        &self,
        ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse;

    async fn delete_routing_configs(
        &self,
        ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse;

    async fn get_routing_configs(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse;
}
