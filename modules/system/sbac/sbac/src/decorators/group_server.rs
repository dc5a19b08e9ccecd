//! User-group server guarded by SBAC.

use std::sync::Arc;

use async_trait::async_trait;
use sbac_sdk::pep::{AccessEnforcer, Guard, no_resources, query_entry};
use sbac_sdk::{
    BatchQueryResponse, BzModule, ModifyUserGroup, Query, RequestContext, ResourceEntry,
    ResourceOperation, ResourceType, Response, UserGroup, UserGroupServer,
};

const CREATE_USER_GROUP: Guard<UserGroup> =
    Guard::owner_only(BzModule::AccessControl, ResourceOperation::Create, no_resources);
const UPDATE_USER_GROUP: Guard<ModifyUserGroup> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, |g| {
        group_entry(&g.id)
    });
const DELETE_USER_GROUP: Guard<UserGroup> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Delete, |g| {
        group_entry(&g.id)
    });
const LIST_GROUPS: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "id", ResourceType::UserGroup)
});
const LIST_USER_BY_GROUP: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "group_id", ResourceType::UserGroup)
});
const LIST_USER_LINK_GROUPS: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "user_id", ResourceType::User)
});
const GET_USER_GROUP_TOKEN: Guard<Query> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Read, |q| {
        query_entry(q, "id", ResourceType::UserGroup)
    });
const CHANGE_USER_GROUP_TOKEN_STATUS: Guard<UserGroup> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, |g| {
        group_entry(&g.id)
    });
const REFRESH_USER_GROUP_TOKEN: Guard<UserGroup> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, |g| {
        group_entry(&g.id)
    });

fn group_entry(id: &str) -> Vec<ResourceEntry> {
    vec![ResourceEntry::new(ResourceType::UserGroup, id)]
}

/// [`UserGroupServer`] that authorizes every call before reaching `target`.
pub struct UserGroupServerWithAuth {
    enforcer: AccessEnforcer,
    target: Arc<dyn UserGroupServer>,
}

impl UserGroupServerWithAuth {
    #[must_use]
    pub fn new(enforcer: AccessEnforcer, target: Arc<dyn UserGroupServer>) -> Self {
        Self { enforcer, target }
    }
}

#[async_trait]
impl UserGroupServer for UserGroupServerWithAuth {
    async fn create_user_group(&self, ctx: RequestContext, group: UserGroup) -> Response {
        self.enforcer
            .enforce(ctx, group, &CREATE_USER_GROUP, |ctx, group| {
                self.target.create_user_group(ctx, group)
            })
            .await
    }

    async fn update_user_group(&self, ctx: RequestContext, group: ModifyUserGroup) -> Response {
        self.enforcer
            .enforce(ctx, group, &UPDATE_USER_GROUP, |ctx, group| {
                self.target.update_user_group(ctx, group)
            })
            .await
    }

    async fn delete_user_group(&self, ctx: RequestContext, group: UserGroup) -> Response {
        self.enforcer
            .enforce(ctx, group, &DELETE_USER_GROUP, |ctx, group| {
                self.target.delete_user_group(ctx, group)
            })
            .await
    }

    async fn list_groups(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &LIST_GROUPS, |ctx, query| {
                self.target.list_groups(ctx, query)
            })
            .await
    }

    async fn list_user_by_group(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &LIST_USER_BY_GROUP, |ctx, query| {
                self.target.list_user_by_group(ctx, query)
            })
            .await
    }

    async fn list_user_link_groups(
        &self,
        ctx: RequestContext,
        query: Query,
    ) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &LIST_USER_LINK_GROUPS, |ctx, query| {
                self.target.list_user_link_groups(ctx, query)
            })
            .await
    }

    async fn get_user_group_token(&self, ctx: RequestContext, query: Query) -> Response {
        self.enforcer
            .enforce(ctx, query, &GET_USER_GROUP_TOKEN, |ctx, query| {
                self.target.get_user_group_token(ctx, query)
            })
            .await
    }

    async fn change_user_group_token_status(
        &self,
        ctx: RequestContext,
        group: UserGroup,
    ) -> Response {
        self.enforcer
            .enforce(ctx, group, &CHANGE_USER_GROUP_TOKEN_STATUS, |ctx, group| {
                self.target.change_user_group_token_status(ctx, group)
            })
            .await
    }

    async fn refresh_user_group_token(&self, ctx: RequestContext, group: UserGroup) -> Response {
        self.enforcer
            .enforce(ctx, group, &REFRESH_USER_GROUP_TOKEN, |ctx, group| {
                self.target.refresh_user_group_token(ctx, group)
            })
            .await
    }
}
