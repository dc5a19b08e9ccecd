//! User server guarded by SBAC.

use std::sync::Arc;

use async_trait::async_trait;
use sbac_sdk::pep::{AccessEnforcer, Guard, no_resources, query_entry};
use sbac_sdk::{
    BatchQueryResponse, BatchWriteResponse, BzModule, Query, RequestContext, ResourceEntry,
    ResourceOperation, ResourceType, Response, User, UserServer,
};

const CREATE_USERS: Guard<Vec<User>> =
    Guard::owner_only(BzModule::AccessControl, ResourceOperation::Create, no_resources);
const UPDATE_USER: Guard<User> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, user_entry);
const DELETE_USERS: Guard<Vec<User>> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Delete, user_entries);
const LIST_USERS: Guard<Query> = Guard::advisory(BzModule::AccessControl, |q| {
    query_entry(q, "id", ResourceType::User)
});
// Token reads are strict.
const GET_USER_TOKEN: Guard<Query> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Read, |q| {
        query_entry(q, "id", ResourceType::User)
    });
const CHANGE_USER_TOKEN_STATUS: Guard<User> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, user_entry);
const REFRESH_USER_TOKEN: Guard<User> =
    Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, user_entry);

fn user_entry(user: &User) -> Vec<ResourceEntry> {
    vec![ResourceEntry::new(ResourceType::User, user.id.clone())]
}

#[allow(clippy::ptr_arg)]
fn user_entries(users: &Vec<User>) -> Vec<ResourceEntry> {
    users
        .iter()
        .map(|u| ResourceEntry::new(ResourceType::User, u.id.clone()))
        .collect()
}

/// [`UserServer`] that authorizes every call before reaching `target`.
pub struct UserServerWithAuth {
    enforcer: AccessEnforcer,
    target: Arc<dyn UserServer>,
}

impl UserServerWithAuth {
    #[must_use]
    pub fn new(enforcer: AccessEnforcer, target: Arc<dyn UserServer>) -> Self {
        Self { enforcer, target }
    }
}

#[async_trait]
impl UserServer for UserServerWithAuth {
    async fn create_users(&self, ctx: RequestContext, users: Vec<User>) -> BatchWriteResponse {
        self.enforcer
            .enforce(ctx, users, &CREATE_USERS, |ctx, users| {
                self.target.create_users(ctx, users)
            })
            .await
    }

    async fn update_user(&self, ctx: RequestContext, user: User) -> Response {
        self.enforcer
            .enforce(ctx, user, &UPDATE_USER, |ctx, user| {
                self.target.update_user(ctx, user)
            })
            .await
    }

    async fn delete_users(&self, ctx: RequestContext, users: Vec<User>) -> BatchWriteResponse {
        self.enforcer
            .enforce(ctx, users, &DELETE_USERS, |ctx, users| {
                self.target.delete_users(ctx, users)
            })
            .await
    }

    async fn list_users(&self, ctx: RequestContext, query: Query) -> BatchQueryResponse {
        self.enforcer
            .enforce(ctx, query, &LIST_USERS, |ctx, query| {
                self.target.list_users(ctx, query)
            })
            .await
    }

    async fn get_user_token(&self, ctx: RequestContext, query: Query) -> Response {
        self.enforcer
            .enforce(ctx, query, &GET_USER_TOKEN, |ctx, query| {
                self.target.get_user_token(ctx, query)
            })
            .await
    }

    async fn change_user_token_status(&self, ctx: RequestContext, user: User) -> Response {
        self.enforcer
            .enforce(ctx, user, &CHANGE_USER_TOKEN_STATUS, |ctx, user| {
                self.target.change_user_token_status(ctx, user)
            })
            .await
    }

    async fn refresh_user_token(&self, ctx: RequestContext, user: User) -> Response {
        self.enforcer
            .enforce(ctx, user, &REFRESH_USER_TOKEN, |ctx, user| {
                self.target.refresh_user_token(ctx, user)
            })
            .await
    }
}
