#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! SBAC SDK
//!
//! This crate provides the public API for the `sbac` (strategy-based access
//! control) module:
//!
//! - [`SbacGatewayClient`] - Public API trait for consumers (identity + permission check)
//! - [`SbacStorePluginClient`] - Plugin API trait for principal/strategy stores
//! - [`AcquireContext`] - Per-request authorization context
//! - [`ResourceEntry`], [`ResourceRef`], [`AuthStrategy`], [`Principal`] - Resource model
//! - [`RequestContext`] - Explicit request-scoped context carrying the caller token
//! - [`Response`], [`BatchWriteResponse`], [`BatchQueryResponse`] - Response shapes
//! - [`pep`] - PEP helpers (guards, enforcer)
//!
//! ## Usage
//!
//! ```ignore
//! use sbac_sdk::pep::{AccessEnforcer, Guard};
//!
//! const DELETE_USERS: Guard<Vec<User>> =
//!     Guard::strict(BzModule::AccessControl, ResourceOperation::Delete, collect_users);
//!
//! let enforcer = AccessEnforcer::new(sbac_client);
//! let resp = enforcer
//!     .enforce(ctx, users, &DELETE_USERS, |ctx, users| target.delete_users(ctx, users))
//!     .await;
//! ```

pub mod api;
pub mod context;
pub mod error;
pub mod models;
pub mod pep;
pub mod plugin_api;
pub mod request;
pub mod response;
pub mod servers;

// Re-export main types at crate root
pub use api::SbacGatewayClient;
pub use context::{AcquireContext, AcquireContextBuilder, Attachment};
pub use error::SbacError;
pub use models::{
    AuthStrategy, BzModule, CheckMode, Decision, DenyReason, OwnershipRecord, Principal,
    PrincipalKind, PrincipalRef, ResourceEntry, ResourceOperation, ResourceRef, ResourceType,
    StrategyAction,
};
pub use plugin_api::SbacStorePluginClient;
pub use request::RequestContext;
pub use response::{
    BatchQueryResponse, BatchWriteResponse, Code, Echo, Payload, Rejection, Response,
};
pub use servers::{
    ModifyStrategyRequest, ModifyUserGroup, Query, RoutingConfig, RoutingConfigServer,
    StrategyRequest, StrategyServer, User, UserGroup, UserGroupServer, UserServer,
};
