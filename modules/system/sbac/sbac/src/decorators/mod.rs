//! Authorizing decorators for the protected business servers.
//!
//! Each decorator implements the same server trait as its target. Every
//! method declares a static [`Guard`](sbac_sdk::pep::Guard) and delegates to
//! [`AccessEnforcer::enforce`](sbac_sdk::pep::AccessEnforcer::enforce), which
//! forwards to the target only when the caller is authorized.

pub mod group_server;
pub mod routing_server;
pub mod strategy_server;
pub mod user_server;

pub use group_server::UserGroupServerWithAuth;
pub use routing_server::RoutingConfigServerWithAuth;
pub use strategy_server::StrategyServerWithAuth;
pub use user_server::UserServerWithAuth;
