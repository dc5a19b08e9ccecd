//! Domain layer for the SBAC engine.

pub mod error;
pub mod evaluator;
pub mod identity;
pub mod local_client;
pub mod service;

pub use error::DomainError;
pub use evaluator::PermissionEvaluator;
pub use identity::IdentityResolver;
pub use local_client::SbacLocalClient;
pub use service::Service;
