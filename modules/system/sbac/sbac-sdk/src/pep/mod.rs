//! PEP (Policy Enforcement Point) helpers.
//!
//! Building blocks for authorizing decorators:
//! - [`guard::Guard`]: static per-method descriptor (module, operation, mode, resource collector)
//! - [`enforcer::AccessEnforcer`]: runs the check and forwards or rejects the call

pub mod enforcer;
pub mod guard;

pub use enforcer::AccessEnforcer;
pub use guard::{Guard, no_resources, query_entry};
