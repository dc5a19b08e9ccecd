//! Per-method authorization descriptors.

use std::fmt;

use crate::models::{BzModule, CheckMode, ResourceEntry, ResourceOperation, ResourceType};
use crate::servers::Query;

/// Static descriptor of how one protected method is authorized.
///
/// `collect` enumerates every resource the request refers to. It only reads
/// ids from the request.
///
/// # Example
///
/// ```ignore
/// const UPDATE_USER: Guard<User> =
///     Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, |u| {
///         vec![ResourceEntry::new(ResourceType::User, u.id.clone())]
///     });
/// ```
pub struct Guard<Req> {
    pub module: BzModule,
    pub operation: ResourceOperation,
    pub mode: CheckMode,
    pub collect: fn(&Req) -> Vec<ResourceEntry>,
}

impl<Req> Guard<Req> {
    #[must_use]
    pub const fn strict(
        module: BzModule,
        operation: ResourceOperation,
        collect: fn(&Req) -> Vec<ResourceEntry>,
    ) -> Self {
        Self {
            module,
            operation,
            mode: CheckMode::Strict,
            collect,
        }
    }

    /// Strict check that additionally requires an owner account.
    #[must_use]
    pub const fn owner_only(
        module: BzModule,
        operation: ResourceOperation,
        collect: fn(&Req) -> Vec<ResourceEntry>,
    ) -> Self {
        Self {
            module,
            operation,
            mode: CheckMode::StrictOwner,
            collect,
        }
    }

    /// Advisory read/list check.
    #[must_use]
    pub const fn advisory(module: BzModule, collect: fn(&Req) -> Vec<ResourceEntry>) -> Self {
        Self {
            module,
            operation: ResourceOperation::Read,
            mode: CheckMode::Advisory,
            collect,
        }
    }
}

impl<Req> fmt::Debug for Guard<Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("module", &self.module)
            .field("operation", &self.operation)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Collector for methods that name no existing resource.
#[must_use]
pub fn no_resources<Req>(_req: &Req) -> Vec<ResourceEntry> {
    Vec::new()
}

/// Single entry built from a query key, or nothing if the key is absent or empty.
#[must_use]
pub fn query_entry(query: &Query, key: &str, resource_type: ResourceType) -> Vec<ResourceEntry> {
    query
        .get(key)
        .filter(|id| !id.is_empty())
        .map(|id| ResourceEntry::new(resource_type, id.clone()))
        .into_iter()
        .collect()
}
