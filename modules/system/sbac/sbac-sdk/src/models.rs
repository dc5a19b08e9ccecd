//! Domain models for the SBAC module.
//!
//! A principal (user or user group) is bound to resources through
//! [`AuthStrategy`] records. Every protected object is addressed by a
//! [`ResourceEntry`]; strategies reference resources through [`ResourceRef`],
//! which may carry a wildcard id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resource id matching every resource of a type.
pub const WILDCARD_ID: &str = "*";

/// Suffix of a scoped wildcard id (`"<scope>/*"`).
const SCOPED_WILDCARD_SUFFIX: &str = "/*";

/// Kind of protected object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
    Namespace,
    Service,
    ConfigGroup,
    User,
    UserGroup,
    AuthStrategy,
    RoutingRule,
}

impl ResourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Namespace => "Namespace",
            Self::Service => "Service",
            Self::ConfigGroup => "ConfigGroup",
            Self::User => "User",
            Self::UserGroup => "UserGroup",
            Self::AuthStrategy => "AuthStrategy",
            Self::RoutingRule => "RoutingRule",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single concrete resource touched by a request.
///
/// Also serves as the key of the ownership attachment cache; its display
/// form is `"<resourceType>:<resourceId>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub resource_type: ResourceType,
    pub id: String,
}

impl ResourceEntry {
    #[must_use]
    pub fn new(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            resource_type,
            id: id.into(),
        }
    }

    /// Service entries are addressed as `"<namespace>/<service>"`.
    #[must_use]
    pub fn service(namespace: &str, service: &str) -> Self {
        Self::new(ResourceType::Service, format!("{namespace}/{service}"))
    }
}

impl fmt::Display for ResourceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}

/// Resource reference held by a strategy.
///
/// The id is either a concrete id, [`WILDCARD_ID`] (every resource of the
/// type) or a scoped wildcard `"<scope>/*"` (every resource whose id lives
/// under `<scope>/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: ResourceType,
    pub id: String,
}

impl ResourceRef {
    #[must_use]
    pub fn new(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            resource_type,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn all(resource_type: ResourceType) -> Self {
        Self::new(resource_type, WILDCARD_ID)
    }

    /// Returns `true` if this reference designates `entry`.
    #[must_use]
    pub fn matches(&self, entry: &ResourceEntry) -> bool {
        if self.resource_type != entry.resource_type {
            return false;
        }
        if self.id == WILDCARD_ID || self.id == entry.id {
            return true;
        }
        self.id
            .strip_suffix(SCOPED_WILDCARD_SUFFIX)
            .and_then(|scope| entry.id.strip_prefix(scope))
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl From<ResourceEntry> for ResourceRef {
    fn from(entry: ResourceEntry) -> Self {
        Self {
            resource_type: entry.resource_type,
            id: entry.id,
        }
    }
}

/// Principal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    User,
    Group,
}

/// Reference to a user or a user group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalRef {
    pub kind: PrincipalKind,
    pub id: String,
}

impl PrincipalRef {
    #[must_use]
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: PrincipalKind::User,
            id: id.into(),
        }
    }

    #[must_use]
    pub fn group(id: impl Into<String>) -> Self {
        Self {
            kind: PrincipalKind::Group,
            id: id.into(),
        }
    }
}

impl fmt::Display for PrincipalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PrincipalKind::User => write!(f, "user:{}", self.id),
            PrincipalKind::Group => write!(f, "group:{}", self.id),
        }
    }
}

/// A resolved caller identity.
///
/// Users list the groups they belong to in `groups`; groups list their
/// member users in `members`. Groups never contain groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub kind: PrincipalKind,
    /// Tenant's primary administrator account.
    #[serde(default)]
    pub owner: bool,
    /// Owning account for sub-accounts and groups.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    pub token_enabled: bool,
}

impl Principal {
    #[must_use]
    pub fn reference(&self) -> PrincipalRef {
        PrincipalRef {
            kind: self.kind,
            id: self.id.clone(),
        }
    }

    /// The principal itself followed by every group it inherits strategies from.
    #[must_use]
    pub fn subjects(&self) -> Vec<PrincipalRef> {
        let mut subjects = Vec::with_capacity(1 + self.groups.len());
        subjects.push(self.reference());
        if self.kind == PrincipalKind::User {
            subjects.extend(self.groups.iter().map(PrincipalRef::group));
        }
        subjects
    }
}

/// Action granted by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyAction {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl StrategyAction {
    #[must_use]
    pub const fn allows_write(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// Named binding of principals to resources and an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStrategy {
    pub id: String,
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Auto-created owner strategy: also covers every resource owned by one
    /// of its principals.
    #[serde(default, rename = "default")]
    pub default_strategy: bool,
    #[serde(default)]
    pub principals: Vec<PrincipalRef>,
    #[serde(default)]
    pub resources: Vec<ResourceRef>,
    #[serde(default)]
    pub action: StrategyAction,
}

const fn enabled_by_default() -> bool {
    true
}

impl AuthStrategy {
    #[must_use]
    pub fn binds(&self, principal: &PrincipalRef) -> bool {
        self.principals.iter().any(|p| p == principal)
    }

    /// Coverage through resource references only (no ownership).
    #[must_use]
    pub fn explicitly_covers(&self, entry: &ResourceEntry) -> bool {
        self.resources.iter().any(|r| r.matches(entry))
    }
}

/// Business domain a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BzModule {
    /// Service discovery and service governance.
    Naming,
    Configuration,
    #[default]
    AccessControl,
}

impl fmt::Display for BzModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Naming => "naming",
            Self::Configuration => "configuration",
            Self::AccessControl => "access_control",
        })
    }
}

/// Operation kind. `Read` covers get and list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceOperation {
    Create,
    Modify,
    Delete,
    #[default]
    Read,
}

impl fmt::Display for ResourceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
            Self::Read => "read",
        })
    }
}

/// Evaluation mode requested by a decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Read/list: any enabled strategy touching the requested resources.
    Advisory,
    /// Mutations: one enabled read-write strategy covering every resource.
    Strict,
    /// [`CheckMode::Strict`] restricted to owner accounts.
    StrictOwner,
}

impl CheckMode {
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict | Self::StrictOwner)
    }

    #[must_use]
    pub const fn requires_owner(self) -> bool {
        matches!(self, Self::StrictOwner)
    }
}

/// Ownership of a resource as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub resource: ResourceEntry,
    /// `None` when the store does not know the resource.
    pub owner: Option<PrincipalRef>,
}

/// Why a permission check denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum DenyReason {
    NoStrategies,
    AllStrategiesDisabled,
    NoReadWriteStrategy,
    NotCovered { resources: Vec<ResourceEntry> },
    OwnerRequired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStrategies => f.write_str("principal holds no strategy"),
            Self::AllStrategiesDisabled => f.write_str("every strategy of the principal is disabled"),
            Self::NoReadWriteStrategy => f.write_str("principal holds no read-write strategy"),
            Self::NotCovered { resources } => {
                f.write_str("no strategy covers ")?;
                for (i, entry) in resources.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{entry}")?;
                }
                Ok(())
            }
            Self::OwnerRequired => f.write_str("operation requires an owner account"),
        }
    }
}

/// Outcome of a permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}
