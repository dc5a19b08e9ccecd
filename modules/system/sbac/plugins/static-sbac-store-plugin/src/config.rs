use sbac_sdk::{AuthStrategy, PrincipalKind, PrincipalRef, ResourceType};
use secrecy::SecretString;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticSbacStoreConfig {
    /// Users and user groups known to the store.
    pub principals: Vec<PrincipalConfig>,

    /// Strategies binding principals to resources.
    pub strategies: Vec<AuthStrategy>,

    /// Resource ownership consulted by default strategies.
    pub ownership: Vec<OwnershipConfig>,
}

impl StaticSbacStoreConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid configuration.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_saphyr::from_str(yaml)?)
    }
}

/// A single user or user group.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalConfig {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub kind: PrincipalKind,

    /// Tenant's primary administrator.
    #[serde(default)]
    pub owner: bool,

    /// Owning account for sub-accounts and groups.
    #[serde(default)]
    pub owner_id: Option<String>,

    /// Groups a user belongs to. Must be empty for groups.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Users a group contains. Must be empty for users.
    #[serde(default)]
    pub members: Vec<String>,

    /// Tokens bound to this principal.
    #[serde(default)]
    pub tokens: Vec<SecretString>,

    #[serde(default = "enabled_by_default")]
    pub token_enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

/// Owner of a single resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnershipConfig {
    pub resource_type: ResourceType,
    pub id: String,
    pub owner: PrincipalRef,
}
