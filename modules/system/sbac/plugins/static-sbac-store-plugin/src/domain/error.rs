use sbac_sdk::PrincipalRef;

/// Configuration rejected while building a store snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("principal '{0}' is declared more than once")]
    DuplicatePrincipal(String),

    #[error("strategy '{0}' is declared more than once")]
    DuplicateStrategy(String),

    #[error("a token is bound to both '{first}' and '{second}'")]
    DuplicateToken { first: String, second: String },

    #[error("{context} references unknown principal {principal}")]
    UnknownPrincipal {
        context: String,
        principal: PrincipalRef,
    },

    #[error("principal '{0}' declares memberships not allowed for its kind")]
    InvalidMembership(String),
}
