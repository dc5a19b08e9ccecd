//! Error types for the SBAC module.

use crate::models::DenyReason;
use crate::response::Code;

/// Errors returned by [`crate::SbacGatewayClient`] and the store plugin API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SbacError {
    /// The caller's token is missing, malformed, unknown or disabled.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The principal was resolved but is not permitted to perform the operation.
    #[error("access denied: {0}")]
    Denied(DenyReason),

    /// The backing store failed to answer a lookup.
    #[error("store lookup failed: {0}")]
    Lookup(String),

    /// The caller's request was cancelled while a lookup was in flight.
    #[error("request cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl SbacError {
    /// Response code reported to the caller for this error.
    #[must_use]
    pub const fn code(&self) -> Code {
        match self {
            Self::Unauthenticated(_) | Self::Denied(_) => Code::NotAllowedAccess,
            Self::Lookup(_) => Code::StoreLayerException,
            Self::Cancelled => Code::Cancelled,
            Self::Internal(_) => Code::ExecuteException,
        }
    }
}
