//! Domain errors for the SBAC engine.

use sbac_sdk::{DenyReason, PrincipalRef, SbacError};

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("token is missing")]
    MissingToken,

    #[error("token is malformed: {0}")]
    MalformedToken(&'static str),

    #[error("token does not belong to any principal")]
    UnknownToken,

    #[error("token of {0} is disabled")]
    TokenDisabled(PrincipalRef),

    #[error("{principal} denied: {reason}")]
    Denied {
        principal: PrincipalRef,
        reason: DenyReason,
    },

    #[error("request cancelled")]
    Cancelled,

    #[error("store lookup failed: {0}")]
    Lookup(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SbacError> for DomainError {
    fn from(e: SbacError) -> Self {
        match e {
            SbacError::Cancelled => Self::Cancelled,
            SbacError::Lookup(msg) => Self::Lookup(msg),
            SbacError::Unauthenticated(msg) | SbacError::Internal(msg) => Self::Internal(msg),
            SbacError::Denied(reason) => {
                Self::Internal(format!("store reported a denial: {reason}"))
            }
        }
    }
}

impl From<DomainError> for SbacError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::MissingToken
            | DomainError::MalformedToken(_)
            | DomainError::UnknownToken
            | DomainError::TokenDisabled(_) => Self::Unauthenticated(e.to_string()),
            DomainError::Denied { reason, .. } => Self::Denied(reason),
            DomainError::Cancelled => Self::Cancelled,
            DomainError::Lookup(msg) => Self::Lookup(msg),
            DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn identity_failures_become_unauthenticated() {
        let err: SbacError = DomainError::TokenDisabled(PrincipalRef::user("u-1")).into();
        assert_eq!(
            err,
            SbacError::Unauthenticated("token of user:u-1 is disabled".to_owned())
        );
    }

    #[test]
    fn store_errors_keep_their_kind() {
        let lookup: DomainError = SbacError::Lookup("timeout".to_owned()).into();
        assert!(matches!(lookup, DomainError::Lookup(ref m) if m == "timeout"));

        let cancelled: DomainError = SbacError::Cancelled.into();
        assert!(matches!(cancelled, DomainError::Cancelled));
    }
}
