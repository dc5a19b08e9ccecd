//! Local (in-process) client for the SBAC engine.

use std::sync::Arc;

use async_trait::async_trait;
use sbac_sdk::{AcquireContext, CheckMode, Principal, SbacError, SbacGatewayClient};
use secrecy::SecretString;
use tokio_util::sync::CancellationToken;

use super::{DomainError, Service};

/// Local client wrapping the engine service.
pub struct SbacLocalClient {
    svc: Arc<Service>,
}

impl SbacLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> SbacError {
    match &e {
        DomainError::Lookup(_) | DomainError::Internal(_) => {
            tracing::error!(operation = op, error = ?e, "sbac call failed");
        }
        _ => tracing::debug!(operation = op, error = %e, "sbac call refused"),
    }
    e.into()
}

#[async_trait]
impl SbacGatewayClient for SbacLocalClient {
    async fn check_permission(
        &self,
        ctx: &mut AcquireContext,
        mode: CheckMode,
    ) -> Result<Principal, SbacError> {
        self.svc
            .check_permission(ctx, mode)
            .await
            .map_err(|e| log_and_convert("check_permission", e))
    }

    async fn resolve(
        &self,
        token: &SecretString,
        cancellation: &CancellationToken,
    ) -> Result<Principal, SbacError> {
        self.svc
            .resolve(token, cancellation)
            .await
            .map_err(|e| log_and_convert("resolve", e))
    }
}
