//! Explicit request-scoped context passed to every protected operation.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;

use crate::context::AcquireContext;
use crate::error::SbacError;

/// Caller context travelling alongside each request payload.
///
/// Carries the caller token, the caller's cancellation signal and, once
/// authorization succeeded, the [`AcquireContext`] built for the call so
/// the business server can reuse the ownership lookups cached in it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: Option<SecretString>,
    cancellation: CancellationToken,
    acquire: Option<AcquireContext>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    #[must_use]
    pub fn with_acquire_context(mut self, acquire: AcquireContext) -> Self {
        self.acquire = Some(acquire);
        self
    }

    /// The caller token, or `None` if absent or blank.
    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.token
            .as_ref()
            .filter(|t| !t.expose_secret().trim().is_empty())
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Authorization context attached by the access enforcer.
    #[must_use]
    pub fn acquire_context(&self) -> Option<&AcquireContext> {
        self.acquire.as_ref()
    }

    pub fn acquire_context_mut(&mut self) -> Option<&mut AcquireContext> {
        self.acquire.as_mut()
    }
}

/// Run `fut` until it completes or `token` is cancelled.
///
/// # Errors
///
/// Returns [`SbacError::Cancelled`] if the token fires first, otherwise the
/// future's own result.
pub async fn with_cancellation<T, F>(token: &CancellationToken, fut: F) -> Result<T, SbacError>
where
    F: Future<Output = Result<T, SbacError>>,
{
    token
        .run_until_cancelled(fut)
        .await
        .unwrap_or(Err(SbacError::Cancelled))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_missing() {
        assert!(RequestContext::new().token().is_none());
        assert!(RequestContext::new().with_token("   ").token().is_none());
        assert!(RequestContext::new().with_token("tok").token().is_some());
    }

    #[tokio::test]
    async fn completed_future_passes_through() {
        let token = CancellationToken::new();
        let out = with_cancellation(&token, async { Ok::<_, SbacError>(7) }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn cancelled_token_aborts_pending_future() {
        let token = CancellationToken::new();
        token.cancel();
        let out: Result<(), SbacError> =
            with_cancellation(&token, std::future::pending()).await;
        assert_eq!(out, Err(SbacError::Cancelled));
    }
}
