//! Access enforcer shared by every authorizing decorator.
//!
//! [`AccessEnforcer`] encapsulates the whole interception flow:
//! read the caller token → build the [`AcquireContext`] from the method's
//! [`Guard`] → check permission → forward to the target or reject in the
//! method's own response shape.

use std::future::Future;
use std::sync::Arc;

use crate::api::SbacGatewayClient;
use crate::context::AcquireContext;
use crate::error::SbacError;
use crate::pep::guard::Guard;
use crate::request::RequestContext;
use crate::response::Rejection;

/// Policy Enforcement Point for SBAC-protected servers.
///
/// Constructed once per wrapped server; cheap to clone (`Arc` inside).
///
/// # Example
///
/// ```ignore
/// let enforcer = AccessEnforcer::new(sbac.clone());
///
/// enforcer
///     .enforce(ctx, user, &UPDATE_USER, |ctx, user| target.update_user(ctx, user))
///     .await
/// ```
#[derive(Clone)]
pub struct AccessEnforcer {
    sbac: Arc<dyn SbacGatewayClient>,
}

impl AccessEnforcer {
    #[must_use]
    pub fn new(sbac: Arc<dyn SbacGatewayClient>) -> Self {
        Self { sbac }
    }

    /// Build the acquire context for `req` as described by `guard`.
    ///
    /// # Errors
    ///
    /// [`SbacError::Unauthenticated`] if `ctx` carries no token.
    pub fn build_context<Req>(
        &self,
        ctx: &RequestContext,
        req: &Req,
        guard: &Guard<Req>,
    ) -> Result<AcquireContext, SbacError> {
        let token = ctx
            .token()
            .cloned()
            .ok_or_else(|| SbacError::Unauthenticated("missing token".to_owned()))?;

        AcquireContext::builder()
            .token(token)
            .module(guard.module)
            .operation(guard.operation)
            .cancellation(ctx.cancellation().clone())
            .resources((guard.collect)(req))
            .build()
    }

    /// Build the acquire context and check it.
    ///
    /// Returns the evaluated context, with the ownership lookups made during
    /// evaluation cached in its attachment.
    ///
    /// # Errors
    ///
    /// Any [`SbacError`] from context construction or the permission check.
    pub async fn authorize<Req: Sync>(
        &self,
        ctx: &RequestContext,
        req: &Req,
        guard: &Guard<Req>,
    ) -> Result<AcquireContext, SbacError> {
        let mut acquire = self.build_context(ctx, req, guard)?;
        let principal = self.sbac.check_permission(&mut acquire, guard.mode).await?;
        tracing::debug!(
            module = %guard.module,
            operation = %guard.operation,
            principal = %principal.reference(),
            "call authorized"
        );
        Ok(acquire)
    }

    /// Authorize `req` and forward it, or reject it without calling `forward`.
    ///
    /// A call without a token is rejected before any context is built.
    pub async fn enforce<Req, Resp, F, Fut>(
        &self,
        ctx: RequestContext,
        req: Req,
        guard: &Guard<Req>,
        forward: F,
    ) -> Resp
    where
        Req: Send + Sync,
        Resp: Rejection<Req>,
        F: FnOnce(RequestContext, Req) -> Fut + Send,
        Fut: Future<Output = Resp> + Send,
    {
        if ctx.token().is_none() {
            tracing::debug!(
                module = %guard.module,
                operation = %guard.operation,
                "rejecting call without token"
            );
            return Resp::missing_token();
        }

        match self.authorize(&ctx, &req, guard).await {
            Ok(acquire) => forward(ctx.with_acquire_context(acquire), req).await,
            Err(err) => {
                match &err {
                    SbacError::Lookup(_) | SbacError::Internal(_) => tracing::error!(
                        module = %guard.module,
                        operation = %guard.operation,
                        error = %err,
                        "authorization failed"
                    ),
                    _ => tracing::debug!(
                        module = %guard.module,
                        operation = %guard.operation,
                        error = %err,
                        "call rejected"
                    ),
                }
                Resp::rejected(&err, req)
            }
        }
    }
}

impl std::fmt::Debug for AccessEnforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessEnforcer").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use secrecy::{ExposeSecret, SecretString};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::models::{
        BzModule, CheckMode, DenyReason, Principal, PrincipalKind, ResourceEntry,
        ResourceOperation, ResourceType,
    };
    use crate::response::{Code, Payload, Response};
    use crate::servers::User;

    /// Mock that allows every token equal to `"good"` and records the last mode.
    struct TokenMock {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SbacGatewayClient for TokenMock {
        async fn check_permission(
            &self,
            ctx: &mut AcquireContext,
            _mode: CheckMode,
        ) -> Result<Principal, SbacError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ctx.token().expose_secret() == "good" {
                Ok(principal())
            } else {
                Err(SbacError::Denied(DenyReason::NoStrategies))
            }
        }

        async fn resolve(
            &self,
            _token: &SecretString,
            _cancellation: &CancellationToken,
        ) -> Result<Principal, SbacError> {
            Ok(principal())
        }
    }

    fn principal() -> Principal {
        Principal {
            id: "u-1".to_owned(),
            name: "alice".to_owned(),
            kind: PrincipalKind::User,
            owner: false,
            owner_id: None,
            groups: vec![],
            members: vec![],
            token_enabled: true,
        }
    }

    const UPDATE_USER: Guard<User> =
        Guard::strict(BzModule::AccessControl, ResourceOperation::Modify, |u| {
            vec![ResourceEntry::new(ResourceType::User, u.id.clone())]
        });

    fn user() -> User {
        User {
            id: "u-2".to_owned(),
            name: "bob".to_owned(),
            ..User::default()
        }
    }

    fn enforcer() -> (AccessEnforcer, Arc<TokenMock>) {
        let mock = Arc::new(TokenMock {
            calls: AtomicUsize::new(0),
        });
        (AccessEnforcer::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn missing_token_skips_check_and_target() {
        let (enforcer, mock) = enforcer();
        let forwarded = AtomicUsize::new(0);

        let resp: Response = enforcer
            .enforce(RequestContext::new(), user(), &UPDATE_USER, |_, _| async {
                forwarded.fetch_add(1, Ordering::SeqCst);
                Response::new(Code::ExecuteSuccess)
            })
            .await;

        assert_eq!(resp.code, Code::NotAllowedAccess);
        assert_eq!(resp.payload, None);
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
        assert_eq!(forwarded.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denial_echoes_request() {
        let (enforcer, _) = enforcer();
        let ctx = RequestContext::new().with_token("bad");

        let resp: Response = enforcer
            .enforce(ctx, user(), &UPDATE_USER, |_, _| async {
                Response::new(Code::ExecuteSuccess)
            })
            .await;

        assert_eq!(resp.code, Code::NotAllowedAccess);
        assert_eq!(resp.payload, Some(Payload::User(user())));
    }

    #[tokio::test]
    async fn allowed_call_receives_acquire_context() {
        let (enforcer, _) = enforcer();
        let ctx = RequestContext::new().with_token("good");

        let resp: Response = enforcer
            .enforce(ctx, user(), &UPDATE_USER, |ctx, user| async move {
                let acquire = ctx.acquire_context().unwrap();
                assert_eq!(acquire.operation(), ResourceOperation::Modify);
                assert_eq!(
                    acquire.entries().cloned().collect::<Vec<_>>(),
                    vec![ResourceEntry::new(ResourceType::User, "u-2")]
                );
                Response::success(Payload::User(user))
            })
            .await;

        assert_eq!(resp.code, Code::ExecuteSuccess);
    }

    #[test]
    fn build_context_requires_token() {
        let (enforcer, _) = enforcer();
        let err = enforcer
            .build_context(&RequestContext::new(), &user(), &UPDATE_USER)
            .unwrap_err();
        assert!(matches!(err, SbacError::Unauthenticated(_)));
    }
}
