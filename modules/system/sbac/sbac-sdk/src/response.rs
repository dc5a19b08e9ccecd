//! Response shapes returned by protected operations.
//!
//! Three shapes exist: single-object [`Response`], batch-write
//! [`BatchWriteResponse`] and batch-query [`BatchQueryResponse`]. The
//! [`Rejection`] trait tells the access enforcer how to build each shape
//! when a call is refused.

use serde::{Deserialize, Serialize};

use crate::error::SbacError;
use crate::servers::{
    ModifyStrategyRequest, ModifyUserGroup, Query, RoutingConfig, StrategyRequest, User,
    UserGroup,
};

/// Outcome code carried by every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Code {
    #[default]
    ExecuteSuccess,
    NotAllowedAccess,
    Cancelled,
    ExecuteException,
    StoreLayerException,
}

impl Code {
    /// Numeric wire value.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::ExecuteSuccess => 200_000,
            Self::NotAllowedAccess => 401_000,
            Self::Cancelled => 499_000,
            Self::ExecuteException => 500_000,
            Self::StoreLayerException => 500_001,
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::ExecuteSuccess)
    }
}

/// Request or result object carried in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    User(User),
    UserGroup(UserGroup),
    ModifyUserGroup(ModifyUserGroup),
    Strategy(StrategyRequest),
    ModifyStrategy(ModifyStrategyRequest),
    Routing(RoutingConfig),
}

/// Request payloads that can be echoed back in a denial.
pub trait Echo {
    /// The payload to echo, or `None` when the response schema carries none.
    fn echo(self) -> Option<Payload>;
}

macro_rules! echo_as {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl Echo for $ty {
                fn echo(self) -> Option<Payload> {
                    Some(Payload::$variant(self))
                }
            }
        )+
    };
}

echo_as! {
    User => User,
    UserGroup => UserGroup,
    ModifyUserGroup => ModifyUserGroup,
    StrategyRequest => Strategy,
    ModifyStrategyRequest => ModifyStrategy,
    RoutingConfig => Routing,
}

impl Echo for Query {
    fn echo(self) -> Option<Payload> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub code: Code,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub payload: Option<Payload>,
}

impl Response {
    #[must_use]
    pub fn new(code: Code) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn success(payload: Payload) -> Self {
        Self {
            code: Code::ExecuteSuccess,
            info: String::new(),
            payload: Some(payload),
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Option<Payload>) -> Self {
        self.payload = payload;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWriteResponse {
    pub code: Code,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub responses: Vec<Response>,
}

impl BatchWriteResponse {
    #[must_use]
    pub fn new(code: Code) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Append a per-item response; the first failing item sets the batch code.
    pub fn collect(&mut self, response: Response) {
        if self.code.is_success() && !response.code.is_success() {
            self.code = response.code;
            self.info.clone_from(&response.info);
        }
        self.responses.push(response);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchQueryResponse {
    pub code: Code,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub amount: usize,
    #[serde(default)]
    pub results: Vec<Payload>,
}

impl BatchQueryResponse {
    #[must_use]
    pub fn new(code: Code) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_results(results: Vec<Payload>) -> Self {
        Self {
            code: Code::ExecuteSuccess,
            info: String::new(),
            amount: results.len(),
            results,
        }
    }

    #[must_use]
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }
}

/// How a response shape reports a refused call for request type `Req`.
pub trait Rejection<Req>: Sized {
    /// The call carried no token; nothing was evaluated.
    fn missing_token() -> Self;

    /// The call was refused or failed during authorization.
    fn rejected(err: &SbacError, req: Req) -> Self;
}

impl<Req: Echo> Rejection<Req> for Response {
    fn missing_token() -> Self {
        Response::new(Code::NotAllowedAccess).with_info("missing token")
    }

    fn rejected(err: &SbacError, req: Req) -> Self {
        Response::new(err.code())
            .with_info(err.to_string())
            .with_payload(req.echo())
    }
}

impl<T: Echo> Rejection<Vec<T>> for BatchWriteResponse {
    fn missing_token() -> Self {
        let mut resp = BatchWriteResponse::new(Code::NotAllowedAccess);
        resp.info = "missing token".to_owned();
        resp
    }

    fn rejected(err: &SbacError, req: Vec<T>) -> Self {
        let mut resp = BatchWriteResponse::new(Code::ExecuteSuccess);
        for item in req {
            resp.collect(
                Response::new(err.code())
                    .with_info(err.to_string())
                    .with_payload(item.echo()),
            );
        }
        if resp.responses.is_empty() {
            resp.code = err.code();
            resp.info = err.to_string();
        }
        resp
    }
}

impl Rejection<Query> for BatchQueryResponse {
    fn missing_token() -> Self {
        BatchQueryResponse::new(Code::NotAllowedAccess).with_info("missing token")
    }

    fn rejected(err: &SbacError, _req: Query) -> Self {
        BatchQueryResponse::new(err.code()).with_info(err.to_string())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::models::DenyReason;

    fn user(id: &str) -> User {
        User {
            id: id.to_owned(),
            name: format!("name-{id}"),
            ..User::default()
        }
    }

    #[test]
    fn batch_code_follows_first_failure() {
        let mut resp = BatchWriteResponse::new(Code::ExecuteSuccess);
        resp.collect(Response::new(Code::ExecuteSuccess));
        resp.collect(Response::new(Code::NotAllowedAccess).with_info("first"));
        resp.collect(Response::new(Code::StoreLayerException).with_info("second"));

        assert_eq!(resp.code, Code::NotAllowedAccess);
        assert_eq!(resp.info, "first");
        assert_eq!(resp.responses.len(), 3);
    }

    #[test]
    fn batch_rejection_echoes_every_item() {
        let err = SbacError::Denied(DenyReason::NoStrategies);
        let resp = <BatchWriteResponse as Rejection<Vec<User>>>::rejected(
            &err,
            vec![user("u-1"), user("u-2")],
        );

        assert_eq!(resp.code, Code::NotAllowedAccess);
        let echoed: Vec<_> = resp.responses.iter().map(|r| r.payload.clone()).collect();
        assert_eq!(
            echoed,
            vec![
                Some(Payload::User(user("u-1"))),
                Some(Payload::User(user("u-2")))
            ]
        );
    }

    #[test]
    fn empty_batch_rejection_still_reports_code() {
        let err = SbacError::Lookup("down".to_owned());
        let resp = <BatchWriteResponse as Rejection<Vec<User>>>::rejected(&err, Vec::new());

        assert_eq!(resp.code, Code::StoreLayerException);
        assert!(resp.responses.is_empty());
    }

    #[test]
    fn query_rejection_has_message_and_no_results() {
        let err = SbacError::Denied(DenyReason::AllStrategiesDisabled);
        let resp = <BatchQueryResponse as Rejection<Query>>::rejected(&err, Query::new());

        assert_eq!(resp.code, Code::NotAllowedAccess);
        assert!(resp.info.contains("disabled"));
        assert!(resp.results.is_empty());
        assert_eq!(resp.amount, 0);
    }

    #[test]
    fn single_rejection_echoes_request() {
        let err = SbacError::Denied(DenyReason::OwnerRequired);
        let resp = <Response as Rejection<User>>::rejected(&err, user("u-9"));

        assert_eq!(resp.payload, Some(Payload::User(user("u-9"))));
        assert_eq!(resp.code.value(), 401_000);
    }

    #[test]
    fn missing_token_responses_carry_no_payload() {
        let single = <Response as Rejection<User>>::missing_token();
        let batch = <BatchWriteResponse as Rejection<Vec<User>>>::missing_token();

        assert_eq!(single.payload, None);
        assert!(batch.responses.is_empty());
        assert_eq!(batch.code, Code::NotAllowedAccess);
    }
}
