#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sbac::SbacModule;
use sbac_sdk::{
    AuthStrategy, BatchQueryResponse, BatchWriteResponse, Code, ModifyStrategyRequest,
    ModifyUserGroup, Payload, Principal, PrincipalRef, Query, RequestContext, ResourceEntry,
    Response, RoutingConfig, RoutingConfigServer, SbacError, SbacStorePluginClient,
    StrategyRequest, StrategyServer, User, UserGroup, UserGroupServer, UserServer,
};
use static_sbac_store_plugin::StaticSbacStoreConfig;
use static_sbac_store_plugin::domain::Service as StaticStore;

pub const FIXTURE: &str = r#"
principals:
  - id: "root"
    kind: user
    owner: true
    tokens: ["tok-root"]
  - id: "alice"
    kind: user
    owner_id: "root"
    groups: ["ops"]
    tokens: ["tok-alice"]
  - id: "carol"
    kind: user
    owner_id: "root"
    token_enabled: false
    tokens: ["tok-carol"]
  - id: "dave"
    kind: user
    owner_id: "root"
    tokens: ["tok-dave"]
  - id: "ops"
    kind: group
    owner_id: "root"
strategies:
  - id: "s-root"
    name: "root default"
    default: true
    action: read_write
    principals:
      - kind: user
        id: "root"
  - id: "s-ops"
    name: "ops writers"
    action: read_write
    principals:
      - kind: group
        id: "ops"
    resources:
      - resource_type: Service
        id: "*"
      - resource_type: User
        id: "u-ops-1"
  - id: "s-ops-default"
    name: "ops owned resources"
    default: true
    action: read_write
    principals:
      - kind: group
        id: "ops"
  - id: "s-alice-ro"
    name: "alice namespace readers"
    principals:
      - kind: user
        id: "alice"
    resources:
      - resource_type: Namespace
        id: "ns-a"
ownership:
  - resource_type: Service
    id: "prod/svc-1"
    owner:
      kind: user
      id: "root"
  - resource_type: User
    id: "u-ops-2"
    owner:
      kind: group
      id: "ops"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Normal,
    /// Strategy lookups fail.
    Failing,
    /// Strategy lookups never complete.
    Hanging,
}

/// Static store wrapper that counts ownership lookups and can misbehave.
pub struct CountingStore {
    inner: StaticStore,
    mode: StoreMode,
    pub owner_calls: AtomicUsize,
}

impl CountingStore {
    pub fn new(mode: StoreMode) -> Self {
        let cfg = StaticSbacStoreConfig::from_yaml(FIXTURE).unwrap();
        Self {
            inner: StaticStore::from_config(&cfg).unwrap(),
            mode,
            owner_calls: AtomicUsize::new(0),
        }
    }

    pub fn owner_calls(&self) -> usize {
        self.owner_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SbacStorePluginClient for CountingStore {
    async fn resolve_token(&self, token: &str) -> Result<Option<Principal>, SbacError> {
        Ok(self.inner.principal_by_token(token))
    }

    async fn strategies_for(
        &self,
        principal: &PrincipalRef,
    ) -> Result<Vec<AuthStrategy>, SbacError> {
        match self.mode {
            StoreMode::Normal => Ok(self.inner.strategies_for(principal)),
            StoreMode::Failing => Err(SbacError::Lookup("strategy table unavailable".to_owned())),
            StoreMode::Hanging => std::future::pending().await,
        }
    }

    async fn owner_of(&self, entry: &ResourceEntry) -> Result<Option<PrincipalRef>, SbacError> {
        self.owner_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.owner_of(entry))
    }
}

/// Business server stub implementing every protected surface.
///
/// Counts calls and, on routing updates, re-reads ownership of the first
/// routed service through the attached context.
pub struct Recorder {
    store: Arc<CountingStore>,
    pub calls: AtomicUsize,
    pub attachment_sizes: Mutex<Vec<usize>>,
}

impl Recorder {
    pub fn new(store: Arc<CountingStore>) -> Self {
        Self {
            store,
            calls: AtomicUsize::new(0),
            attachment_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn ok(&self, payload: Payload) -> Response {
        self.hit();
        Response::success(payload)
    }

    fn ok_batch<T>(&self, items: Vec<T>, wrap: fn(T) -> Payload) -> BatchWriteResponse {
        self.hit();
        let mut resp = BatchWriteResponse::new(Code::ExecuteSuccess);
        for item in items {
            resp.collect(Response::success(wrap(item)));
        }
        resp
    }

    fn ok_query(&self) -> BatchQueryResponse {
        self.hit();
        BatchQueryResponse::with_results(Vec::new())
    }
}

#[async_trait]
impl UserServer for Recorder {
    async fn create_users(&self, _ctx: RequestContext, users: Vec<User>) -> BatchWriteResponse {
        self.ok_batch(users, Payload::User)
    }

    async fn update_user(&self, _ctx: RequestContext, user: User) -> Response {
        self.ok(Payload::User(user))
    }

    async fn delete_users(&self, _ctx: RequestContext, users: Vec<User>) -> BatchWriteResponse {
        self.ok_batch(users, Payload::User)
    }

    async fn list_users(&self, _ctx: RequestContext, _query: Query) -> BatchQueryResponse {
        self.ok_query()
    }

    async fn get_user_token(&self, _ctx: RequestContext, _query: Query) -> Response {
        self.hit();
        Response::new(Code::ExecuteSuccess)
    }

    async fn change_user_token_status(&self, _ctx: RequestContext, user: User) -> Response {
        self.ok(Payload::User(user))
    }

    async fn refresh_user_token(&self, _ctx: RequestContext, user: User) -> Response {
        self.ok(Payload::User(user))
    }
}

#[async_trait]
impl UserGroupServer for Recorder {
    async fn create_user_group(&self, _ctx: RequestContext, group: UserGroup) -> Response {
        self.ok(Payload::UserGroup(group))
    }

    async fn update_user_group(&self, _ctx: RequestContext, group: ModifyUserGroup) -> Response {
        self.ok(Payload::ModifyUserGroup(group))
    }

    async fn delete_user_group(&self, _ctx: RequestContext, group: UserGroup) -> Response {
        self.ok(Payload::UserGroup(group))
    }

    async fn list_groups(&self, _ctx: RequestContext, _query: Query) -> BatchQueryResponse {
        self.ok_query()
    }

    async fn list_user_by_group(&self, _ctx: RequestContext, _query: Query) -> BatchQueryResponse {
        self.ok_query()
    }

    async fn list_user_link_groups(
        &self,
        _ctx: RequestContext,
        _query: Query,
    ) -> BatchQueryResponse {
        self.ok_query()
    }

    async fn get_user_group_token(&self, _ctx: RequestContext, _query: Query) -> Response {
        self.hit();
        Response::new(Code::ExecuteSuccess)
    }

    async fn change_user_group_token_status(
        &self,
        _ctx: RequestContext,
        group: UserGroup,
    ) -> Response {
        self.ok(Payload::UserGroup(group))
    }

    async fn refresh_user_group_token(&self, _ctx: RequestContext, group: UserGroup) -> Response {
        self.ok(Payload::UserGroup(group))
    }
}

#[async_trait]
impl StrategyServer for Recorder {
    async fn create_strategy(&self, _ctx: RequestContext, strategy: StrategyRequest) -> Response {
        self.ok(Payload::Strategy(strategy))
    }

    async fn update_strategy(
        &self,
        _ctx: RequestContext,
        strategy: ModifyStrategyRequest,
    ) -> Response {
        self.ok(Payload::ModifyStrategy(strategy))
    }

    async fn delete_strategy(&self, _ctx: RequestContext, strategy: StrategyRequest) -> Response {
        self.ok(Payload::Strategy(strategy))
    }

    async fn list_strategy(&self, _ctx: RequestContext, _query: Query) -> BatchQueryResponse {
        self.ok_query()
    }

    async fn list_strategy_by_user_id(
        &self,
        _ctx: RequestContext,
        _query: Query,
    ) -> BatchQueryResponse {
        self.ok_query()
    }

    async fn get_strategy(&self, _ctx: RequestContext, _query: Query) -> Response {
        self.hit();
        Response::new(Code::ExecuteSuccess)
    }
}

#[async_trait]
impl RoutingConfigServer for Recorder {
    async fn create_routing_configs(
        &self,
        _ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse {
        self.ok_batch(routings, Payload::Routing)
    }

    async fn update_routing_configs(
        &self,
        mut ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse {
        if let (Some(acquire), Some(first)) = (ctx.acquire_context_mut(), routings.first()) {
            let entry = ResourceEntry::service(&first.namespace, &first.service);
            acquire
                .resolve_owner(self.store.as_ref(), &entry)
                .await
                .unwrap();
            self.attachment_sizes
                .lock()
                .unwrap()
                .push(acquire.attachment().len());
        }
        self.ok_batch(routings, Payload::Routing)
    }

    async fn delete_routing_configs(
        &self,
        _ctx: RequestContext,
        routings: Vec<RoutingConfig>,
    ) -> BatchWriteResponse {
        self.ok_batch(routings, Payload::Routing)
    }

    async fn get_routing_configs(&self, _ctx: RequestContext, _query: Query) -> BatchQueryResponse {
        self.ok_query()
    }
}

/// Engine, store and recorder wired together.
pub struct Harness {
    pub store: Arc<CountingStore>,
    pub recorder: Arc<Recorder>,
    pub sbac: SbacModule,
}

impl Harness {
    pub fn new(mode: StoreMode) -> Self {
        Self::with_config(mode, &serde_json::Value::Null)
    }

    pub fn with_config(mode: StoreMode, raw: &serde_json::Value) -> Self {
        let store = Arc::new(CountingStore::new(mode));
        let recorder = Arc::new(Recorder::new(store.clone()));
        let sbac = SbacModule::init(raw, store.clone()).unwrap();
        Self {
            store,
            recorder,
            sbac,
        }
    }

    pub fn users(&self) -> Arc<dyn UserServer> {
        self.sbac.protect_users(self.recorder.clone())
    }

    pub fn groups(&self) -> Arc<dyn UserGroupServer> {
        self.sbac.protect_user_groups(self.recorder.clone())
    }

    pub fn strategies(&self) -> Arc<dyn StrategyServer> {
        self.sbac.protect_strategies(self.recorder.clone())
    }

    pub fn routing(&self) -> Arc<dyn RoutingConfigServer> {
        self.sbac.protect_routing(self.recorder.clone())
    }
}

pub fn as_token(token: &str) -> RequestContext {
    RequestContext::new().with_token(token)
}

pub fn user(id: &str) -> User {
    User {
        id: id.to_owned(),
        name: format!("name-{id}"),
        ..User::default()
    }
}

pub fn group(id: &str) -> UserGroup {
    UserGroup {
        id: id.to_owned(),
        name: format!("name-{id}"),
        ..UserGroup::default()
    }
}

pub fn routing(namespace: &str, service: &str) -> RoutingConfig {
    RoutingConfig {
        name: format!("{namespace}-{service}"),
        namespace: namespace.to_owned(),
        service: service.to_owned(),
        ..RoutingConfig::default()
    }
}

pub fn query(pairs: &[(&str, &str)]) -> Query {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}
