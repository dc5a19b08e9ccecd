//! SBAC engine module wiring.

use std::sync::Arc;

use sbac_sdk::pep::AccessEnforcer;
use sbac_sdk::{
    RoutingConfigServer, SbacGatewayClient, SbacStorePluginClient, StrategyServer,
    UserGroupServer, UserServer,
};
use tracing::info;

use crate::config::SbacConfig;
use crate::decorators::{
    RoutingConfigServerWithAuth, StrategyServerWithAuth, UserGroupServerWithAuth,
    UserServerWithAuth,
};
use crate::domain::{SbacLocalClient, Service};

/// SBAC engine module.
///
/// Owns the engine service, exposes it as a [`SbacGatewayClient`] and wraps
/// business servers with their authorizing decorators.
///
/// ```ignore
/// let sbac = SbacModule::init(&raw_config, store)?;
/// let users: Arc<dyn UserServer> = sbac.protect_users(users_impl);
/// ```
pub struct SbacModule {
    client: Arc<dyn SbacGatewayClient>,
}

impl SbacModule {
    /// Build the module from its raw configuration section and a store plugin.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not deserialize into [`SbacConfig`].
    #[tracing::instrument(skip_all, fields(strategy_check_enabled))]
    pub fn init(
        raw_config: &serde_json::Value,
        store: Arc<dyn SbacStorePluginClient>,
    ) -> anyhow::Result<Self> {
        let cfg: SbacConfig = if raw_config.is_null() {
            SbacConfig::default()
        } else {
            serde_json::from_value(raw_config.clone())?
        };
        tracing::Span::current().record("strategy_check_enabled", cfg.strategy_check_enabled);
        info!(
            strategy_check_enabled = cfg.strategy_check_enabled,
            max_token_length = cfg.max_token_length,
            "Initializing sbac engine"
        );

        Ok(Self::with_config(&cfg, store))
    }

    #[must_use]
    pub fn with_config(cfg: &SbacConfig, store: Arc<dyn SbacStorePluginClient>) -> Self {
        let svc = Arc::new(Service::new(store, cfg));
        Self {
            client: Arc::new(SbacLocalClient::new(svc)),
        }
    }

    #[must_use]
    pub fn client(&self) -> Arc<dyn SbacGatewayClient> {
        self.client.clone()
    }

    fn enforcer(&self) -> AccessEnforcer {
        AccessEnforcer::new(self.client.clone())
    }

    #[must_use]
    pub fn protect_users(&self, target: Arc<dyn UserServer>) -> Arc<dyn UserServer> {
        Arc::new(UserServerWithAuth::new(self.enforcer(), target))
    }

    #[must_use]
    pub fn protect_user_groups(
        &self,
        target: Arc<dyn UserGroupServer>,
    ) -> Arc<dyn UserGroupServer> {
        Arc::new(UserGroupServerWithAuth::new(self.enforcer(), target))
    }

    #[must_use]
    pub fn protect_strategies(&self, target: Arc<dyn StrategyServer>) -> Arc<dyn StrategyServer> {
        Arc::new(StrategyServerWithAuth::new(self.enforcer(), target))
    }

    #[must_use]
    pub fn protect_routing(
        &self,
        target: Arc<dyn RoutingConfigServer>,
    ) -> Arc<dyn RoutingConfigServer> {
        Arc::new(RoutingConfigServerWithAuth::new(self.enforcer(), target))
    }
}
