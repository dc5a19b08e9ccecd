//! Static SBAC store plugin module.

use std::sync::{Arc, OnceLock};

use sbac_sdk::SbacStorePluginClient;
use tracing::info;

use crate::config::StaticSbacStoreConfig;
use crate::domain::Service;

/// Static SBAC store plugin module.
///
/// Serves principals, strategies and ownership from YAML configuration.
/// Intended for development, testing and small single-tenant deployments.
pub struct StaticSbacStorePlugin {
    service: OnceLock<Arc<Service>>,
}

impl Default for StaticSbacStorePlugin {
    fn default() -> Self {
        Self {
            service: OnceLock::new(),
        }
    }
}

impl StaticSbacStorePlugin {
    pub const MODULE_NAME: &'static str = "static-sbac-store-plugin";

    /// Build the store and return it as a plugin client.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is inconsistent or the module is already initialized.
    pub fn init(
        &self,
        cfg: &StaticSbacStoreConfig,
    ) -> anyhow::Result<Arc<dyn SbacStorePluginClient>> {
        info!("Initializing {} module", Self::MODULE_NAME);
        info!(
            principal_count = cfg.principals.len(),
            strategy_count = cfg.strategies.len(),
            ownership_count = cfg.ownership.len(),
            "Loaded plugin configuration"
        );

        let service = Arc::new(Service::from_config(cfg)?);
        self.service
            .set(service.clone())
            .map_err(|_| anyhow::anyhow!("{} module already initialized", Self::MODULE_NAME))?;

        let api: Arc<dyn SbacStorePluginClient> = service;
        info!("{} module initialized successfully", Self::MODULE_NAME);
        Ok(api)
    }

    /// Swap in a new configuration.
    ///
    /// # Errors
    ///
    /// Fails if the module is not initialized or the configuration is
    /// inconsistent; in the latter case the previous state keeps being served.
    pub fn reload(&self, cfg: &StaticSbacStoreConfig) -> anyhow::Result<()> {
        let service = self
            .service
            .get()
            .ok_or_else(|| anyhow::anyhow!("{} module not initialized", Self::MODULE_NAME))?;
        service.reload(cfg).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected sbac store configuration, keeping previous state");
        })?;
        info!("{} configuration reloaded", Self::MODULE_NAME);
        Ok(())
    }
}
