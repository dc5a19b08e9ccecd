//! Client implementation for the static SBAC store plugin.

use async_trait::async_trait;
use sbac_sdk::{
    AuthStrategy, Principal, PrincipalRef, ResourceEntry, SbacError, SbacStorePluginClient,
};

use super::service::Service;

#[async_trait]
impl SbacStorePluginClient for Service {
    async fn resolve_token(&self, token: &str) -> Result<Option<Principal>, SbacError> {
        Ok(self.principal_by_token(token))
    }

    async fn strategies_for(
        &self,
        principal: &PrincipalRef,
    ) -> Result<Vec<AuthStrategy>, SbacError> {
        Ok(Service::strategies_for(self, principal))
    }

    async fn owner_of(&self, entry: &ResourceEntry) -> Result<Option<PrincipalRef>, SbacError> {
        Ok(Service::owner_of(self, entry))
    }
}
