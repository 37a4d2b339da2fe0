//! Driving port for catalog mutations.

use async_trait::async_trait;

use crate::domain::{Actor, Error, Service, ServiceDraft, ServiceId, ServicePatch};

/// Create, update and delete services under the capability matrix.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCatalogCommand: Send + Sync {
    /// Publish a service owned by the calling vendor.
    async fn create_service(&self, actor: &Actor, draft: ServiceDraft) -> Result<Service, Error>;

    /// Sparse-update a service. Owner or admin only.
    async fn update_service(
        &self,
        actor: &Actor,
        service_id: &ServiceId,
        patch: ServicePatch,
    ) -> Result<Service, Error>;

    /// Delete a service. Owner or admin only.
    async fn delete_service(&self, actor: &Actor, service_id: &ServiceId) -> Result<(), Error>;
}
