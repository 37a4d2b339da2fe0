//! Service catalog: ownership-gated mutations and the search engine.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::{info, warn};

use crate::domain::ports::{
    ServiceCatalogCommand, ServiceCatalogQuery, ServiceRepository, ServiceRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Action, Actor, Error, Service, ServiceDetail, ServiceDraft, ServiceId, ServiceListing,
    ServicePatch, ServiceSearch, User, UserId, VendorContact, VendorSummary, ensure_allowed,
};

pub(crate) fn map_service_error(error: ServiceRepositoryError) -> Error {
    match error {
        ServiceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("service repository unavailable: {message}"))
        }
        ServiceRepositoryError::Query { message } => {
            Error::internal(format!("service repository error: {message}"))
        }
    }
}

pub(crate) fn map_user_lookup_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn service_not_found(id: &ServiceId) -> Error {
    Error::not_found(format!("service {id} not found"))
}

/// Catalog service implementing the catalog command and query ports.
#[derive(Clone)]
pub struct CatalogService<S, U> {
    services: Arc<S>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<S, U> CatalogService<S, U> {
    /// Create the service from its repositories and a clock.
    pub fn new(services: Arc<S>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            services,
            users,
            clock,
        }
    }
}

impl<S, U> CatalogService<S, U>
where
    S: ServiceRepository,
    U: UserRepository,
{
    async fn load(&self, id: &ServiceId) -> Result<Service, Error> {
        self.services
            .find_by_id(id)
            .await
            .map_err(map_service_error)?
            .ok_or_else(|| service_not_found(id))
    }

    async fn load_owned(&self, actor: &Actor, id: &ServiceId) -> Result<Service, Error> {
        let service = self.load(id).await?;
        ensure_allowed(actor, Action::ModifyService, service.vendor_id == actor.user_id)?;
        Ok(service)
    }

    async fn vendors_for(&self, services: &[Service]) -> Result<HashMap<UserId, User>, Error> {
        let mut ids: Vec<UserId> = services.iter().map(|service| service.vendor_id).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let vendors = self
            .users
            .find_by_ids(&ids)
            .await
            .map_err(map_user_lookup_error)?;
        Ok(vendors.into_iter().map(|user| (user.id, user)).collect())
    }
}

#[async_trait]
impl<S, U> ServiceCatalogCommand for CatalogService<S, U>
where
    S: ServiceRepository,
    U: UserRepository,
{
    async fn create_service(&self, actor: &Actor, draft: ServiceDraft) -> Result<Service, Error> {
        ensure_allowed(actor, Action::CreateService, true)?;

        let service = Service::create(ServiceId::random(), actor.user_id, draft, self.clock.utc());
        self.services
            .insert(&service)
            .await
            .map_err(map_service_error)?;

        if let Err(err) = self.users.link_service(&actor.user_id, &service.id).await {
            warn!(
                user_id = %actor.user_id,
                service_id = %service.id,
                error = %err,
                "failed to record offered service on vendor"
            );
        }

        info!(user_id = %actor.user_id, service_id = %service.id, "service created");
        Ok(service)
    }

    async fn update_service(
        &self,
        actor: &Actor,
        service_id: &ServiceId,
        patch: ServicePatch,
    ) -> Result<Service, Error> {
        let mut service = self.load_owned(actor, service_id).await?;
        service.apply(patch);

        let updated = self
            .services
            .update(&service)
            .await
            .map_err(map_service_error)?;
        if !updated {
            return Err(service_not_found(service_id));
        }

        info!(user_id = %actor.user_id, service_id = %service_id, "service updated");
        Ok(service)
    }

    async fn delete_service(&self, actor: &Actor, service_id: &ServiceId) -> Result<(), Error> {
        let service = self.load_owned(actor, service_id).await?;

        let deleted = self
            .services
            .delete(service_id)
            .await
            .map_err(map_service_error)?;
        if !deleted {
            return Err(service_not_found(service_id));
        }

        if let Err(err) = self.users.unlink_service(&service.vendor_id, service_id).await {
            warn!(
                user_id = %service.vendor_id,
                service_id = %service_id,
                error = %err,
                "failed to drop offered service from vendor"
            );
        }

        info!(user_id = %actor.user_id, service_id = %service_id, "service deleted");
        Ok(())
    }
}

#[async_trait]
impl<S, U> ServiceCatalogQuery for CatalogService<S, U>
where
    S: ServiceRepository,
    U: UserRepository,
{
    async fn get_service(&self, service_id: &ServiceId) -> Result<ServiceDetail, Error> {
        let service = self.load(service_id).await?;
        let vendor = self
            .users
            .find_by_id(&service.vendor_id)
            .await
            .map_err(map_user_lookup_error)?;
        Ok(ServiceDetail {
            vendor: vendor.as_ref().map(VendorContact::from),
            service,
        })
    }

    async fn search(
        &self,
        filter: &ServiceSearch,
        page: PageRequest,
    ) -> Result<Paginated<ServiceListing>, Error> {
        let rows = self
            .services
            .search(filter, &page)
            .await
            .map_err(map_service_error)?;
        let window = Paginated::from_lookahead(rows, page);
        let vendors = self.vendors_for(window.data()).await?;

        Ok(window.map(|service| ServiceListing {
            vendor: vendors.get(&service.vendor_id).map(VendorSummary::from),
            service,
        }))
    }

    async fn list_by_vendor(&self, vendor_id: &UserId) -> Result<Vec<Service>, Error> {
        self.services
            .list_by_vendor(vendor_id)
            .await
            .map_err(map_service_error)
    }
}

#[cfg(test)]
#[path = "catalog_service_tests.rs"]
mod tests;
