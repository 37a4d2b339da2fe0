//! Driving port for catalog reads.

use async_trait::async_trait;
use pagination::{PageRequest, Paginated};

use crate::domain::{
    Error, Service, ServiceDetail, ServiceId, ServiceListing, ServiceSearch, UserId,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceCatalogQuery: Send + Sync {
    /// One service joined with its vendor's contact details.
    async fn get_service(&self, service_id: &ServiceId) -> Result<ServiceDetail, Error>;

    /// Filtered, paginated listing joined with vendor summaries.
    async fn search(
        &self,
        filter: &ServiceSearch,
        page: PageRequest,
    ) -> Result<Paginated<ServiceListing>, Error>;

    /// Every service owned by `vendor_id`, newest first.
    async fn list_by_vendor(&self, vendor_id: &UserId) -> Result<Vec<Service>, Error>;
}
