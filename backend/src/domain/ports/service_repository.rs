//! Driven port for catalog service persistence.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Service, ServiceId, ServiceSearch, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by service repository adapters.
    pub enum ServiceRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "service repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "service repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Persist a new service.
    async fn insert(&self, service: &Service) -> Result<(), ServiceRepositoryError>;

    /// Fetch one service.
    async fn find_by_id(&self, id: &ServiceId) -> Result<Option<Service>, ServiceRepositoryError>;

    /// Fetch every service in `ids` that exists, in no particular order.
    async fn find_by_ids(&self, ids: &[ServiceId]) -> Result<Vec<Service>, ServiceRepositoryError>;

    /// Overwrite a stored service. Returns `false` when it no longer exists.
    async fn update(&self, service: &Service) -> Result<bool, ServiceRepositoryError>;

    /// Delete a service. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &ServiceId) -> Result<bool, ServiceRepositoryError>;

    /// Run a filtered search.
    ///
    /// Adapters return at most `page.lookahead_limit()` rows starting at
    /// `page.offset()`, ordered by `created_at` descending then `id`
    /// descending.
    async fn search(
        &self,
        filter: &ServiceSearch,
        page: &PageRequest,
    ) -> Result<Vec<Service>, ServiceRepositoryError>;

    /// All services owned by a vendor, newest first.
    async fn list_by_vendor(
        &self,
        vendor_id: &UserId,
    ) -> Result<Vec<Service>, ServiceRepositoryError>;
}
