//! In-process document store implementing every repository port.
//!
//! Used by tests and by database-less development runs. Each mutation holds
//! the write lock for its whole read-modify-write, so add-to-set and remove
//! operations on booking references are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{
    EventRepository, EventRepositoryError, ServiceRepository, ServiceRepositoryError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Email, Event, EventId, Service, ServiceId, ServiceSearch, User, UserId, UserPatch,
};

const POISONED: &str = "in-memory store lock poisoned";

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<UserId, User>,
    services: HashMap<ServiceId, Service>,
    events: HashMap<EventId, Event>,
}

/// Shared in-memory store. Cheap to wrap in an `Arc` and hand to every service.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    fn read(&self) -> Option<RwLockReadGuard<'_, Collections>> {
        self.inner.read().ok()
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, Collections>> {
        self.inner.write().ok()
    }

    fn read_users(&self) -> Result<RwLockReadGuard<'_, Collections>, UserPersistenceError> {
        self.read().ok_or_else(|| UserPersistenceError::query(POISONED))
    }

    fn write_users(&self) -> Result<RwLockWriteGuard<'_, Collections>, UserPersistenceError> {
        self.write().ok_or_else(|| UserPersistenceError::query(POISONED))
    }

    fn read_services(&self) -> Result<RwLockReadGuard<'_, Collections>, ServiceRepositoryError> {
        self.read().ok_or_else(|| ServiceRepositoryError::query(POISONED))
    }

    fn write_services(&self) -> Result<RwLockWriteGuard<'_, Collections>, ServiceRepositoryError> {
        self.write().ok_or_else(|| ServiceRepositoryError::query(POISONED))
    }

    fn read_events(&self) -> Result<RwLockReadGuard<'_, Collections>, EventRepositoryError> {
        self.read().ok_or_else(|| EventRepositoryError::query(POISONED))
    }

    fn write_events(&self) -> Result<RwLockWriteGuard<'_, Collections>, EventRepositoryError> {
        self.write().ok_or_else(|| EventRepositoryError::query(POISONED))
    }

    fn mutate_user(
        &self,
        id: &UserId,
        change: impl FnOnce(&mut User),
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut store = self.write_users()?;
        Ok(store.users.get_mut(id).map(|user| {
            change(user);
            user.clone()
        }))
    }
}

/// Newest first, ties broken by descending id.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn add_to_set<T: PartialEq + Copy>(items: &mut Vec<T>, value: &T) {
    if !items.contains(value) {
        items.push(*value);
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut store = self.write_users()?;
        if store.users.values().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::duplicate_email(user.email.as_ref()));
        }
        store.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read_users()?.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .read_users()?
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.read_users()?;
        Ok(ids
            .iter()
            .filter_map(|id| store.users.get(id).cloned())
            .collect())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.mutate_user(id, |user| user.apply(patch))
    }

    async fn add_booking(
        &self,
        id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.mutate_user(id, |user| add_to_set(&mut user.bookings, event_id))
    }

    async fn remove_booking(
        &self,
        id: &UserId,
        event_id: &EventId,
    ) -> Result<Option<User>, UserPersistenceError> {
        self.mutate_user(id, |user| user.bookings.retain(|existing| existing != event_id))
    }

    async fn link_service(
        &self,
        id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), UserPersistenceError> {
        self.mutate_user(id, |user| add_to_set(&mut user.services_offered, service_id))
            .map(drop)
    }

    async fn unlink_service(
        &self,
        id: &UserId,
        service_id: &ServiceId,
    ) -> Result<(), UserPersistenceError> {
        self.mutate_user(id, |user| {
            user.services_offered.retain(|existing| existing != service_id);
        })
        .map(drop)
    }
}

#[async_trait]
impl ServiceRepository for InMemoryStore {
    async fn insert(&self, service: &Service) -> Result<(), ServiceRepositoryError> {
        self.write_services()?
            .services
            .insert(service.id, service.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ServiceId) -> Result<Option<Service>, ServiceRepositoryError> {
        Ok(self.read_services()?.services.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ServiceId]) -> Result<Vec<Service>, ServiceRepositoryError> {
        let store = self.read_services()?;
        Ok(ids
            .iter()
            .filter_map(|id| store.services.get(id).cloned())
            .collect())
    }

    async fn update(&self, service: &Service) -> Result<bool, ServiceRepositoryError> {
        let mut store = self.write_services()?;
        Ok(match store.services.get_mut(&service.id) {
            Some(slot) => {
                *slot = service.clone();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: &ServiceId) -> Result<bool, ServiceRepositoryError> {
        Ok(self.write_services()?.services.remove(id).is_some())
    }

    async fn search(
        &self,
        filter: &ServiceSearch,
        page: &PageRequest,
    ) -> Result<Vec<Service>, ServiceRepositoryError> {
        let store = self.read_services()?;
        let mut matches: Vec<Service> = store
            .services
            .values()
            .filter(|service| {
                let vendor_city = store
                    .users
                    .get(&service.vendor_id)
                    .and_then(|vendor| vendor.city.as_deref());
                filter.matches(service, vendor_city)
            })
            .cloned()
            .collect();
        newest_first(&mut matches, |service| (service.created_at, *service.id.as_uuid()));

        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.lookahead_limit()).unwrap_or(usize::MAX);
        Ok(matches.into_iter().skip(skip).take(take).collect())
    }

    async fn list_by_vendor(
        &self,
        vendor_id: &UserId,
    ) -> Result<Vec<Service>, ServiceRepositoryError> {
        let store = self.read_services()?;
        let mut owned: Vec<Service> = store
            .services
            .values()
            .filter(|service| &service.vendor_id == vendor_id)
            .cloned()
            .collect();
        newest_first(&mut owned, |service| (service.created_at, *service.id.as_uuid()));
        Ok(owned)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn insert(&self, event: &Event) -> Result<(), EventRepositoryError> {
        self.write_events()?.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &EventId) -> Result<Option<Event>, EventRepositoryError> {
        Ok(self.read_events()?.events.get(id).cloned())
    }

    async fn list_by_client(&self, client_id: &UserId) -> Result<Vec<Event>, EventRepositoryError> {
        let store = self.read_events()?;
        let mut booked: Vec<Event> = store
            .events
            .values()
            .filter(|event| &event.client_id == client_id)
            .cloned()
            .collect();
        newest_first(&mut booked, |event| (event.created_at, *event.id.as_uuid()));
        Ok(booked)
    }

    async fn update(&self, event: &Event) -> Result<bool, EventRepositoryError> {
        let mut store = self.write_events()?;
        Ok(match store.events.get_mut(&event.id) {
            Some(slot) => {
                *slot = event.clone();
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        Ok(self.write_events()?.events.remove(id).is_some())
    }
}
