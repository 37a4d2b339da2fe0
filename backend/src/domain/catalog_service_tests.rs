//! Tests for the catalog service.

use std::sync::Arc;

use mockable::DefaultClock;
use pagination::PageRequest;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockServiceRepository, MockUserRepository};
use crate::domain::{Amount, ErrorKind, PriceType, Role, ServiceCategory, Title};
use crate::outbound::memory::InMemoryStore;
use crate::test_support::{service, user};

struct Harness {
    store: Arc<InMemoryStore>,
    catalog: CatalogService<InMemoryStore, InMemoryStore>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::default());
    let catalog = CatalogService::new(store.clone(), store.clone(), Arc::new(DefaultClock));
    Harness { store, catalog }
}

async fn register(store: &InMemoryStore, user: &User) {
    UserRepository::insert(store, user).await.expect("insert user");
}

fn actor(user: &User) -> Actor {
    Actor::new(user.id, user.role)
}

fn dj_set() -> ServiceDraft {
    let mut draft = ServiceDraft::new(
        Title::new("DJ Set").expect("title"),
        Amount::new(500.0).expect("price"),
    );
    draft.category = ServiceCategory::Musician;
    draft
}

#[rstest]
#[tokio::test]
async fn created_service_round_trips_through_get(harness: Harness) {
    let mut bob = user("Bob", Role::Vendor);
    bob.city = Some("Pune".to_owned());
    register(&harness.store, &bob).await;

    let created = harness
        .catalog
        .create_service(&actor(&bob), dj_set())
        .await
        .expect("created");
    let detail = harness
        .catalog
        .get_service(&created.id)
        .await
        .expect("found");

    assert_eq!(detail.service.title.as_ref(), "DJ Set");
    assert_eq!(detail.service.category, ServiceCategory::Musician);
    assert_eq!(detail.service.price, Amount::new(500.0).expect("price"));
    assert_eq!(detail.service.price_type, PriceType::Fixed);
    assert_eq!(detail.service.rating, 0.0);
    assert_eq!(detail.service.vendor_id, bob.id);
    let vendor = detail.vendor.expect("vendor joined");
    assert_eq!(vendor.email, "bob@example.com");
    assert_eq!(vendor.city.as_deref(), Some("Pune"));

    let stored = UserRepository::find_by_id(harness.store.as_ref(), &bob.id)
        .await
        .expect("lookup")
        .expect("vendor exists");
    assert_eq!(stored.services_offered, vec![created.id]);
}

#[rstest]
#[case(Role::Client)]
#[case(Role::Coordinator)]
#[case(Role::Admin)]
#[tokio::test]
async fn only_vendors_may_create(harness: Harness, #[case] role: Role) {
    let caller = user("Eve", role);
    let err = harness
        .catalog
        .create_service(&actor(&caller), dj_set())
        .await
        .expect_err("forbidden");
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[rstest]
#[tokio::test]
async fn vendors_cannot_touch_each_others_services(harness: Harness) {
    let vendor_a = user("Anna", Role::Vendor);
    let vendor_b = user("Ben", Role::Vendor);
    let admin = user("Root", Role::Admin);
    register(&harness.store, &vendor_a).await;

    let listing = harness
        .catalog
        .create_service(&actor(&vendor_a), dj_set())
        .await
        .expect("created");
    let patch = ServicePatch {
        price: Some(Amount::new(1.0).expect("price")),
        ..ServicePatch::default()
    };

    let update = harness
        .catalog
        .update_service(&actor(&vendor_b), &listing.id, patch.clone())
        .await
        .expect_err("foreign update");
    assert_eq!(update.kind(), ErrorKind::Forbidden);
    let delete = harness
        .catalog
        .delete_service(&actor(&vendor_b), &listing.id)
        .await
        .expect_err("foreign delete");
    assert_eq!(delete.kind(), ErrorKind::Forbidden);

    let updated = harness
        .catalog
        .update_service(&actor(&admin), &listing.id, patch)
        .await
        .expect("admin update");
    assert_eq!(updated.price, Amount::new(1.0).expect("price"));
    assert_eq!(updated.title.as_ref(), "DJ Set");
    harness
        .catalog
        .delete_service(&actor(&admin), &listing.id)
        .await
        .expect("admin delete");

    let gone = harness
        .catalog
        .get_service(&listing.id)
        .await
        .expect_err("deleted");
    assert_eq!(gone.kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn updating_unknown_service_is_not_found(harness: Harness) {
    let vendor = user("Anna", Role::Vendor);
    let err = harness
        .catalog
        .update_service(&actor(&vendor), &ServiceId::random(), ServicePatch::default())
        .await
        .expect_err("missing");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[rstest]
#[tokio::test]
async fn search_pages_cover_matches_without_gaps(harness: Harness) {
    let vendor = user("Anna", Role::Vendor);
    register(&harness.store, &vendor).await;
    let mut expected = Vec::new();
    for minute in 0..11 {
        let item = service(vendor.id, "Lights", ServiceCategory::Decorator, 100.0, minute);
        ServiceRepository::insert(harness.store.as_ref(), &item)
            .await
            .expect("insert");
        expected.push(item.id);
    }
    expected.reverse();

    let filter = ServiceSearch::default();
    let mut seen = Vec::new();
    let mut page = PageRequest::new(1, 4).expect("valid page");
    loop {
        let result = harness.catalog.search(&filter, page).await.expect("search");
        assert!(result.data().len() <= 4);
        assert!(
            result
                .data()
                .iter()
                .all(|listing| listing.vendor.as_ref().map(|v| v.id) == Some(vendor.id))
        );
        seen.extend(result.data().iter().map(|listing| listing.service.id));
        if !result.has_more() {
            break;
        }
        page = page.next().expect("next page");
    }
    assert_eq!(seen, expected);
}

#[rstest]
#[tokio::test]
async fn search_tolerates_missing_vendor(harness: Harness) {
    let orphan = service(UserId::random(), "Orphan", ServiceCategory::Host, 10.0, 0);
    ServiceRepository::insert(harness.store.as_ref(), &orphan)
        .await
        .expect("insert");

    let result = harness
        .catalog
        .search(&ServiceSearch::default(), PageRequest::default())
        .await
        .expect("search");
    assert_eq!(result.data().len(), 1);
    assert!(result.data()[0].vendor.is_none());
}

#[rstest]
#[tokio::test]
async fn search_maps_connection_failures() {
    let mut services = MockServiceRepository::new();
    services
        .expect_search()
        .times(1)
        .return_once(|_, _| Err(ServiceRepositoryError::connection("refused")));
    let users = MockUserRepository::new();
    let catalog = CatalogService::new(Arc::new(services), Arc::new(users), Arc::new(DefaultClock));

    let err = catalog
        .search(&ServiceSearch::default(), PageRequest::default())
        .await
        .expect_err("unavailable");
    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn create_survives_vendor_link_failure() {
    let mut services = MockServiceRepository::new();
    services.expect_insert().times(1).return_once(|_| Ok(()));
    let mut users = MockUserRepository::new();
    users
        .expect_link_service()
        .times(1)
        .return_once(|_, _| Err(UserPersistenceError::query("boom")));
    let catalog = CatalogService::new(Arc::new(services), Arc::new(users), Arc::new(DefaultClock));
    let vendor = user("Anna", Role::Vendor);

    let created = catalog
        .create_service(&actor(&vendor), dj_set())
        .await
        .expect("service stored");
    assert_eq!(created.vendor_id, vendor.id);
}
