//! Record builders shared by unit tests across the crate.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{
    Amount, Email, Event, EventDraft, EventId, Role, Service, ServiceCategory, ServiceDraft,
    ServiceId, Title, User, UserId, UserName,
};

/// Fixed reference instant; offsets from it give deterministic ordering.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .expect("valid reference time")
}

/// Instant `minutes` after [`epoch`].
pub fn at(minutes: i64) -> DateTime<Utc> {
    epoch() + Duration::minutes(minutes)
}

/// User with the given role; the email is derived from `name`.
pub fn user(name: &str, role: Role) -> User {
    User {
        id: UserId::random(),
        name: UserName::new(name).expect("valid name"),
        email: Email::new(format!("{}@example.com", name.to_lowercase())).expect("valid email"),
        password_hash: format!("hashed:{name}"),
        role,
        phone: None,
        city: None,
        services_offered: Vec::new(),
        bookings: Vec::new(),
        created_at: epoch(),
    }
}

/// Service owned by `vendor_id`, created `minutes` after [`epoch`].
pub fn service(
    vendor_id: UserId,
    title: &str,
    category: ServiceCategory,
    price: f64,
    minutes: i64,
) -> Service {
    let mut draft = ServiceDraft::new(
        Title::new(title).expect("valid title"),
        Amount::new(price).expect("valid price"),
    );
    draft.category = category;
    Service::create(ServiceId::random(), vendor_id, draft, at(minutes))
}

/// Pending event for `client_id` booking `service_ids`.
pub fn event(client_id: UserId, service_ids: Vec<ServiceId>, minutes: i64) -> Event {
    let draft = EventDraft::try_new(
        "2025-06-01",
        Amount::new(2000.0).expect("valid budget"),
        service_ids,
    )
    .expect("valid draft");
    Event::create(EventId::random(), client_id, draft, at(minutes))
}
