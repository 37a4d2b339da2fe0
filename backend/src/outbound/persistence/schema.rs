//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Registered users. `email` carries a unique index.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        role -> Varchar,
        phone -> Nullable<Varchar>,
        city -> Nullable<Varchar>,
        /// Denormalised list of services the user offers.
        services_offered -> Array<Uuid>,
        /// Denormalised list of booked events; add-to-set semantics.
        bookings -> Array<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalog listings. `vendor_id` is not a foreign key.
    services (id) {
        id -> Uuid,
        vendor_id -> Uuid,
        title -> Varchar,
        category -> Varchar,
        description -> Text,
        photos -> Array<Text>,
        price -> Float8,
        price_type -> Varchar,
        availability -> Array<Text>,
        perks -> Array<Text>,
        rating -> Float8,
        /// Embedded reviews as a JSON array.
        reviews -> Jsonb,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Booked events.
    events (id) {
        id -> Uuid,
        client_id -> Uuid,
        service_ids -> Array<Uuid>,
        event_type -> Varchar,
        event_date -> Varchar,
        venue_address -> Text,
        budget -> Float8,
        final_cost -> Nullable<Float8>,
        number_of_guests -> Int4,
        coordinator_id -> Nullable<Uuid>,
        status -> Varchar,
        notes -> Text,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, services, events);
