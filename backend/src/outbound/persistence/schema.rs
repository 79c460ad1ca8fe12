//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Restaurant aggregate roots with their embedded address.
    restaurants (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        name -> Varchar,
        description -> Text,
        category -> Varchar,
        has_delivery -> Bool,
        /// `NULL` when the restaurant has no contact email.
        contact_email -> Nullable<Varchar>,
        contact_phone -> Nullable<Varchar>,
        /// Address columns are all set or all `NULL`.
        address_street -> Nullable<Varchar>,
        address_city -> Nullable<Varchar>,
        address_zip_code -> Nullable<Varchar>,
        address_country -> Nullable<Varchar>,
        /// Insertion time; defines listing order.
        created_at -> Timestamptz,
        /// Last modification timestamp (auto-updated by trigger).
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Dishes owned by a restaurant; removed with their owner.
    dishes (id) {
        id -> Uuid,
        restaurant_id -> Uuid,
        name -> Varchar,
        description -> Text,
        /// Price in minor units, always positive.
        price_cents -> Int8,
        kilo_calories -> Nullable<Float4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Identity records addressed by role and profile requests.
    users (id) {
        id -> Uuid,
        /// Unique ignoring case.
        email -> Varchar,
        birth_date -> Nullable<Date>,
        nationality -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Role catalogue.
    roles (name) {
        name -> Varchar,
    }
}

diesel::table! {
    /// Role membership.
    user_roles (user_id, role_name) {
        user_id -> Uuid,
        role_name -> Varchar,
    }
}

diesel::joinable!(dishes -> restaurants (restaurant_id));
diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(user_roles -> roles (role_name));

diesel::allow_tables_to_appear_in_same_query!(restaurants, dishes, users, roles, user_roles);
