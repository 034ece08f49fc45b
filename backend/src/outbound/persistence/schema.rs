//! Diesel table definitions for the registry schema.
//!
//! Keep in step with `backend/migrations`; `diesel print-schema` regenerates
//! these from a live database.

diesel::table! {
    /// National highways keyed by route number.
    highways (id) {
        id -> Uuid,
        number -> Varchar,
        name -> Varchar,
    }
}

diesel::table! {
    /// Offices that own segments.
    offices (id) {
        id -> Uuid,
        division_name -> Varchar,
        office_name -> Varchar,
    }
}

diesel::table! {
    /// Road build standard catalogue.
    configuration_types (id) {
        id -> Uuid,
        code -> Varchar,
        name -> Varchar,
        display_order -> Int4,
        active -> Bool,
    }
}

diesel::table! {
    /// Registry users. `office_id` is set exactly when `role` is `division`.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        full_name -> Varchar,
        email -> Nullable<Varchar>,
        role -> Varchar,
        office_id -> Nullable<Uuid>,
        secret_hash -> Text,
        active -> Bool,
        last_login_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Office-owned chainage stretches of a highway.
    segments (id) {
        id -> Uuid,
        highway_id -> Uuid,
        office_id -> Uuid,
        name -> Varchar,
        start_km -> Float8,
        end_km -> Float8,
        start_latitude -> Nullable<Float8>,
        start_longitude -> Nullable<Float8>,
        end_latitude -> Nullable<Float8>,
        end_longitude -> Nullable<Float8>,
        status -> Varchar,
        remarks -> Nullable<Text>,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Build-standard sub-intervals of a segment.
    configuration_details (id) {
        id -> Uuid,
        segment_id -> Uuid,
        configuration_type_id -> Uuid,
        start_km -> Float8,
        end_km -> Float8,
        remarks -> Nullable<Text>,
        created_by -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(configuration_details -> configuration_types (configuration_type_id));
diesel::joinable!(configuration_details -> segments (segment_id));
diesel::joinable!(segments -> highways (highway_id));
diesel::joinable!(segments -> offices (office_id));
diesel::joinable!(users -> offices (office_id));

diesel::allow_tables_to_appear_in_same_query!(
    configuration_details,
    configuration_types,
    highways,
    offices,
    segments,
    users,
);
