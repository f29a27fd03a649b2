//! Diesel table definitions for the clinic PostgreSQL schema.
//!
//! These must match the deployed migrations. `patient_visit_summary` is a
//! read-only view and is declared with `table!` so Diesel can select from it.

diesel::table! {
    /// Clinics, including headquarters (`parent_id` is null).
    clinics (id) {
        id -> Uuid,
        name -> Varchar,
        parent_id -> Nullable<Uuid>,
        is_active -> Bool,
    }
}

diesel::table! {
    /// One settings row per clinic.
    clinic_settings (clinic_id) {
        clinic_id -> Uuid,
        opening_time -> Time,
        closing_time -> Time,
        slot_minutes -> Int4,
        reservation_buffer_minutes -> Int4,
        allow_online_booking -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    staff (id) {
        id -> Uuid,
        clinic_id -> Uuid,
        name -> Varchar,
        role -> Varchar,
        is_active -> Bool,
    }
}

diesel::table! {
    patients (id) {
        id -> Uuid,
        clinic_id -> Uuid,
        name -> Varchar,
        name_kana -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
        birth_date -> Nullable<Date>,
        gender -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    visits (id) {
        id -> Uuid,
        clinic_id -> Uuid,
        patient_id -> Uuid,
        staff_id -> Nullable<Uuid>,
        visit_date -> Date,
        treatment_menu -> Nullable<Varchar>,
        /// Revenue in minor currency units.
        revenue -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    reservations (id) {
        id -> Uuid,
        clinic_id -> Uuid,
        patient_id -> Uuid,
        staff_id -> Nullable<Uuid>,
        start_time -> Timestamptz,
        end_time -> Timestamptz,
        menu -> Nullable<Varchar>,
        notes -> Nullable<Text>,
        /// One of the snake_case reservation status names.
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        user_id -> Uuid,
        clinic_id -> Nullable<Uuid>,
        title -> Varchar,
        body -> Text,
        is_read -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Role and clinic scope per authenticated user.
    user_permissions (user_id) {
        user_id -> Uuid,
        /// Raw role name; normalised when read.
        role -> Varchar,
        clinic_id -> Nullable<Uuid>,
        clinic_scope_ids -> Nullable<Array<Uuid>>,
    }
}

diesel::table! {
    /// Append-only log of denied requests.
    access_audit_logs (id) {
        id -> Int8,
        endpoint -> Varchar,
        reason -> Varchar,
        user_id -> Nullable<Uuid>,
        user_email -> Nullable<Varchar>,
        ip_address -> Nullable<Varchar>,
        user_agent -> Nullable<Text>,
        occurred_at -> Timestamptz,
    }
}

diesel::table! {
    /// Login accounts with Argon2 PHC password hashes.
    auth_users (id) {
        id -> Uuid,
        email -> Varchar,
        password_hash -> Varchar,
        is_active -> Bool,
    }
}

diesel::table! {
    /// View aggregating visits per patient.
    patient_visit_summary (patient_id) {
        patient_id -> Uuid,
        clinic_id -> Uuid,
        patient_name -> Varchar,
        visit_count -> Int8,
        total_revenue -> Int8,
        first_visit_date -> Nullable<Date>,
        last_visit_date -> Nullable<Date>,
    }
}

diesel::joinable!(clinic_settings -> clinics (clinic_id));
diesel::joinable!(staff -> clinics (clinic_id));
diesel::joinable!(patients -> clinics (clinic_id));
diesel::joinable!(visits -> patients (patient_id));
diesel::joinable!(reservations -> patients (patient_id));

diesel::allow_tables_to_appear_in_same_query!(
    clinics,
    clinic_settings,
    staff,
    patients,
    visits,
    reservations,
    notifications,
    user_permissions,
);
