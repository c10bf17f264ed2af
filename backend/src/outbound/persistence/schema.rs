//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the DDL in `schema_bootstrap.rs` exactly.
//! `diesel print-schema` against a bootstrapped database regenerates them.

diesel::table! {
    /// Registered accounts. `username` and `email` carry unique constraints.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        is_admin -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Submitted ideas. Vote counts are derived from `votes` at read time.
    ideas (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        tech_stack -> Array<Text>,
        tags -> Array<Text>,
        status -> Varchar,
        requested_by -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (user, idea) vote, enforced by a unique constraint.
    votes (id) {
        id -> Uuid,
        idea_id -> Uuid,
        user_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(votes -> ideas (idea_id));
diesel::joinable!(votes -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(ideas, users, votes);
