//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update this file by hand.

diesel::table! {
    /// Registered identities keyed by lower-cased email.
    identities (email) {
        email -> Varchar,
        name -> Nullable<Varchar>,
        photo_url -> Nullable<Varchar>,
        /// One of `admin`, `moderator`, `user`, `unset`.
        role -> Varchar,
        /// One of `free`, `premium`.
        tier -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Submitted product listings.
    listings (id) {
        id -> Uuid,
        owner_email -> Varchar,
        name -> Varchar,
        image_url -> Nullable<Varchar>,
        description -> Text,
        external_link -> Nullable<Varchar>,
        tags -> Array<Text>,
        /// One of `pending`, `accepted`, `rejected`.
        status -> Varchar,
        /// Denormalised count of `votes` rows.
        vote_count -> Int8,
        reported -> Bool,
        featured -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// One row per (voter, listing); the composite key enforces single votes.
    votes (voter_email, listing_id) {
        voter_email -> Varchar,
        listing_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Listing reviews.
    reviews (id) {
        id -> Uuid,
        listing_id -> Uuid,
        reviewer_email -> Varchar,
        reviewer_name -> Nullable<Varchar>,
        rating -> Int2,
        comment -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recorded payments keyed by provider transaction id.
    payments (transaction_id) {
        transaction_id -> Varchar,
        email -> Varchar,
        amount_minor -> Int8,
        currency -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Discount coupons; `code` is unique.
    coupons (id) {
        id -> Uuid,
        code -> Varchar,
        discount_percent -> Int2,
        description -> Text,
        expires_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(listings -> identities (owner_email));
diesel::joinable!(votes -> listings (listing_id));
diesel::joinable!(reviews -> listings (listing_id));

diesel::allow_tables_to_appear_in_same_query!(
    identities, listings, votes, reviews, payments, coupons,
);
