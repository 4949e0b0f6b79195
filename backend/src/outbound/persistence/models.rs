//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions from rows validate stored
//! values and report anything unparseable as [`RepositoryError::Corrupt`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    Coupon, CouponCode, CouponId, DiscountPercent, Email, Identity, Listing, ListingId,
    PaymentRecord, Rating, Review, ReviewId, TransactionId,
};

use super::diesel_helpers::{amount_to_db, count_from_db, small_from_db};
use super::schema::{coupons, identities, listings, payments, reviews, votes};

fn corrupt(column: &'static str) -> impl Fn(String) -> RepositoryError {
    move |message| RepositoryError::corrupt(format!("{column}: {message}"))
}

fn stored<T, E: std::fmt::Display>(
    value: Result<T, E>,
    column: &'static str,
) -> Result<T, RepositoryError> {
    value.map_err(|err| corrupt(column)(err.to_string()))
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Row struct for the identities table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = identities)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct IdentityRow {
    pub email: String,
    pub name: Option<String>,
    pub photo_url: Option<String>,
    pub role: String,
    pub tier: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for IdentityRow {
    fn from(identity: &Identity) -> Self {
        Self {
            email: identity.email.to_string(),
            name: identity.name.clone(),
            photo_url: identity.photo_url.clone(),
            role: identity.role.as_str().to_owned(),
            tier: identity.tier.as_str().to_owned(),
            created_at: identity.created_at,
        }
    }
}

impl TryFrom<IdentityRow> for Identity {
    type Error = RepositoryError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            email: stored(Email::new(&row.email), "identities.email")?,
            name: row.name,
            photo_url: row.photo_url,
            role: stored(row.role.parse(), "identities.role")?,
            tier: stored(row.tier.parse(), "identities.tier")?,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Listings and votes
// ---------------------------------------------------------------------------

/// Row struct for the listings table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub owner_email: String,
    pub name: String,
    pub image_url: Option<String>,
    pub description: String,
    pub external_link: Option<String>,
    pub tags: Vec<String>,
    pub status: String,
    pub vote_count: i64,
    pub reported: bool,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl ListingRow {
    pub(crate) fn try_from_listing(listing: &Listing) -> Result<Self, RepositoryError> {
        Ok(Self {
            id: *listing.id.as_uuid(),
            owner_email: listing.owner.to_string(),
            name: listing.name.clone(),
            image_url: listing.image_url.clone(),
            description: listing.description.clone(),
            external_link: listing.external_link.clone(),
            tags: listing.tags.clone(),
            status: listing.status.as_str().to_owned(),
            vote_count: amount_to_db(listing.vote_count, "listings.vote_count")?,
            reported: listing.reported,
            featured: listing.featured,
            created_at: listing.created_at,
        })
    }
}

impl TryFrom<ListingRow> for Listing {
    type Error = RepositoryError;

    fn try_from(row: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ListingId::from_uuid(row.id),
            owner: stored(Email::new(&row.owner_email), "listings.owner_email")?,
            name: row.name,
            image_url: row.image_url,
            description: row.description,
            external_link: row.external_link,
            tags: row.tags,
            status: stored(row.status.parse(), "listings.status")?,
            vote_count: count_from_db(row.vote_count, "listings.vote_count")?,
            reported: row.reported,
            featured: row.featured,
            created_at: row.created_at,
        })
    }
}

/// Changeset for owner edits; only descriptive columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = listings)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ListingDetailsUpdate<'a> {
    pub name: &'a str,
    pub image_url: Option<&'a str>,
    pub description: &'a str,
    pub external_link: Option<&'a str>,
    pub tags: &'a [String],
}

impl<'a> From<&'a Listing> for ListingDetailsUpdate<'a> {
    fn from(listing: &'a Listing) -> Self {
        Self {
            name: &listing.name,
            image_url: listing.image_url.as_deref(),
            description: &listing.description,
            external_link: listing.external_link.as_deref(),
            tags: &listing.tags,
        }
    }
}

/// Insertable vote row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub(crate) struct NewVoteRow<'a> {
    pub voter_email: &'a str,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

/// Row struct for the reviews table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub reviewer_email: String,
    pub reviewer_name: Option<String>,
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: *review.id.as_uuid(),
            listing_id: *review.listing_id.as_uuid(),
            reviewer_email: review.reviewer.to_string(),
            reviewer_name: review.reviewer_name.clone(),
            rating: i16::from(review.rating.get()),
            comment: review.comment.clone(),
            created_at: review.created_at,
        }
    }
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = small_from_db(row.rating, "reviews.rating")?;
        Ok(Self {
            id: ReviewId::from_uuid(row.id),
            listing_id: ListingId::from_uuid(row.listing_id),
            reviewer: stored(Email::new(&row.reviewer_email), "reviews.reviewer_email")?,
            reviewer_name: row.reviewer_name,
            rating: stored(Rating::new(rating), "reviews.rating")?,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Payments
// ---------------------------------------------------------------------------

/// Row struct for the payments table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PaymentRow {
    pub transaction_id: String,
    pub email: String,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentRow {
    pub(crate) fn try_from_record(record: &PaymentRecord) -> Result<Self, RepositoryError> {
        Ok(Self {
            transaction_id: record.transaction_id.to_string(),
            email: record.email.to_string(),
            amount_minor: amount_to_db(record.amount_minor, "payments.amount_minor")?,
            currency: record.currency.clone(),
            created_at: record.created_at,
        })
    }
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            transaction_id: stored(
                TransactionId::new(&row.transaction_id),
                "payments.transaction_id",
            )?,
            email: stored(Email::new(&row.email), "payments.email")?,
            amount_minor: count_from_db(row.amount_minor, "payments.amount_minor")?,
            currency: row.currency,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Coupons
// ---------------------------------------------------------------------------

/// Row struct for the coupons table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i16,
    pub description: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<&Coupon> for CouponRow {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: *coupon.id.as_uuid(),
            code: coupon.code.to_string(),
            discount_percent: i16::from(coupon.discount_percent.get()),
            description: coupon.description.clone(),
            expires_at: coupon.expires_at,
            created_at: coupon.created_at,
        }
    }
}

impl TryFrom<CouponRow> for Coupon {
    type Error = RepositoryError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let percent = small_from_db(row.discount_percent, "coupons.discount_percent")?;
        Ok(Self {
            id: CouponId::from_uuid(row.id),
            code: stored(CouponCode::new(&row.code), "coupons.code")?,
            discount_percent: stored(DiscountPercent::new(percent), "coupons.discount_percent")?,
            description: row.description,
            expires_at: row.expires_at,
            created_at: row.created_at,
        })
    }
}

/// Changeset for coupon edits; the code is immutable.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = coupons)]
pub(crate) struct CouponUpdate<'a> {
    pub discount_percent: i16,
    pub description: &'a str,
    pub expires_at: DateTime<Utc>,
}

impl<'a> From<&'a Coupon> for CouponUpdate<'a> {
    fn from(coupon: &'a Coupon) -> Self {
        Self {
            discount_percent: i16::from(coupon.discount_percent.get()),
            description: &coupon.description,
            expires_at: coupon.expires_at,
        }
    }
}

/// Collect converted rows, failing on the first corrupt one.
pub(crate) fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}
