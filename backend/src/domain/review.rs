//! Listing reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Email, ListingId, ReviewId};

/// Maximum review comment length in characters.
pub const COMMENT_MAX: usize = 2000;

/// Validation errors raised by review payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating outside 1..=5.
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    /// Comment was blank.
    #[error("comment must not be empty")]
    EmptyComment,
    /// Comment exceeds [`COMMENT_MAX`].
    #[error("comment must be at most {max} characters")]
    CommentTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Star rating between 1 and 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating.
    pub const fn new(value: u8) -> Result<Self, ReviewValidationError> {
        if value >= 1 && value <= 5 {
            Ok(Self(value))
        } else {
            Err(ReviewValidationError::RatingOutOfRange)
        }
    }

    /// Raw rating value.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Validated review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Reviewed listing.
    pub listing_id: ListingId,
    /// Star rating.
    pub rating: Rating,
    /// Review text.
    pub comment: String,
}

impl ReviewDraft {
    /// Validate a raw review submission.
    pub fn new(listing_id: ListingId, rating: u8, comment: &str) -> Result<Self, ReviewValidationError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(ReviewValidationError::EmptyComment);
        }
        if comment.chars().count() > COMMENT_MAX {
            return Err(ReviewValidationError::CommentTooLong { max: COMMENT_MAX });
        }
        Ok(Self {
            listing_id,
            rating: Rating::new(rating)?,
            comment: comment.to_owned(),
        })
    }
}

/// Stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Review identifier.
    #[schema(value_type = String)]
    pub id: ReviewId,
    /// Reviewed listing.
    #[schema(value_type = String)]
    pub listing_id: ListingId,
    /// Reviewer email.
    #[schema(value_type = String)]
    pub reviewer: Email,
    /// Reviewer display name at the time of review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    /// Star rating.
    #[schema(value_type = u8, minimum = 1, maximum = 5)]
    pub rating: Rating,
    /// Review text.
    pub comment: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}
