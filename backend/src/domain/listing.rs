//! Product listing data model, validation, and triage ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::{Email, ListingId};

/// Maximum listing name length in characters.
pub const NAME_MAX: usize = 120;
/// Maximum listing description length in characters.
pub const DESCRIPTION_MAX: usize = 4000;
/// Maximum number of tags on a listing.
pub const TAGS_MAX: usize = 10;
/// Maximum length of one tag.
pub const TAG_MAX: usize = 32;

/// Validation errors raised by listing payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListingValidationError {
    /// Name was blank.
    #[error("name must not be empty")]
    EmptyName,
    /// Name exceeds [`NAME_MAX`].
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Description exceeds [`DESCRIPTION_MAX`].
    #[error("description must be at most {max} characters")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Too many tags supplied.
    #[error("at most {max} tags are allowed")]
    TooManyTags {
        /// Maximum accepted tag count.
        max: usize,
    },
    /// A tag was blank or too long.
    #[error("tags must be between 1 and {max} characters")]
    InvalidTag {
        /// Maximum accepted tag length.
        max: usize,
    },
    /// A link field is not an absolute http(s) URL.
    #[error("{field} must be an absolute http or https URL")]
    InvalidLink {
        /// Offending field name.
        field: &'static str,
    },
    /// Status text is not one of the closed set.
    #[error("unknown listing status: {0}")]
    UnknownStatus(String),
    /// An edit carried no fields.
    #[error("edit must change at least one field")]
    EmptyEdit,
}

/// Moderation state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    /// Awaiting moderation.
    Pending,
    /// Approved for public display.
    Accepted,
    /// Declined by a moderator.
    Rejected,
}

impl ListingStatus {
    /// Stable lower-case name used in storage and on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    /// Position in the moderator review queue.
    pub const fn triage_rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Accepted => 1,
            Self::Rejected => 2,
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = ListingValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(ListingValidationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Stored product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Listing identifier.
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: ListingId,
    /// Email of the submitting identity.
    #[schema(value_type = String, example = "ada@example.com")]
    pub owner: Email,
    /// Product name.
    pub name: String,
    /// Product image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Product description.
    pub description: String,
    /// Product homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// Moderation state.
    pub status: ListingStatus,
    /// Number of distinct voters.
    pub vote_count: u64,
    /// Whether someone flagged the listing.
    pub reported: bool,
    /// Whether moderators featured the listing.
    pub featured: bool,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Build the stored form of a fresh submission.
    pub fn submit(id: ListingId, owner: Email, draft: ListingDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            name: draft.name,
            image_url: draft.image_url,
            description: draft.description,
            external_link: draft.external_link,
            tags: draft.tags,
            status: ListingStatus::Pending,
            vote_count: 0,
            reported: false,
            featured: false,
            created_at: now,
        }
    }

    /// Apply an owner edit to the descriptive fields.
    pub fn apply(&mut self, edit: ListingEdit) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(image_url) = edit.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(external_link) = edit.external_link {
            self.external_link = Some(external_link);
        }
        if let Some(tags) = edit.tags {
            self.tags = tags;
        }
    }
}

/// Review queue ordering: pending, accepted, then rejected; ties by arrival.
pub fn triage_order(a: &Listing, b: &Listing) -> Ordering {
    a.status
        .triage_rank()
        .cmp(&b.status.triage_rank())
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Public listing order: newest first.
pub fn newest_first(a: &Listing, b: &Listing) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
}

/// Trending order: most voted first, newest breaking ties.
pub fn most_voted(a: &Listing, b: &Listing) -> Ordering {
    b.vote_count
        .cmp(&a.vote_count)
        .then_with(|| newest_first(a, b))
}

fn validate_name(raw: &str) -> Result<String, ListingValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ListingValidationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX {
        return Err(ListingValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(name.to_owned())
}

/// Blank descriptions are stored empty; submissions may omit the field.
fn validate_description(raw: &str) -> Result<String, ListingValidationError> {
    let description = raw.trim();
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(ListingValidationError::DescriptionTooLong {
            max: DESCRIPTION_MAX,
        });
    }
    Ok(description.to_owned())
}

/// Validate an optional link, treating blank input as absent.
pub(crate) fn validate_link(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<String>, ListingValidationError> {
    let Some(link) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(url.to_string())),
        _ => Err(ListingValidationError::InvalidLink { field }),
    }
}

/// Trim, lower-case, and de-duplicate tags, keeping first-seen order.
pub fn normalise_tags<I, S>(raw: I) -> Result<Vec<String>, ListingValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for tag in raw {
        let tag = tag.as_ref().trim().to_lowercase();
        if tag.is_empty() || tag.chars().count() > TAG_MAX {
            return Err(ListingValidationError::InvalidTag { max: TAG_MAX });
        }
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    if tags.len() > TAGS_MAX {
        return Err(ListingValidationError::TooManyTags { max: TAGS_MAX });
    }
    Ok(tags)
}

/// Validated submission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    name: String,
    image_url: Option<String>,
    description: String,
    external_link: Option<String>,
    tags: Vec<String>,
}

impl ListingDraft {
    /// Validate raw submission fields.
    pub fn new(
        name: &str,
        image_url: Option<&str>,
        description: &str,
        external_link: Option<&str>,
        tags: &[String],
    ) -> Result<Self, ListingValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            image_url: validate_link(image_url, "imageUrl")?,
            description: validate_description(description)?,
            external_link: validate_link(external_link, "externalLink")?,
            tags: normalise_tags(tags)?,
        })
    }

    /// Validated product name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validated owner edit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingEdit {
    name: Option<String>,
    image_url: Option<String>,
    description: Option<String>,
    external_link: Option<String>,
    tags: Option<Vec<String>>,
}

impl ListingEdit {
    /// Validate raw edit fields, requiring at least one.
    pub fn new(
        name: Option<&str>,
        image_url: Option<&str>,
        description: Option<&str>,
        external_link: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<Self, ListingValidationError> {
        let edit = Self {
            name: name.map(validate_name).transpose()?,
            image_url: validate_link(image_url, "imageUrl")?,
            description: description.map(validate_description).transpose()?,
            external_link: validate_link(external_link, "externalLink")?,
            tags: tags.map(normalise_tags).transpose()?,
        };
        if edit == Self::default() {
            return Err(ListingValidationError::EmptyEdit);
        }
        Ok(edit)
    }
}

/// Filter applied to the public listing query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Only listings carrying this (normalised) tag.
    pub tag: Option<String>,
    /// Only listings in this state.
    pub status: Option<ListingStatus>,
}

impl ListingFilter {
    /// Whether `listing` passes the filter.
    pub fn matches(&self, listing: &Listing) -> bool {
        let tag_ok = self
            .tag
            .as_ref()
            .is_none_or(|tag| listing.tags.iter().any(|t| t == tag));
        let status_ok = self.status.is_none_or(|status| listing.status == status);
        tag_ok && status_ok
    }
}
