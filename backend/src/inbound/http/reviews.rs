//! Review API handlers.
//!
//! ```text
//! POST /api/v1/reviews {"listingId":"...","rating":5,"comment":"Great"}
//! GET  /api/v1/reviews
//! GET  /api/v1/listings/{id}/reviews
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ListingId, Review, ReviewDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::listings::listing_id;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, review_error};

/// Review body for `POST /api/v1/reviews`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostReviewRequest {
    pub listing_id: String,
    pub rating: u8,
    pub comment: String,
}

impl TryFrom<&PostReviewRequest> for ReviewDraft {
    type Error = Error;

    fn try_from(value: &PostReviewRequest) -> Result<Self, Self::Error> {
        let listing: ListingId = parse_id(&value.listing_id, FieldName::new("listingId"))?;
        ReviewDraft::new(listing, value.rating, &value.comment).map_err(review_error)
    }
}

/// Post a review of an existing listing.
#[utoipa::path(
    post,
    path = "/api/v1/reviews",
    request_body = PostReviewRequest,
    responses(
        (status = 200, description = "Review stored", body = Review),
        (status = 400, description = "Invalid review", body = Error),
        (status = 401, description = "Missing or invalid credential", body = Error),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "postReview"
)]
#[post("/reviews")]
pub async fn post_review(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<PostReviewRequest>,
) -> ApiResult<web::Json<Review>> {
    let draft = ReviewDraft::try_from(&*payload)?;
    Ok(web::Json(state.reviews.post(caller.claim(), draft).await?))
}

/// Every review, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/reviews",
    responses((status = 200, description = "Reviews", body = [Review])),
    tags = ["reviews"],
    operation_id = "listReviews",
    security([])
)]
#[get("/reviews")]
pub async fn list_reviews(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Review>>> {
    Ok(web::Json(state.reviews.list_all().await?))
}

/// Reviews of one listing, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}/reviews",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Reviews of the listing", body = [Review]),
        (status = 400, description = "Malformed identifier", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listingReviews",
    security([])
)]
#[get("/listings/{id}/reviews")]
pub async fn listing_reviews(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Review>>> {
    let id = listing_id(&path)?;
    Ok(web::Json(state.reviews.for_listing(&id).await?))
}
