//! Listing API handlers.
//!
//! ```text
//! GET    /api/v1/listings?tag=ai&status=accepted&page=1&limit=10
//! GET    /api/v1/listings/featured
//! GET    /api/v1/listings/trending
//! GET    /api/v1/listings/review-queue
//! GET    /api/v1/listings/reported
//! POST   /api/v1/listings {"name":"Widget","description":"...","tags":["ai"]}
//! GET    /api/v1/listings/{id}
//! PATCH  /api/v1/listings/{id} {"description":"..."}
//! PATCH  /api/v1/listings/{id}/vote
//! PATCH  /api/v1/listings/{id}/status {"status":"accepted"}
//! PATCH  /api/v1/listings/{id}/featured {"featured":true}
//! PATCH  /api/v1/listings/{id}/report
//! DELETE /api/v1/listings/{id}
//! ```
//!
//! The literal sub-paths must be registered before `/listings/{id}` so the
//! router does not read them as identifiers; [`configure`] keeps that order.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::listing::normalise_tags;
use crate::domain::{
    Error, Listing, ListingDraft, ListingEdit, ListingFilter, ListingId, ListingStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{ListingPage, PageQuery};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, listing_error, parse_id};

/// Register every listing route in an order the router can match.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_listings)
        .service(featured_listings)
        .service(trending_listings)
        .service(review_queue)
        .service(reported_listings)
        .service(submit_listing)
        .service(listing_details)
        .service(edit_listing)
        .service(vote_listing)
        .service(moderate_listing)
        .service(feature_listing)
        .service(report_listing)
        .service(delete_listing);
}

/// Filters and page coordinates for `GET /api/v1/listings`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListingQuery {
    /// Only listings carrying this tag.
    pub tag: Option<String>,
    /// Only listings in this moderation state.
    pub status: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

impl ListingQuery {
    fn filter(&self) -> Result<ListingFilter, Error> {
        let tag = match self.tag.as_deref() {
            Some(raw) => normalise_tags([raw])
                .map_err(listing_error)?
                .into_iter()
                .next(),
            None => None,
        };
        let status = self
            .status
            .as_deref()
            .map(str::parse::<ListingStatus>)
            .transpose()
            .map_err(listing_error)?;
        Ok(ListingFilter { tag, status })
    }
}

/// Submission body for `POST /api/v1/listings`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitListingRequest {
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<&SubmitListingRequest> for ListingDraft {
    type Error = Error;

    fn try_from(value: &SubmitListingRequest) -> Result<Self, Self::Error> {
        ListingDraft::new(
            &value.name,
            value.image_url.as_deref(),
            &value.description,
            value.external_link.as_deref(),
            &value.tags,
        )
        .map_err(listing_error)
    }
}

/// Owner edit body for `PATCH /api/v1/listings/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditListingRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TryFrom<&EditListingRequest> for ListingEdit {
    type Error = Error;

    fn try_from(value: &EditListingRequest) -> Result<Self, Self::Error> {
        ListingEdit::new(
            value.name.as_deref(),
            value.image_url.as_deref(),
            value.description.as_deref(),
            value.external_link.as_deref(),
            value.tags.as_deref(),
        )
        .map_err(listing_error)
    }
}

/// Moderation body for `PATCH /api/v1/listings/{id}/status`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StatusRequest {
    pub status: String,
}

/// Body for `PATCH /api/v1/listings/{id}/featured`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FeaturedRequest {
    pub featured: bool,
}

/// Response to a counted vote.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub vote_count: u64,
}

pub(crate) fn listing_id(path: &str) -> Result<ListingId, Error> {
    parse_id(path, FieldName::new("id"))
}

/// Public, paginated listing query, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/listings",
    params(ListingQuery),
    responses(
        (status = 200, description = "Listings", body = ListingPage),
        (status = 400, description = "Invalid filter or page", body = Error)
    ),
    tags = ["listings"],
    operation_id = "listListings",
    security([])
)]
#[get("/listings")]
pub async fn list_listings(
    state: web::Data<HttpState>,
    query: web::Query<ListingQuery>,
) -> ApiResult<web::Json<Page<Listing>>> {
    let filter = query.filter()?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .to_request()?;
    let listings = state.listings.list(&filter, page).await?;
    Ok(web::Json(listings))
}

/// Latest featured or accepted listings.
#[utoipa::path(
    get,
    path = "/api/v1/listings/featured",
    responses((status = 200, description = "Featured listings", body = [Listing])),
    tags = ["listings"],
    operation_id = "featuredListings",
    security([])
)]
#[get("/listings/featured")]
pub async fn featured_listings(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Listing>>> {
    Ok(web::Json(state.listings.featured().await?))
}

/// Most voted accepted listings.
#[utoipa::path(
    get,
    path = "/api/v1/listings/trending",
    responses((status = 200, description = "Trending listings", body = [Listing])),
    tags = ["listings"],
    operation_id = "trendingListings",
    security([])
)]
#[get("/listings/trending")]
pub async fn trending_listings(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Listing>>> {
    Ok(web::Json(state.listings.trending().await?))
}

/// Moderator triage view: pending first, then accepted, then rejected.
#[utoipa::path(
    get,
    path = "/api/v1/listings/review-queue",
    responses(
        (status = 200, description = "Listings in triage order", body = [Listing]),
        (status = 401, description = "Not a moderator", body = Error)
    ),
    tags = ["listings"],
    operation_id = "reviewQueue"
)]
#[get("/listings/review-queue")]
pub async fn review_queue(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<Listing>>> {
    Ok(web::Json(state.listings.review_queue(caller.claim()).await?))
}

/// Listings flagged by users, moderators only.
#[utoipa::path(
    get,
    path = "/api/v1/listings/reported",
    responses(
        (status = 200, description = "Reported listings", body = [Listing]),
        (status = 401, description = "Not a moderator", body = Error)
    ),
    tags = ["listings"],
    operation_id = "reportedListings"
)]
#[get("/listings/reported")]
pub async fn reported_listings(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<Listing>>> {
    Ok(web::Json(state.listings.reported(caller.claim()).await?))
}

/// Submit a listing for moderation.
///
/// Free-tier owners may hold one listing; premium owners are uncapped.
#[utoipa::path(
    post,
    path = "/api/v1/listings",
    request_body = SubmitListingRequest,
    responses(
        (status = 200, description = "Listing submitted", body = Listing),
        (status = 400, description = "Invalid listing", body = Error),
        (status = 401, description = "Missing credential or unknown owner", body = Error),
        (status = 409, description = "Free-tier post limit reached", body = Error)
    ),
    tags = ["listings"],
    operation_id = "submitListing"
)]
#[post("/listings")]
pub async fn submit_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<SubmitListingRequest>,
) -> ApiResult<web::Json<Listing>> {
    let draft = ListingDraft::try_from(&*payload)?;
    let listing = state.listings.submit(caller.claim(), draft).await?;
    Ok(web::Json(listing))
}

/// One listing.
#[utoipa::path(
    get,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Listing", body = Listing),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["listings"],
    operation_id = "listingDetails"
)]
#[get("/listings/{id}")]
pub async fn listing_details(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Listing>> {
    let id = listing_id(&path)?;
    Ok(web::Json(state.listings.details(&id).await?))
}

/// Edit descriptive fields and tags; owner only.
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    request_body = EditListingRequest,
    responses(
        (status = 200, description = "Updated listing", body = Listing),
        (status = 400, description = "Invalid edit", body = Error),
        (status = 401, description = "Not the owner", body = Error),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["listings"],
    operation_id = "editListing"
)]
#[patch("/listings/{id}")]
pub async fn edit_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<EditListingRequest>,
) -> ApiResult<web::Json<Listing>> {
    let id = listing_id(&path)?;
    let edit = ListingEdit::try_from(&*payload)?;
    Ok(web::Json(state.listings.edit(caller.claim(), &id, edit).await?))
}

/// Vote once for a listing.
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}/vote",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Vote counted", body = VoteResponse),
        (status = 400, description = "Own listing or malformed identifier", body = Error),
        (status = 404, description = "Listing not found", body = Error),
        (status = 409, description = "Already voted", body = Error)
    ),
    tags = ["listings"],
    operation_id = "voteListing"
)]
#[patch("/listings/{id}/vote")]
pub async fn vote_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<VoteResponse>> {
    let id = listing_id(&path)?;
    let vote_count = state.listings.vote(caller.claim(), &id).await?;
    Ok(web::Json(VoteResponse { vote_count }))
}

/// Accept or reject a listing; moderators only.
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}/status",
    params(("id" = String, Path, description = "Listing identifier")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Moderated listing", body = Listing),
        (status = 400, description = "Unknown status", body = Error),
        (status = 401, description = "Not a moderator", body = Error),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["listings"],
    operation_id = "moderateListing"
)]
#[patch("/listings/{id}/status")]
pub async fn moderate_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<Listing>> {
    let id = listing_id(&path)?;
    let status: ListingStatus = payload.status.parse().map_err(listing_error)?;
    Ok(web::Json(
        state.listings.moderate(caller.claim(), &id, status).await?,
    ))
}

/// Set or clear the featured flag; moderators only.
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}/featured",
    params(("id" = String, Path, description = "Listing identifier")),
    request_body = FeaturedRequest,
    responses(
        (status = 200, description = "Updated listing", body = Listing),
        (status = 401, description = "Not a moderator", body = Error),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["listings"],
    operation_id = "featureListing"
)]
#[patch("/listings/{id}/featured")]
pub async fn feature_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<FeaturedRequest>,
) -> ApiResult<web::Json<Listing>> {
    let id = listing_id(&path)?;
    Ok(web::Json(
        state
            .listings
            .feature(caller.claim(), &id, payload.featured)
            .await?,
    ))
}

/// Flag a listing for moderator attention.
#[utoipa::path(
    patch,
    path = "/api/v1/listings/{id}/report",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 200, description = "Reported listing", body = Listing),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["listings"],
    operation_id = "reportListing"
)]
#[patch("/listings/{id}/report")]
pub async fn report_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Listing>> {
    let id = listing_id(&path)?;
    Ok(web::Json(state.listings.report(caller.claim(), &id).await?))
}

/// Delete a listing and its votes; owner or admin.
#[utoipa::path(
    delete,
    path = "/api/v1/listings/{id}",
    params(("id" = String, Path, description = "Listing identifier")),
    responses(
        (status = 204, description = "Listing deleted"),
        (status = 401, description = "Neither owner nor admin", body = Error),
        (status = 404, description = "Listing not found", body = Error)
    ),
    tags = ["listings"],
    operation_id = "deleteListing"
)]
#[delete("/listings/{id}")]
pub async fn delete_listing(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = listing_id(&path)?;
    state.listings.delete(caller.claim(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, Tier};
    use crate::inbound::http::test_utils::{TestContext, bearer};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::{Value, json};

    macro_rules! app {
        ($ctx:expr) => {
            test::init_service(
                App::new()
                    .app_data($ctx.state())
                    .service(web::scope("/api/v1").configure(configure)),
            )
            .await
        };
    }

    fn submission(name: &str) -> Value {
        json!({
            "name": name,
            "description": "A useful product",
            "externalLink": "https://example.com",
            "tags": ["AI", "ai", "tools"],
        })
    }

    macro_rules! submit {
        ($app:expr, $token:expr, $name:expr) => {
            test::call_service(
                &$app,
                test::TestRequest::post()
                    .uri("/api/v1/listings")
                    .insert_header(bearer(&$token))
                    .set_json(submission($name))
                    .to_request(),
            )
            .await
        };
    }

    #[rstest]
    #[actix_web::test]
    async fn free_tier_owner_is_capped_at_one_listing() {
        let ctx = TestContext::new();
        let token = ctx.seed("free@x.com", Role::User, Tier::Free).await;
        let app = app!(ctx);

        let first = submit!(app, token, "First");
        assert_eq!(first.status(), StatusCode::OK);
        let listing: Value = test::read_body_json(first).await;
        assert!(listing["id"].is_string());
        assert_eq!(listing["status"], "pending");
        assert_eq!(listing["tags"], json!(["ai", "tools"]));

        let second = submit!(app, token, "Second");
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let err: Value = test::read_body_json(second).await;
        assert_eq!(
            err["message"],
            "You have exceeded your post limit. Upgrade to premium to post more products."
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn premium_owner_is_uncapped() {
        let ctx = TestContext::new();
        let token = ctx.seed("pro@x.com", Role::User, Tier::Premium).await;
        let app = app!(ctx);
        for name in ["One", "Two", "Three"] {
            assert_eq!(submit!(app, token, name).status(), StatusCode::OK);
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn second_vote_conflicts() {
        let ctx = TestContext::new();
        let owner = ctx.seed("owner@x.com", Role::User, Tier::Free).await;
        let voter = ctx.seed("voter@x.com", Role::User, Tier::Free).await;
        let app = app!(ctx);
        let listing: Value = test::read_body_json(submit!(app, owner, "Votable")).await;
        let uri = format!("/api/v1/listings/{}/vote", listing["id"].as_str().expect("id"));

        let first = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&uri)
                .insert_header(bearer(&voter))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);
        let body: Value = test::read_body_json(first).await;
        assert_eq!(body["voteCount"], 1);

        let second = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&uri)
                .insert_header(bearer(&voter))
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let err: Value = test::read_body_json(second).await;
        assert_eq!(err["message"], "You have already voted this product");
    }

    #[rstest]
    #[actix_web::test]
    async fn owner_cannot_vote_for_own_listing() {
        let ctx = TestContext::new();
        let owner = ctx.seed("owner@x.com", Role::User, Tier::Free).await;
        let app = app!(ctx);
        let listing: Value = test::read_body_json(submit!(app, owner, "Mine")).await;
        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!(
                    "/api/v1/listings/{}/vote",
                    listing["id"].as_str().expect("id")
                ))
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[case(Role::User)]
    #[case(Role::Admin)]
    #[actix_web::test]
    async fn only_moderators_reach_the_review_queue(#[case] role: Role) {
        let ctx = TestContext::new();
        let token = ctx.seed("someone@x.com", role, Tier::Free).await;
        let app = app!(ctx);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/listings/review-queue")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let err: Value = test::read_body_json(res).await;
        assert_eq!(err["code"], "forbidden");
    }

    #[rstest]
    #[actix_web::test]
    async fn moderation_publishes_to_public_views() {
        let ctx = TestContext::new();
        let owner = ctx.seed("owner@x.com", Role::User, Tier::Free).await;
        let moderator = ctx.seed("mod@x.com", Role::Moderator, Tier::Free).await;
        let app = app!(ctx);
        let listing: Value = test::read_body_json(submit!(app, owner, "Launch")).await;
        let id = listing["id"].as_str().expect("id").to_owned();

        let moderated = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/listings/{id}/status"))
                .insert_header(bearer(&moderator))
                .set_json(json!({ "status": "accepted" }))
                .to_request(),
        )
        .await;
        assert_eq!(moderated.status(), StatusCode::OK);

        let trending: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/api/v1/listings/trending")
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(trending[0]["id"], id.as_str());

        let filtered: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::get()
                    .uri("/api/v1/listings?status=accepted&tag=AI")
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(filtered["total"], 1);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_status_is_invalid() {
        let ctx = TestContext::new();
        let app = app!(ctx);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/listings?status=archived")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(res).await;
        assert_eq!(err["details"]["field"], "status");
    }

    #[rstest]
    #[actix_web::test]
    async fn literal_paths_are_not_read_as_ids() {
        let ctx = TestContext::new();
        let app = app!(ctx);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/listings/featured")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_id_is_invalid() {
        let ctx = TestContext::new();
        let token = ctx.seed("a@x.com", Role::User, Tier::Free).await;
        let app = app!(ctx);
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/listings/not-a-uuid")
                .insert_header(bearer(&token))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(res).await;
        assert_eq!(err["details"]["code"], "invalid_uuid");
    }

    #[rstest]
    #[actix_web::test]
    async fn owner_deletes_and_stranger_cannot() {
        let ctx = TestContext::new();
        let owner = ctx.seed("owner@x.com", Role::User, Tier::Free).await;
        let stranger = ctx.seed("other@x.com", Role::User, Tier::Free).await;
        let app = app!(ctx);
        let listing: Value = test::read_body_json(submit!(app, owner, "Gone")).await;
        let uri = format!("/api/v1/listings/{}", listing["id"].as_str().expect("id"));

        let denied = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&uri)
                .insert_header(bearer(&stranger))
                .to_request(),
        )
        .await;
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let deleted = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&uri)
                .insert_header(bearer(&owner))
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
    }
}
