//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, and the
//! bearer credential scheme. Swagger UI serves it in debug builds and the
//! `openapi-dump` binary prints it for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{PaymentTotals, StatusCounts};
use crate::domain::{
    Coupon, Error, ErrorCode, Identity, IssuedCredential, Listing, ListingStatus, PaymentIntent,
    PaymentQuote, PaymentRecord, Review, Role, Statistics, Tier,
};
use crate::inbound::http::coupons::{CreateCouponRequest, EditCouponRequest};
use crate::inbound::http::identities::{
    CredentialRequest, RegisterRequest, RoleChangeRequest, TierChangeRequest,
};
use crate::inbound::http::listings::{
    EditListingRequest, FeaturedRequest, StatusRequest, SubmitListingRequest, VoteResponse,
};
use crate::inbound::http::payments::{PaymentConfirmationRequest, PaymentIntentRequest};
use crate::inbound::http::reviews::PostReviewRequest;
use crate::inbound::http::schemas::{IdentityPage, ListingPage};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerCredential";

/// Enrich the generated document with the bearer credential scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Credential issued by POST /api/v1/issue-credential."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hunt backend API",
        description = "Product launch board: listings, votes, reviews, moderation, and premium payments."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerCredential" = [])),
    paths(
        crate::inbound::http::identities::register_identity,
        crate::inbound::http::identities::issue_credential,
        crate::inbound::http::identities::current_identity,
        crate::inbound::http::identities::list_identities,
        crate::inbound::http::identities::change_role,
        crate::inbound::http::identities::change_tier,
        crate::inbound::http::listings::list_listings,
        crate::inbound::http::listings::featured_listings,
        crate::inbound::http::listings::trending_listings,
        crate::inbound::http::listings::review_queue,
        crate::inbound::http::listings::reported_listings,
        crate::inbound::http::listings::submit_listing,
        crate::inbound::http::listings::listing_details,
        crate::inbound::http::listings::edit_listing,
        crate::inbound::http::listings::vote_listing,
        crate::inbound::http::listings::moderate_listing,
        crate::inbound::http::listings::feature_listing,
        crate::inbound::http::listings::report_listing,
        crate::inbound::http::listings::delete_listing,
        crate::inbound::http::reviews::post_review,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::listing_reviews,
        crate::inbound::http::payments::create_payment_intent,
        crate::inbound::http::payments::confirm_payment,
        crate::inbound::http::payments::my_payments,
        crate::inbound::http::coupons::list_coupons,
        crate::inbound::http::coupons::create_coupon,
        crate::inbound::http::coupons::edit_coupon,
        crate::inbound::http::coupons::delete_coupon,
        crate::inbound::http::coupons::validate_coupon,
        crate::inbound::http::statistics::statistics,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error, ErrorCode, Identity, Role, Tier, IssuedCredential, Listing, ListingStatus,
        Review, Coupon, PaymentQuote, PaymentIntent, PaymentRecord, Statistics, StatusCounts,
        PaymentTotals, IdentityPage, ListingPage, RegisterRequest, CredentialRequest,
        RoleChangeRequest, TierChangeRequest, SubmitListingRequest, EditListingRequest,
        StatusRequest, FeaturedRequest, VoteResponse, PostReviewRequest, PaymentIntentRequest,
        PaymentConfirmationRequest, CreateCouponRequest, EditCouponRequest
    )),
    tags(
        (name = "identities", description = "Registration, credentials, roles and tiers"),
        (name = "listings", description = "Listing submission, voting and moderation"),
        (name = "reviews", description = "Listing reviews"),
        (name = "payments", description = "Premium upgrades"),
        (name = "coupons", description = "Discount codes"),
        (name = "statistics", description = "Admin counters"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
