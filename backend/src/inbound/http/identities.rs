//! Identity API handlers.
//!
//! ```text
//! POST  /api/v1/register-identity {"email":"ada@example.com","name":"Ada"}
//! POST  /api/v1/issue-credential  {"email":"ada@example.com"}
//! GET   /api/v1/identities/me
//! GET   /api/v1/identities?page=1&limit=20
//! PATCH /api/v1/identities/role   {"email":"bob@example.com","role":"moderator"}
//! PATCH /api/v1/identities/tier   {"email":"bob@example.com","tier":"premium"}
//! ```

use actix_web::{get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, Identity, IssuedCredential, NewIdentity, Role, Tier};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::schemas::{IdentityPage, PageQuery};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, identity_error, parse_email};

/// Registration body for `POST /api/v1/register-identity`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Body for `POST /api/v1/issue-credential`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequest {
    pub email: String,
}

/// Body for `PATCH /api/v1/identities/role`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    pub email: String,
    pub role: String,
}

/// Body for `PATCH /api/v1/identities/tier`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TierChangeRequest {
    pub email: String,
    pub tier: String,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|text| !text.is_empty())
}

impl TryFrom<RegisterRequest> for NewIdentity {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: parse_email(&value.email, FieldName::new("email"))?,
            name: optional_text(value.name),
            photo_url: optional_text(value.photo_url),
        })
    }
}

/// Register a new identity with role `user` and tier `free`.
#[utoipa::path(
    post,
    path = "/api/v1/register-identity",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Identity registered", body = Identity),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["identities"],
    operation_id = "registerIdentity",
    security([])
)]
#[post("/register-identity")]
pub async fn register_identity(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<web::Json<Identity>> {
    let new = NewIdentity::try_from(payload.into_inner())?;
    let identity = state.identities.register(new).await?;
    Ok(web::Json(identity))
}

/// Issue a bearer credential for a registered email.
#[utoipa::path(
    post,
    path = "/api/v1/issue-credential",
    request_body = CredentialRequest,
    responses(
        (status = 200, description = "Credential issued", body = IssuedCredential),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Email not registered", body = Error)
    ),
    tags = ["identities"],
    operation_id = "issueCredential",
    security([])
)]
#[post("/issue-credential")]
pub async fn issue_credential(
    state: web::Data<HttpState>,
    payload: web::Json<CredentialRequest>,
) -> ApiResult<web::Json<IssuedCredential>> {
    let email = parse_email(&payload.email, FieldName::new("email"))?;
    let issued = state.identities.issue_credential(email).await?;
    Ok(web::Json(issued))
}

/// The caller's own identity.
#[utoipa::path(
    get,
    path = "/api/v1/identities/me",
    responses(
        (status = 200, description = "Own identity", body = Identity),
        (status = 401, description = "Missing or invalid credential", body = Error),
        (status = 404, description = "Identity no longer exists", body = Error)
    ),
    tags = ["identities"],
    operation_id = "currentIdentity"
)]
#[get("/identities/me")]
pub async fn current_identity(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Identity>> {
    let identity = state.identities.current(caller.claim()).await?;
    Ok(web::Json(identity))
}

/// Paginated identities, admin only.
#[utoipa::path(
    get,
    path = "/api/v1/identities",
    params(PageQuery),
    responses(
        (status = 200, description = "Identities", body = IdentityPage),
        (status = 400, description = "Invalid page coordinates", body = Error),
        (status = 401, description = "Not an admin", body = Error)
    ),
    tags = ["identities"],
    operation_id = "listIdentities"
)]
#[get("/identities")]
pub async fn list_identities(
    state: web::Data<HttpState>,
    caller: Authenticated,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<pagination::Page<Identity>>> {
    let page = query.to_request()?;
    let identities = state.identities.list(caller.claim(), page).await?;
    Ok(web::Json(identities))
}

/// Change another identity's role, admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/identities/role",
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Updated identity", body = Identity),
        (status = 400, description = "Unknown role", body = Error),
        (status = 401, description = "Not an admin", body = Error),
        (status = 404, description = "Identity not found", body = Error)
    ),
    tags = ["identities"],
    operation_id = "changeRole"
)]
#[patch("/identities/role")]
pub async fn change_role(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<RoleChangeRequest>,
) -> ApiResult<web::Json<Identity>> {
    let email = parse_email(&payload.email, FieldName::new("email"))?;
    let role: Role = payload.role.parse().map_err(identity_error)?;
    let identity = state
        .identities
        .change_role(caller.claim(), &email, role)
        .await?;
    Ok(web::Json(identity))
}

/// Change another identity's tier, admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/identities/tier",
    request_body = TierChangeRequest,
    responses(
        (status = 200, description = "Updated identity", body = Identity),
        (status = 400, description = "Unknown tier", body = Error),
        (status = 401, description = "Not an admin", body = Error),
        (status = 404, description = "Identity not found", body = Error)
    ),
    tags = ["identities"],
    operation_id = "changeTier"
)]
#[patch("/identities/tier")]
pub async fn change_tier(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<TierChangeRequest>,
) -> ApiResult<web::Json<Identity>> {
    let email = parse_email(&payload.email, FieldName::new("email"))?;
    let tier: Tier = payload.tier.parse().map_err(identity_error)?;
    let identity = state
        .identities
        .change_tier(caller.claim(), &email, tier)
        .await?;
    Ok(web::Json(identity))
}
