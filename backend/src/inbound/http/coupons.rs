//! Coupon API handlers.
//!
//! ```text
//! GET    /api/v1/coupons
//! POST   /api/v1/coupons {"code":"LAUNCH20","discountPercent":20,"expiresAt":"2026-12-31T00:00:00Z"}
//! PATCH  /api/v1/coupons/{id} {"discountPercent":25}
//! DELETE /api/v1/coupons/{id}
//! GET    /api/v1/coupons/code/{code}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Coupon, CouponCode, CouponDraft, CouponEdit, CouponId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, coupon_error, parse_id, parse_optional_rfc3339_timestamp, parse_rfc3339_timestamp,
};

/// Creation body for `POST /api/v1/coupons`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCouponRequest {
    pub code: String,
    pub discount_percent: u8,
    #[serde(default)]
    pub description: Option<String>,
    /// RFC 3339 expiry instant.
    pub expires_at: String,
}

impl CreateCouponRequest {
    fn into_draft(self, now: DateTime<Utc>) -> Result<CouponDraft, Error> {
        let expires_at = parse_rfc3339_timestamp(&self.expires_at, FieldName::new("expiresAt"))?;
        CouponDraft::new(
            &self.code,
            self.discount_percent,
            self.description.as_deref(),
            expires_at,
            now,
        )
        .map_err(coupon_error)
    }
}

/// Edit body for `PATCH /api/v1/coupons/{id}`.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditCouponRequest {
    #[serde(default)]
    pub discount_percent: Option<u8>,
    #[serde(default)]
    pub description: Option<String>,
    /// RFC 3339 expiry instant.
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl EditCouponRequest {
    fn into_edit(self, now: DateTime<Utc>) -> Result<CouponEdit, Error> {
        let expires_at = parse_optional_rfc3339_timestamp(
            self.expires_at.as_deref(),
            FieldName::new("expiresAt"),
        )?;
        CouponEdit::new(
            self.discount_percent,
            self.description.as_deref(),
            expires_at,
            now,
        )
        .map_err(coupon_error)
    }
}

fn coupon_id(path: &str) -> Result<CouponId, Error> {
    parse_id(path, FieldName::new("id"))
}

/// Every coupon, soonest expiry first; admin only.
#[utoipa::path(
    get,
    path = "/api/v1/coupons",
    responses(
        (status = 200, description = "Coupons", body = [Coupon]),
        (status = 401, description = "Not an admin", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "listCoupons"
)]
#[get("/coupons")]
pub async fn list_coupons(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Vec<Coupon>>> {
    Ok(web::Json(state.coupons.list(caller.claim()).await?))
}

/// Create a coupon; admin only.
#[utoipa::path(
    post,
    path = "/api/v1/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 200, description = "Coupon created", body = Coupon),
        (status = 400, description = "Invalid coupon", body = Error),
        (status = 401, description = "Not an admin", body = Error),
        (status = 409, description = "Code already exists", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "createCoupon"
)]
#[post("/coupons")]
pub async fn create_coupon(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<CreateCouponRequest>,
) -> ApiResult<web::Json<Coupon>> {
    let draft = payload.into_inner().into_draft(state.coupons.now())?;
    Ok(web::Json(state.coupons.create(caller.claim(), draft).await?))
}

/// Edit discount, description, or expiry; admin only.
#[utoipa::path(
    patch,
    path = "/api/v1/coupons/{id}",
    params(("id" = String, Path, description = "Coupon identifier")),
    request_body = EditCouponRequest,
    responses(
        (status = 200, description = "Updated coupon", body = Coupon),
        (status = 400, description = "Invalid edit", body = Error),
        (status = 401, description = "Not an admin", body = Error),
        (status = 404, description = "Coupon not found", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "editCoupon"
)]
#[patch("/coupons/{id}")]
pub async fn edit_coupon(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    payload: web::Json<EditCouponRequest>,
) -> ApiResult<web::Json<Coupon>> {
    let id = coupon_id(&path)?;
    let edit = payload.into_inner().into_edit(state.coupons.now())?;
    Ok(web::Json(state.coupons.edit(caller.claim(), &id, edit).await?))
}

/// Delete a coupon; admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/coupons/{id}",
    params(("id" = String, Path, description = "Coupon identifier")),
    responses(
        (status = 204, description = "Coupon deleted"),
        (status = 401, description = "Not an admin", body = Error),
        (status = 404, description = "Coupon not found", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "deleteCoupon"
)]
#[delete("/coupons/{id}")]
pub async fn delete_coupon(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = coupon_id(&path)?;
    state.coupons.delete(caller.claim(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Look up a redeemable coupon by code.
#[utoipa::path(
    get,
    path = "/api/v1/coupons/code/{code}",
    params(("code" = String, Path, description = "Coupon code, case-insensitive")),
    responses(
        (status = 200, description = "Active coupon", body = Coupon),
        (status = 400, description = "Malformed code", body = Error),
        (status = 404, description = "Unknown or expired", body = Error)
    ),
    tags = ["coupons"],
    operation_id = "validateCoupon"
)]
#[get("/coupons/code/{code}")]
pub async fn validate_coupon(
    state: web::Data<HttpState>,
    _caller: Authenticated,
    path: web::Path<String>,
) -> ApiResult<web::Json<Coupon>> {
    let code = CouponCode::new(path.as_str()).map_err(coupon_error)?;
    Ok(web::Json(state.coupons.validate(&code).await?))
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
                App::new().app_data($ctx.state()).service(
                    web::scope("/api/v1")
                        .service(list_coupons)
                        .service(create_coupon)
                        .service(edit_coupon)
                        .service(delete_coupon)
                        .service(validate_coupon),
                ),
            )
            .await
        };
    }

    fn launch_coupon() -> Value {
        json!({
            "code": "launch20",
            "discountPercent": 20,
            "description": "Launch week",
            "expiresAt": "2026-06-01T00:00:00Z",
        })
    }

    #[rstest]
    #[actix_web::test]
    async fn admin_manages_coupons_and_users_validate_them() {
        let ctx = TestContext::new();
        let admin = ctx.seed("root@x.com", Role::Admin, Tier::Free).await;
        let user = ctx.seed("a@x.com", Role::User, Tier::Free).await;
        let app = app!(ctx);

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/coupons")
                .insert_header(bearer(&admin))
                .set_json(launch_coupon())
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::OK);
        let coupon: Value = test::read_body_json(created).await;
        assert_eq!(coupon["code"], "LAUNCH20");
        let id = coupon["id"].as_str().expect("id").to_owned();

        let duplicate = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/coupons")
                .insert_header(bearer(&admin))
                .set_json(launch_coupon())
                .to_request(),
        )
        .await;
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let edited: Value = test::read_body_json(
            test::call_service(
                &app,
                test::TestRequest::patch()
                    .uri(&format!("/api/v1/coupons/{id}"))
                    .insert_header(bearer(&admin))
                    .set_json(json!({ "discountPercent": 30 }))
                    .to_request(),
            )
            .await,
        )
        .await;
        assert_eq!(edited["discountPercent"], 30);

        let validated = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/coupons/code/Launch20")
                .insert_header(bearer(&user))
                .to_request(),
        )
        .await;
        assert_eq!(validated.status(), StatusCode::OK);

        let deleted = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/coupons/{id}"))
                .insert_header(bearer(&admin))
                .to_request(),
        )
        .await;
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let gone = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/coupons/code/LAUNCH20")
                .insert_header(bearer(&user))
                .to_request(),
        )
        .await;
        assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[actix_web::test]
    async fn users_cannot_create_coupons() {
        let ctx = TestContext::new();
        let user = ctx.seed("a@x.com", Role::User, Tier::Premium).await;
        let app = app!(ctx);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/coupons")
                .insert_header(bearer(&user))
                .set_json(launch_coupon())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case(json!({ "code": "OLD", "discountPercent": 10, "expiresAt": "2020-01-01T00:00:00Z" }), "expiresAt")]
    #[case(json!({ "code": "BIG", "discountPercent": 101, "expiresAt": "2026-06-01T00:00:00Z" }), "discountPercent")]
    #[case(json!({ "code": "X", "discountPercent": 10, "expiresAt": "2026-06-01T00:00:00Z" }), "code")]
    #[case(json!({ "code": "WHEN", "discountPercent": 10, "expiresAt": "soon" }), "expiresAt")]
    #[actix_web::test]
    async fn invalid_coupons_name_the_field(#[case] body: Value, #[case] field: &str) {
        let ctx = TestContext::new();
        let admin = ctx.seed("root@x.com", Role::Admin, Tier::Free).await;
        let app = app!(ctx);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/coupons")
                .insert_header(bearer(&admin))
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(res).await;
        assert_eq!(err["details"]["field"], field);
    }
}
