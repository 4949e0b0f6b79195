//! Admin statistics handler.
//!
//! ```text
//! GET /api/v1/statistics
//! ```

use actix_web::{get, web};

use crate::domain::{Error, Statistics};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Site-wide counters; admin only.
#[utoipa::path(
    get,
    path = "/api/v1/statistics",
    responses(
        (status = 200, description = "Counters", body = Statistics),
        (status = 401, description = "Not an admin", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["statistics"],
    operation_id = "statistics"
)]
#[get("/statistics")]
pub async fn statistics(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<web::Json<Statistics>> {
    Ok(web::Json(state.statistics.collect(caller.claim()).await?))
}
