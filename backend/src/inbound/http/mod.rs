//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every API route lives under `/api/v1`; [`configure_api`] registers them in
//! an order the router can match. Health probes sit at the root.

pub mod auth;
pub mod coupons;
pub mod error;
pub mod health;
pub mod identities;
pub mod listings;
pub mod payments;
pub mod reviews;
pub mod schemas;
pub mod state;
pub mod statistics;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;

fn malformed_body(err: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}

/// Register every `/api/v1` route on `cfg`.
///
/// Malformed JSON bodies and query strings answer with the shared
/// `invalid_request` payload instead of Actix's plain-text default.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| malformed_body(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| malformed_body(err)))
        .service(identities::register_identity)
        .service(identities::issue_credential)
        .service(identities::current_identity)
        .service(identities::list_identities)
        .service(identities::change_role)
        .service(identities::change_tier)
        .configure(listings::configure)
        .service(reviews::listing_reviews)
        .service(reviews::post_review)
        .service(reviews::list_reviews)
        .service(payments::create_payment_intent)
        .service(payments::confirm_payment)
        .service(payments::my_payments)
        .service(coupons::list_coupons)
        .service(coupons::create_coupon)
        .service(coupons::validate_coupon)
        .service(coupons::edit_coupon)
        .service(coupons::delete_coupon)
        .service(statistics::statistics);
}
