//! Payment, coupon, and review flows over the HTTP surface.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use hunt_backend::domain::Role;
use rstest::rstest;
use serde_json::json;

use support::{Harness, bearer, send, sign_up, submit};

#[rstest]
#[actix_web::test]
async fn confirmed_payment_lifts_the_listing_cap() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let admin = sign_up(&app, "root@x.com").await;
    harness.grant("root@x.com", Role::Admin).await;
    let maker = sign_up(&app, "maker@x.com").await;

    let (created, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/coupons")
            .insert_header(bearer(&admin))
            .set_json(json!({
                "code": "launch20",
                "discountPercent": 20,
                "expiresAt": "2099-01-01T00:00:00Z",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created, StatusCode::OK);

    let (status, intent) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payment-intent")
            .insert_header(bearer(&maker))
            .set_json(json!({ "amount": 1000, "couponCode": "LAUNCH20" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(intent["amountMinor"], 800);
    assert_eq!(intent["clientSecret"], "fixture_secret_800_maker@x.com");

    submit(&app, &maker, "First").await;
    let (capped, _) = submit(&app, &maker, "Second").await;
    assert_eq!(capped, StatusCode::CONFLICT);

    let confirmation = json!({ "transactionId": "pi_123", "amount": 800 });
    let (confirmed, record) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payment-confirmation")
            .insert_header(bearer(&maker))
            .set_json(&confirmation)
            .to_request(),
    )
    .await;
    assert_eq!(confirmed, StatusCode::OK);
    assert_eq!(record["transactionId"], "pi_123");

    let (replayed, err) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payment-confirmation")
            .insert_header(bearer(&maker))
            .set_json(&confirmation)
            .to_request(),
    )
    .await;
    assert_eq!(replayed, StatusCode::CONFLICT);
    assert_eq!(err["message"], "Payment already recorded");

    let (uncapped, _) = submit(&app, &maker, "Second").await;
    assert_eq!(uncapped, StatusCode::OK);

    let (_, mine) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/payments/mine")
            .insert_header(bearer(&maker))
            .to_request(),
    )
    .await;
    assert_eq!(mine.as_array().map(Vec::len), Some(1));

    let (_, stats) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/statistics")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(stats["payments"]["revenueMinor"], 800);
    assert_eq!(stats["listingsByStatus"]["pending"], 2);
}

#[rstest]
#[actix_web::test]
async fn confirmation_payer_comes_from_the_credential() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let maker = sign_up(&app, "maker@x.com").await;
    sign_up(&app, "victim@x.com").await;

    let (anonymous, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payment-confirmation")
            .set_json(json!({ "transactionId": "pi_anon", "amount": 800 }))
            .to_request(),
    )
    .await;
    assert_eq!(anonymous, StatusCode::UNAUTHORIZED);

    let (status, record) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/payment-confirmation")
            .insert_header(bearer(&maker))
            .set_json(json!({
                "transactionId": "pi_777",
                "amount": 1234,
                "email": "victim@x.com",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["email"], "maker@x.com");
    assert_eq!(record["amountMinor"], 1234);
    assert_eq!(record["currency"], "usd");
}

#[rstest]
#[actix_web::test]
async fn reviews_attach_to_listings() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let maker = sign_up(&app, "maker@x.com").await;
    let reviewer = sign_up(&app, "critic@x.com").await;
    let (_, listing) = submit(&app, &maker, "Shipit").await;
    let id = listing["id"].as_str().expect("id");

    let (status, review) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/reviews")
            .insert_header(bearer(&reviewer))
            .set_json(json!({ "listingId": id, "rating": 4, "comment": "Solid" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(review["rating"], 4);

    let (_, reviews) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/listings/{id}/reviews"))
            .to_request(),
    )
    .await;
    assert_eq!(reviews.as_array().map(Vec::len), Some(1));
    assert_eq!(reviews[0]["comment"], "Solid");
}
