//! End-to-end listing lifecycle over the HTTP surface.
//!
//! Registration, credentials, submission caps, voting, and moderation are
//! driven through `/api/v1` against the in-memory store.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use futures::future::join_all;
use hunt_backend::domain::Role;
use rstest::rstest;
use serde_json::json;

use support::{Harness, bearer, credential, send, sign_up, submit};

#[rstest]
#[actix_web::test]
async fn registering_twice_keeps_one_identity() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());

    let body = json!({ "email": "Ada@X.com", "name": "Ada" });
    let (first, identity) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register-identity")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(identity["email"], "ada@x.com");
    assert_eq!(identity["role"], "user");
    assert_eq!(identity["tier"], "free");

    let (second, err) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register-identity")
            .set_json(&body)
            .to_request(),
    )
    .await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(err["message"], "User already exists");

    let admin = sign_up(&app, "root@x.com").await;
    harness.grant("root@x.com", Role::Admin).await;
    let (_, page) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/identities")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(page["total"], 2);
}

#[rstest]
#[actix_web::test]
async fn issued_credential_identifies_the_caller() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let token = sign_up(&app, "a@x.com").await;

    let (status, me) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/identities/me")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "a@x.com");

    let (missing, err) = send(
        &app,
        test::TestRequest::get().uri("/api/v1/identities/me").to_request(),
    )
    .await;
    assert_eq!(missing, StatusCode::UNAUTHORIZED);
    assert_eq!(err["code"], "missing_credential");

    let (tampered, err) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/identities/me")
            .insert_header(bearer(&format!("{token}x")))
            .to_request(),
    )
    .await;
    assert_eq!(tampered, StatusCode::UNAUTHORIZED);
    assert_eq!(err["code"], "invalid_credential");
}

#[rstest]
#[actix_web::test]
async fn free_tier_owner_is_capped_at_one_listing() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let token = sign_up(&app, "maker@x.com").await;

    let (first, listing) = submit(&app, &token, "Shipit").await;
    assert_eq!(first, StatusCode::OK);
    assert!(listing["id"].is_string());
    assert_eq!(listing["status"], "pending");

    let (second, err) = submit(&app, &token, "Shipit Two").await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(
        err["message"],
        "You have exceeded your post limit. Upgrade to premium to post more products."
    );
}

#[rstest]
#[actix_web::test]
async fn concurrent_votes_count_once() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let owner = sign_up(&app, "maker@x.com").await;
    let voter = sign_up(&app, "fan@x.com").await;
    let (_, listing) = submit(&app, &owner, "Shipit").await;
    let uri = format!("/api/v1/listings/{}/vote", listing["id"].as_str().expect("id"));

    let attempts = (0..8).map(|_| {
        send(
            &app,
            test::TestRequest::patch()
                .uri(&uri)
                .insert_header(bearer(&voter))
                .to_request(),
        )
    });
    let results = join_all(attempts).await;

    let accepted: Vec<_> = results
        .iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .collect();
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].1["voteCount"], 1);
    for (status, body) in results.iter().filter(|(s, _)| *s != StatusCode::OK) {
        assert_eq!(*status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "You have already voted this product");
    }
}

#[rstest]
#[case(Role::User)]
#[case(Role::Admin)]
#[actix_web::test]
async fn moderation_requires_the_moderator_role(#[case] role: Role) {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let owner = sign_up(&app, "maker@x.com").await;
    let caller = sign_up(&app, "someone@x.com").await;
    harness.grant("someone@x.com", role).await;
    let (_, listing) = submit(&app, &owner, "Shipit").await;
    let id = listing["id"].as_str().expect("id");

    let (status, err) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/listings/{id}/status"))
            .insert_header(bearer(&caller))
            .set_json(json!({ "status": "accepted" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(err["code"], "forbidden");

    let (_, details) = send(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/listings/{id}"))
            .insert_header(bearer(&owner))
            .to_request(),
    )
    .await;
    assert_eq!(details["status"], "pending");
}

#[rstest]
#[actix_web::test]
async fn accepted_listings_reach_the_public_views() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let owner = sign_up(&app, "maker@x.com").await;
    let moderator = sign_up(&app, "mod@x.com").await;
    harness.grant("mod@x.com", Role::Moderator).await;
    let (_, listing) = submit(&app, &owner, "Shipit").await;
    let id = listing["id"].as_str().expect("id");

    let (_, queue) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/listings/review-queue")
            .insert_header(bearer(&moderator))
            .to_request(),
    )
    .await;
    assert_eq!(queue[0]["id"], id);

    let (status, moderated) = send(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/api/v1/listings/{id}/status"))
            .insert_header(bearer(&moderator))
            .set_json(json!({ "status": "accepted" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moderated["status"], "accepted");

    let (_, featured) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/listings/featured")
            .to_request(),
    )
    .await;
    assert_eq!(featured[0]["id"], id);

    let (_, tagged) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/listings?tag=tools&status=accepted")
            .to_request(),
    )
    .await;
    assert_eq!(tagged["total"], 1);
}

#[rstest]
#[actix_web::test]
async fn credentials_require_registration() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/issue-credential")
            .set_json(json!({ "email": "ghost@x.com" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    sign_up(&app, "ghost@x.com").await;
    let token = credential(&app, "ghost@x.com").await;
    assert!(!token.is_empty());
}

#[rstest]
#[actix_web::test]
async fn minimal_product_body_is_accepted_once_per_free_owner() {
    let harness = Harness::new();
    let app = api_app!(harness.state.clone());
    let token = sign_up(&app, "u@x.com").await;
    let body = json!({ "email": "u@x.com", "productName": "Widget" });

    let post = || {
        test::TestRequest::post()
            .uri("/api/v1/listings")
            .insert_header(bearer(&token))
            .set_json(&body)
            .to_request()
    };

    let (first, listing) = send(&app, post()).await;
    assert_eq!(first, StatusCode::OK);
    assert!(listing["id"].is_string());
    assert_eq!(listing["name"], "Widget");
    assert_eq!(listing["description"], "");
    assert_eq!(listing["owner"], "u@x.com");

    let (second, err) = send(&app, post()).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(
        err["message"],
        "You have exceeded your post limit. Upgrade to premium to post more products."
    );
}
