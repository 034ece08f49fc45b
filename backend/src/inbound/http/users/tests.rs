//! Tests for session and user administration handlers.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::test_utils::{
    ADMIN, login_request, session_cookie, test_app, test_context,
};

#[derive(Debug)]
struct ValidationExpectation<'a> {
    message: &'a str,
    field: &'a str,
    code: &'a str,
}

#[rstest]
#[case(
    "   ",
    "password",
    ValidationExpectation {
        message: "username must not be empty",
        field: "username",
        code: "empty_username",
    }
)]
#[case(
    "admin",
    "",
    ValidationExpectation {
        message: "password must not be empty",
        field: "password",
        code: "empty_password",
    }
)]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] expected: ValidationExpectation<'_>,
) {
    let ctx = test_context().await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        })
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], expected.message);
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["details"]["field"], expected.field);
    assert_eq!(value["details"]["code"], expected.code);
}

#[actix_web::test]
async fn wrong_password_is_unauthenticated() {
    let ctx = test_context().await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": ADMIN, "password": "wrong" }))
        .to_request();

    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["code"], "unauthenticated");
    assert_eq!(value["message"], "invalid credentials");
}

#[actix_web::test]
async fn login_then_me_then_logout() {
    let ctx = test_context().await;
    let app = actix_test::init_service(test_app(ctx.state)).await;

    let res = actix_test::call_service(&app, login_request(ADMIN).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["username"], ADMIN);
    assert_eq!(body["role"], "central");
    assert!(body.get("secretHash").is_none());
    assert!(body["lastLoginAt"].is_string());

    let me = actix_test::TestRequest::get()
        .uri("/api/v1/me")
        .cookie(cookie.clone())
        .to_request();
    let res = actix_test::call_service(&app, me).await;
    assert_eq!(res.status(), StatusCode::OK);

    let logout_req = actix_test::TestRequest::post()
        .uri("/api/v1/logout")
        .cookie(cookie)
        .to_request();
    let res = actix_test::call_service(&app, logout_req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn me_without_session_is_unauthenticated() {
    let ctx = test_context().await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn central_admin_creates_division_users() {
    let ctx = test_context().await;
    let office_id = ctx.office.id;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
    );

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .cookie(cookie)
        .set_json(json!({
            "username": "asha",
            "fullName": "Asha Rao",
            "role": "division",
            "officeId": office_id,
            "password": "s3cret",
        }))
        .to_request();
    let res = actix_test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["role"], "division");
    assert_eq!(body["officeId"], office_id.to_string());

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "username": "asha", "password": "s3cret" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case(json!({ "role": "division" }), "role")]
#[case(json!({ "role": "auditor" }), "role")]
#[case(json!({ "role": "central", "fullName": "  " }), "fullName")]
#[actix_web::test]
async fn malformed_users_are_rejected(#[case] overrides: Value, #[case] field: &str) {
    let ctx = test_context().await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
    );

    let mut payload = json!({
        "username": "asha",
        "fullName": "Asha Rao",
        "role": "central",
        "password": "s3cret",
    });
    if let (Some(target), Some(source)) = (payload.as_object_mut(), overrides.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/users")
        .cookie(cookie)
        .set_json(payload)
        .to_request();
    let res = actix_test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn division_users_cannot_manage_users() {
    let ctx = test_context().await;
    let username = ctx.division_user(&ctx.office, "hyd").await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, login_request(&username).to_request()).await,
    );

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{}", UserId::random()))
        .cookie(cookie)
        .set_json(json!({ "active": false }))
        .to_request();
    let res = actix_test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn deactivated_users_lose_their_session() {
    let ctx = test_context().await;
    let username = ctx.division_user(&ctx.office, "hyd").await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let admin = session_cookie(
        &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
    );
    let res = actix_test::call_service(&app, login_request(&username).to_request()).await;
    let division = session_cookie(&res);
    let user: Value = actix_test::read_body_json(res).await;
    let user_id = user["id"].as_str().expect("user id").to_owned();

    let request = actix_test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{user_id}"))
        .cookie(admin)
        .set_json(json!({ "active": false }))
        .to_request();
    let res = actix_test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["active"], false);

    let me = actix_test::TestRequest::get()
        .uri("/api/v1/me")
        .cookie(division)
        .to_request();
    let res = actix_test::call_service(&app, me).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_user_ids_are_bad_requests() {
    let ctx = test_context().await;
    let app = actix_test::init_service(test_app(ctx.state)).await;
    let admin = session_cookie(
        &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
    );
    let request = actix_test::TestRequest::patch()
        .uri("/api/v1/users/not-a-uuid")
        .cookie(admin)
        .set_json(json!({ "active": true }))
        .to_request();
    let res = actix_test::call_service(&app, request).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "invalid_uuid");
}
