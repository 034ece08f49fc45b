//! Office and configuration type handlers.
//!
//! ```text
//! GET /api/v1/offices
//! POST /api/v1/offices {"divisionName":"Hyderabad","officeName":"Office 1"}
//! GET /api/v1/configuration-types
//! POST /api/v1/configuration-types {"code":"4L","name":"Four lane","displayOrder":1}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ConfigurationType, ConfigurationTypeDraft, Error, Office, OfficeDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Request body for `POST /api/v1/offices`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfficeRequest {
    pub division_name: String,
    pub office_name: String,
}

/// Request body for `POST /api/v1/configuration-types`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateConfigurationTypeRequest {
    #[schema(example = "4L")]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub display_order: i32,
}

/// All offices.
#[utoipa::path(
    get,
    path = "/api/v1/offices",
    responses((status = 200, description = "Offices", body = [Office])),
    tags = ["reference-data"],
    operation_id = "listOffices",
    security([])
)]
#[get("/offices")]
pub async fn list_offices(state: web::Data<HttpState>) -> web::Json<Vec<Office>> {
    web::Json(state.corridor.offices().await)
}

/// Register an office; central administrators only.
#[utoipa::path(
    post,
    path = "/api/v1/offices",
    request_body = CreateOfficeRequest,
    responses(
        (status = 201, description = "Office created", body = Office),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error)
    ),
    tags = ["reference-data"],
    operation_id = "createOffice"
)]
#[post("/offices")]
pub async fn create_office(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOfficeRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = OfficeDraft::new(&payload.division_name, &payload.office_name)?;
    let office = state.corridor.create_office(&caller, draft).await?;
    Ok(HttpResponse::Created().json(office))
}

/// Active configuration types in display order.
#[utoipa::path(
    get,
    path = "/api/v1/configuration-types",
    responses((status = 200, description = "Configuration types", body = [ConfigurationType])),
    tags = ["reference-data"],
    operation_id = "listConfigurationTypes",
    security([])
)]
#[get("/configuration-types")]
pub async fn list_configuration_types(
    state: web::Data<HttpState>,
) -> web::Json<Vec<ConfigurationType>> {
    web::Json(state.corridor.configuration_types().await)
}

/// Add a configuration type; codes are unique ignoring case.
#[utoipa::path(
    post,
    path = "/api/v1/configuration-types",
    request_body = CreateConfigurationTypeRequest,
    responses(
        (status = 201, description = "Configuration type created", body = ConfigurationType),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 409, description = "Code already registered", body = Error)
    ),
    tags = ["reference-data"],
    operation_id = "createConfigurationType"
)]
#[post("/configuration-types")]
pub async fn create_configuration_type(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateConfigurationTypeRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = ConfigurationTypeDraft::new(&payload.code, &payload.name, payload.display_order)?;
    let kind = state
        .corridor
        .create_configuration_type(&caller, draft)
        .await?;
    Ok(HttpResponse::Created().json(kind))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{
        ADMIN, login_request, session_cookie, test_app, test_context,
    };

    #[actix_web::test]
    async fn reference_data_is_public() {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        for (uri, len) in [("/api/v1/offices", 2), ("/api/v1/configuration-types", 1)] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
            let body: Value = actix_test::read_body_json(res).await;
            assert_eq!(body.as_array().map(Vec::len), Some(len), "{uri}");
        }
    }

    #[rstest]
    #[case("4l", StatusCode::CONFLICT)]
    #[case("6L", StatusCode::CREATED)]
    #[case("  ", StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn configuration_codes_are_unique_ignoring_case(
        #[case] code: &str,
        #[case] expected: StatusCode,
    ) {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/configuration-types")
            .cookie(cookie)
            .set_json(json!({ "code": code, "name": "Lanes", "displayOrder": 2 }))
            .to_request();
        let res = actix_test::call_service(&app, request).await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn division_users_cannot_create_offices() {
        let ctx = test_context().await;
        let username = ctx.division_user(&ctx.office, "hyd").await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(&username).to_request()).await,
        );
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/offices")
            .cookie(cookie)
            .set_json(json!({ "divisionName": "Karimnagar", "officeName": "Office 3" }))
            .to_request();
        let res = actix_test::call_service(&app, request).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
