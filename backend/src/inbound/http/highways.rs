//! Highway handlers.
//!
//! ```text
//! GET /api/v1/highways
//! POST /api/v1/highways {"number":"NH-44","name":"North South Corridor"}
//! GET /api/v1/highways/{highway_id}
//! PATCH /api/v1/highways/{highway_id} {"name":"Renamed"}
//! GET /api/v1/highways/{highway_id}/segments
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, Highway, HighwayDraft, HighwayId, Segment};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const HIGHWAY_ID: FieldName = FieldName::new("highwayId");

/// Request body for `POST /api/v1/highways`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHighwayRequest {
    #[schema(example = "NH-44")]
    pub number: String,
    pub name: String,
}

/// Request body for `PATCH /api/v1/highways/{highway_id}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameHighwayRequest {
    pub name: String,
}

/// All highways; open to anonymous callers.
#[utoipa::path(
    get,
    path = "/api/v1/highways",
    responses((status = 200, description = "Highways", body = [Highway])),
    tags = ["highways"],
    operation_id = "listHighways",
    security([])
)]
#[get("/highways")]
pub async fn list_highways(state: web::Data<HttpState>) -> web::Json<Vec<Highway>> {
    web::Json(state.corridor.highways().await)
}

/// Register a highway; central administrators only.
#[utoipa::path(
    post,
    path = "/api/v1/highways",
    request_body = CreateHighwayRequest,
    responses(
        (status = 201, description = "Highway created", body = Highway),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 409, description = "Number already registered", body = Error)
    ),
    tags = ["highways"],
    operation_id = "createHighway"
)]
#[post("/highways")]
pub async fn create_highway(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateHighwayRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = HighwayDraft::new(&payload.number, &payload.name)?;
    let highway = state.corridor.create_highway(&caller, draft).await?;
    Ok(HttpResponse::Created().json(highway))
}

/// One highway.
#[utoipa::path(
    get,
    path = "/api/v1/highways/{highway_id}",
    params(("highway_id" = String, Path, description = "Highway identifier")),
    responses(
        (status = 200, description = "Highway", body = Highway),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown highway", body = Error)
    ),
    tags = ["highways"],
    operation_id = "getHighway",
    security([])
)]
#[get("/highways/{highway_id}")]
pub async fn get_highway(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Highway>> {
    let id: HighwayId = parse_id(&path, HIGHWAY_ID)?;
    Ok(web::Json(state.corridor.highway(id).await?))
}

/// Rename a highway; the number is immutable.
#[utoipa::path(
    patch,
    path = "/api/v1/highways/{highway_id}",
    request_body = RenameHighwayRequest,
    params(("highway_id" = String, Path, description = "Highway identifier")),
    responses(
        (status = 200, description = "Renamed highway", body = Highway),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 404, description = "Unknown highway", body = Error)
    ),
    tags = ["highways"],
    operation_id = "renameHighway"
)]
#[patch("/highways/{highway_id}")]
pub async fn rename_highway(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RenameHighwayRequest>,
) -> ApiResult<web::Json<Highway>> {
    let id: HighwayId = parse_id(&path, HIGHWAY_ID)?;
    let caller = state.caller(&session).await?;
    let highway = state
        .corridor
        .update_highway_name(&caller, id, &payload.name)
        .await?;
    Ok(web::Json(highway))
}

/// Segments of one highway visible to the caller, ordered by start.
#[utoipa::path(
    get,
    path = "/api/v1/highways/{highway_id}/segments",
    params(("highway_id" = String, Path, description = "Highway identifier")),
    responses(
        (status = 200, description = "Segments", body = [Segment]),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown highway", body = Error)
    ),
    tags = ["highways"],
    operation_id = "listHighwaySegments"
)]
#[get("/highways/{highway_id}/segments")]
pub async fn list_highway_segments(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Segment>>> {
    let id: HighwayId = parse_id(&path, HIGHWAY_ID)?;
    let caller = state.caller(&session).await?;
    let segments = state.corridor.segments_for_highway(&caller, id).await?;
    Ok(web::Json(segments))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    use crate::inbound::http::test_utils::{
        ADMIN, login_request, session_cookie, test_app, test_context,
    };

    #[actix_web::test]
    async fn anyone_can_list_highways() {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/highways").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["number"], "NH-44");
    }

    #[actix_web::test]
    async fn anonymous_callers_cannot_create_highways() {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/highways")
            .set_json(json!({ "number": "NH-48", "name": "Golden Quadrilateral" }))
            .to_request();
        let res = actix_test::call_service(&app, request).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["code"], "unauthorized");
    }

    #[actix_web::test]
    async fn duplicate_numbers_conflict() {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/highways")
            .cookie(cookie)
            .set_json(json!({ "number": "NH-44", "name": "Again" }))
            .to_request();
        let res = actix_test::call_service(&app, request).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn rename_keeps_the_number() {
        let ctx = test_context().await;
        let id = ctx.highway.id;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let request = actix_test::TestRequest::patch()
            .uri(&format!("/api/v1/highways/{id}"))
            .cookie(cookie)
            .set_json(json!({ "name": "Renamed" }))
            .to_request();
        let res = actix_test::call_service(&app, request).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["name"], "Renamed");
        assert_eq!(body["number"], "NH-44");
    }

    #[actix_web::test]
    async fn highway_segments_follow_the_division_scope() {
        let ctx = test_context().await;
        ctx.segment(&ctx.office, 0.0, 10.0).await;
        ctx.segment(&ctx.other_office, 10.0, 20.0).await;
        let username = ctx.division_user(&ctx.office, "hyd").await;
        let id = ctx.highway.id;
        let app = actix_test::init_service(test_app(ctx.state)).await;

        let uri = format!("/api/v1/highways/{id}/segments");
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(&username).to_request()).await,
        );
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).cookie(cookie).to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn unknown_highways_are_not_found() {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let uri = format!("/api/v1/highways/{}", crate::domain::HighwayId::random());
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
