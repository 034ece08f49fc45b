//! Validation sweep handlers.
//!
//! Sweeps audit the whole registry for records the inline checks would now
//! refuse. They need a session and follow the division scope; the gap check
//! spans every office.
//!
//! ```text
//! GET /api/v1/validation/overlapping-segments
//! GET /api/v1/validation/overlapping-details
//! GET /api/v1/validation/out-of-bounds
//! GET /api/v1/validation/gaps/{highway_id}
//! ```

use actix_web::{get, web};

use crate::domain::validation::sweep::{
    ChainageGap, DetailOverlap, OutOfBoundsDetail, SegmentOverlap,
};
use crate::domain::{Error, HighwayId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Overlapping segment pairs.
#[utoipa::path(
    get,
    path = "/api/v1/validation/overlapping-segments",
    responses(
        (status = 200, description = "Overlapping segment pairs", body = [SegmentOverlap]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["validation"],
    operation_id = "overlappingSegments"
)]
#[get("/validation/overlapping-segments")]
pub async fn overlapping_segments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<SegmentOverlap>>> {
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.overlapping_segments(&caller).await?))
}

/// Overlapping detail pairs within one segment.
#[utoipa::path(
    get,
    path = "/api/v1/validation/overlapping-details",
    responses(
        (status = 200, description = "Overlapping detail pairs", body = [DetailOverlap]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["validation"],
    operation_id = "overlappingDetails"
)]
#[get("/validation/overlapping-details")]
pub async fn overlapping_details(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DetailOverlap>>> {
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.overlapping_details(&caller).await?))
}

/// Details reaching outside their segment.
#[utoipa::path(
    get,
    path = "/api/v1/validation/out-of-bounds",
    responses(
        (status = 200, description = "Out-of-bounds details", body = [OutOfBoundsDetail]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["validation"],
    operation_id = "outOfBoundsDetails"
)]
#[get("/validation/out-of-bounds")]
pub async fn out_of_bounds_details(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OutOfBoundsDetail>>> {
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.out_of_bounds_details(&caller).await?))
}

/// Uncovered chainage between consecutive segments of a highway.
#[utoipa::path(
    get,
    path = "/api/v1/validation/gaps/{highway_id}",
    params(("highway_id" = String, Path, description = "Highway identifier")),
    responses(
        (status = 200, description = "Chainage gaps", body = [ChainageGap]),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 401, description = "No session", body = Error),
        (status = 404, description = "Unknown highway", body = Error)
    ),
    tags = ["validation"],
    operation_id = "chainageGaps"
)]
#[get("/validation/gaps/{highway_id}")]
pub async fn chainage_gaps(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ChainageGap>>> {
    let highway_id: HighwayId = parse_id(&path, FieldName::new("highwayId"))?;
    let caller = state.caller(&session).await?;
    let gaps = state.corridor.chainage_gaps(&caller, highway_id).await?;
    Ok(web::Json(gaps))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    use crate::inbound::http::test_utils::{
        ADMIN, login_request, session_cookie, test_app, test_context,
    };

    #[rstest]
    #[case("/api/v1/validation/overlapping-segments")]
    #[case("/api/v1/validation/overlapping-details")]
    #[case("/api/v1/validation/out-of-bounds")]
    #[actix_web::test]
    async fn sweeps_need_a_session(#[case] uri: &str) {
        let ctx = test_context().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[case("/api/v1/validation/overlapping-segments")]
    #[case("/api/v1/validation/overlapping-details")]
    #[case("/api/v1/validation/out-of-bounds")]
    #[actix_web::test]
    async fn clean_registries_sweep_empty(#[case] uri: &str) {
        let ctx = test_context().await;
        ctx.segment(&ctx.office, 0.0, 50.0).await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, Value::Array(Vec::new()));
    }

    #[actix_web::test]
    async fn gaps_list_uncovered_stretches() {
        let ctx = test_context().await;
        ctx.segment(&ctx.office, 0.0, 10.0).await;
        ctx.segment(&ctx.other_office, 15.0, 20.0).await;
        let id = ctx.highway.id;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/validation/gaps/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["gap"]["start"], 10.0);
        assert_eq!(body[0]["gap"]["end"], 15.0);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/validation/gaps/{}",
                    crate::domain::HighwayId::random()
                ))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
