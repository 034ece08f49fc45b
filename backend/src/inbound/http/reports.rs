//! Report handlers.
//!
//! Reports need a session and follow the division scope. The user activity
//! report is for central administrators.
//!
//! ```text
//! GET /api/v1/reports/highway-configurations?highwayNumber=NH-44
//! GET /api/v1/reports/office-workload?divisionName=Hyderabad
//! GET /api/v1/reports/configuration-statistics
//! GET /api/v1/reports/configuration-details?highwayId=...&configurationTypeId=...
//! GET /api/v1/reports/user-activity
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::reports::{
    ConfigurationDetailRow, ConfigurationStatistics, DetailListingFilter,
    HighwayConfigurationTotal, OfficeWorkload, UserActivity,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query for the highway configuration report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HighwayConfigurationQuery {
    /// Only this route number.
    pub highway_number: Option<String>,
}

/// Query for the office workload report.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OfficeWorkloadQuery {
    /// Only offices of this division.
    pub division_name: Option<String>,
}

/// Kilometres and section counts per highway and build standard.
#[utoipa::path(
    get,
    path = "/api/v1/reports/highway-configurations",
    params(HighwayConfigurationQuery),
    responses(
        (status = 200, description = "Totals", body = [HighwayConfigurationTotal]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["reports"],
    operation_id = "highwayConfigurationReport"
)]
#[get("/reports/highway-configurations")]
pub async fn highway_configurations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<HighwayConfigurationQuery>,
) -> ApiResult<web::Json<Vec<HighwayConfigurationTotal>>> {
    let caller = state.caller(&session).await?;
    let rows = state
        .corridor
        .highway_configuration_totals(&caller, query.highway_number.as_deref())
        .await?;
    Ok(web::Json(rows))
}

/// Segments, highways and kilometres owned by each office.
#[utoipa::path(
    get,
    path = "/api/v1/reports/office-workload",
    params(OfficeWorkloadQuery),
    responses(
        (status = 200, description = "Workload", body = [OfficeWorkload]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["reports"],
    operation_id = "officeWorkloadReport"
)]
#[get("/reports/office-workload")]
pub async fn office_workload(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OfficeWorkloadQuery>,
) -> ApiResult<web::Json<Vec<OfficeWorkload>>> {
    let caller = state.caller(&session).await?;
    let rows = state
        .corridor
        .office_workload(&caller, query.division_name.as_deref())
        .await?;
    Ok(web::Json(rows))
}

/// Length statistics per build standard.
#[utoipa::path(
    get,
    path = "/api/v1/reports/configuration-statistics",
    responses(
        (status = 200, description = "Statistics", body = [ConfigurationStatistics]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["reports"],
    operation_id = "configurationStatisticsReport"
)]
#[get("/reports/configuration-statistics")]
pub async fn configuration_statistics(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ConfigurationStatistics>>> {
    let caller = state.caller(&session).await?;
    Ok(web::Json(
        state.corridor.configuration_statistics(&caller).await?,
    ))
}

/// Every detail with its highway, segment and office.
#[utoipa::path(
    get,
    path = "/api/v1/reports/configuration-details",
    params(DetailListingFilter),
    responses(
        (status = 200, description = "Detail listing", body = [ConfigurationDetailRow]),
        (status = 401, description = "No session", body = Error)
    ),
    tags = ["reports"],
    operation_id = "configurationDetailReport"
)]
#[get("/reports/configuration-details")]
pub async fn configuration_details(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<DetailListingFilter>,
) -> ApiResult<web::Json<Vec<ConfigurationDetailRow>>> {
    let caller = state.caller(&session).await?;
    let rows = state
        .corridor
        .configuration_detail_listing(&caller, query.into_inner())
        .await?;
    Ok(web::Json(rows))
}

/// Login activity of every user.
#[utoipa::path(
    get,
    path = "/api/v1/reports/user-activity",
    responses(
        (status = 200, description = "User activity", body = [UserActivity]),
        (status = 401, description = "No session", body = Error),
        (status = 403, description = "Not a central administrator", body = Error)
    ),
    tags = ["reports"],
    operation_id = "userActivityReport"
)]
#[get("/reports/user-activity")]
pub async fn user_activity(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserActivity>>> {
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.user_activity(&caller).await?))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;

    use crate::domain::{ChainageRange, DetailDraft};
    use crate::inbound::http::test_utils::{
        ADMIN, TestContext, login_request, session_cookie, test_app, test_context,
    };

    async fn seeded() -> TestContext {
        let ctx = test_context().await;
        for office in [&ctx.office, &ctx.other_office] {
            let segment = ctx.segment(office, 0.0, 50.0).await;
            for (start, end) in [(0.0, 20.0), (20.0, 45.0)] {
                ctx.state
                    .corridor
                    .create_detail(
                        &ctx.central,
                        DetailDraft::new(
                            segment.id,
                            ctx.kind.id,
                            ChainageRange::unchecked(start, end),
                            None,
                        ),
                    )
                    .await
                    .expect("seed detail");
            }
        }
        ctx
    }

    fn get(uri: &str, cookie: &Cookie<'static>) -> actix_test::TestRequest {
        actix_test::TestRequest::get().uri(uri).cookie(cookie.clone())
    }

    #[actix_web::test]
    async fn highway_totals_add_touching_details() {
        let ctx = seeded().await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let res = actix_test::call_service(
            &app,
            get("/api/v1/reports/highway-configurations?highwayNumber=NH-44", &cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["totalLengthKm"], 90.0);
        assert_eq!(body[0]["sectionCount"], 4);
    }

    #[actix_web::test]
    async fn division_reports_cover_their_office_only() {
        let ctx = seeded().await;
        let username = ctx.division_user(&ctx.office, "hyd").await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(&username).to_request()).await,
        );

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            get("/api/v1/reports/office-workload", &cookie).to_request(),
        )
        .await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["officeName"], "Office 1");

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            get("/api/v1/reports/configuration-details", &cookie).to_request(),
        )
        .await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let res = actix_test::call_service(
            &app,
            get("/api/v1/reports/user-activity", &cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn central_admins_see_user_activity() {
        let ctx = seeded().await;
        ctx.division_user(&ctx.office, "hyd").await;
        let app = actix_test::init_service(test_app(ctx.state)).await;
        let cookie = session_cookie(
            &actix_test::call_service(&app, login_request(ADMIN).to_request()).await,
        );
        let body: Value = actix_test::call_and_read_body_json(
            &app,
            get("/api/v1/reports/user-activity", &cookie).to_request(),
        )
        .await;
        assert_eq!(body.as_array().map(Vec::len), Some(2));

        let body: Value = actix_test::call_and_read_body_json(
            &app,
            get("/api/v1/reports/configuration-statistics", &cookie).to_request(),
        )
        .await;
        assert_eq!(body[0]["sectionCount"], 4);
    }
}
