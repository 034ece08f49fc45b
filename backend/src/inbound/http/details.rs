//! Configuration detail handlers.
//!
//! Division users may edit details of their own office's segments. A
//! detail must lie inside its segment and may not overlap a sibling.
//!
//! ```text
//! POST /api/v1/details
//! GET /api/v1/details/{detail_id}
//! PATCH /api/v1/details/{detail_id}
//! DELETE /api/v1/details/{detail_id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ConfigurationDetail, ConfigurationTypeId, DetailDraft, DetailId, DetailPatch, Error,
    SegmentId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, requested_range};

const DETAIL_ID: FieldName = FieldName::new("detailId");

/// Request body for `POST /api/v1/details`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDetailRequest {
    pub segment_id: SegmentId,
    pub configuration_type_id: ConfigurationTypeId,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub remarks: Option<String>,
}

impl TryFrom<CreateDetailRequest> for DetailDraft {
    type Error = Error;

    fn try_from(value: CreateDetailRequest) -> Result<Self, Self::Error> {
        let range = requested_range(value.start, value.end)?;
        Ok(Self::new(
            value.segment_id,
            value.configuration_type_id,
            range,
            value.remarks.as_deref(),
        ))
    }
}

/// Record a configuration detail on a segment.
#[utoipa::path(
    post,
    path = "/api/v1/details",
    request_body = CreateDetailRequest,
    responses(
        (status = 201, description = "Detail created", body = ConfigurationDetail),
        (status = 400, description = "Invalid range or outside the segment", body = Error),
        (status = 403, description = "Caller may not edit this segment", body = Error),
        (status = 404, description = "Unknown segment or configuration type", body = Error),
        (status = 409, description = "Overlaps an existing detail", body = Error)
    ),
    tags = ["details"],
    operation_id = "createDetail"
)]
#[post("/details")]
pub async fn create_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateDetailRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = DetailDraft::try_from(payload.into_inner())?;
    let detail = state.corridor.create_detail(&caller, draft).await?;
    Ok(HttpResponse::Created().json(detail))
}

/// One detail; details of hidden segments read as missing.
#[utoipa::path(
    get,
    path = "/api/v1/details/{detail_id}",
    params(("detail_id" = String, Path, description = "Detail identifier")),
    responses(
        (status = 200, description = "Configuration detail", body = ConfigurationDetail),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown or hidden detail", body = Error)
    ),
    tags = ["details"],
    operation_id = "getDetail"
)]
#[get("/details/{detail_id}")]
pub async fn get_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ConfigurationDetail>> {
    let id: DetailId = parse_id(&path, DETAIL_ID)?;
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.detail(&caller, id).await?))
}

/// Change a detail; it stays on its segment.
#[utoipa::path(
    patch,
    path = "/api/v1/details/{detail_id}",
    request_body = DetailPatch,
    params(("detail_id" = String, Path, description = "Detail identifier")),
    responses(
        (status = 200, description = "Updated detail", body = ConfigurationDetail),
        (status = 400, description = "Invalid range or outside the segment", body = Error),
        (status = 403, description = "Caller may not edit this segment", body = Error),
        (status = 404, description = "Unknown detail", body = Error),
        (status = 409, description = "Overlaps an existing detail", body = Error)
    ),
    tags = ["details"],
    operation_id = "updateDetail"
)]
#[patch("/details/{detail_id}")]
pub async fn update_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<DetailPatch>,
) -> ApiResult<web::Json<ConfigurationDetail>> {
    let id: DetailId = parse_id(&path, DETAIL_ID)?;
    let caller = state.caller(&session).await?;
    let detail = state.corridor.update_detail(&caller, id, &payload).await?;
    Ok(web::Json(detail))
}

/// Remove a detail.
#[utoipa::path(
    delete,
    path = "/api/v1/details/{detail_id}",
    params(("detail_id" = String, Path, description = "Detail identifier")),
    responses(
        (status = 204, description = "Detail deleted"),
        (status = 403, description = "Caller may not edit this segment", body = Error),
        (status = 404, description = "Unknown detail", body = Error)
    ),
    tags = ["details"],
    operation_id = "deleteDetail"
)]
#[delete("/details/{detail_id}")]
pub async fn delete_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: DetailId = parse_id(&path, DETAIL_ID)?;
    let caller = state.caller(&session).await?;
    state.corridor.delete_detail(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}
