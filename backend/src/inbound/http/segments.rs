//! Segment handlers.
//!
//! Reads follow the caller's office scope; writes are for central
//! administrators. Every write passes the registry's chainage checks, so a
//! `409` carries the conflicting segment and its bounds.
//!
//! ```text
//! GET /api/v1/segments
//! POST /api/v1/segments
//! GET /api/v1/segments/{segment_id}
//! PATCH /api/v1/segments/{segment_id}
//! DELETE /api/v1/segments/{segment_id}
//! GET /api/v1/segments/{segment_id}/details
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ConfigurationDetail, Error, GeoPoint, HighwayId, OfficeId, Segment, SegmentDraft, SegmentId,
    SegmentPatch, SegmentStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, requested_range};

const SEGMENT_ID: FieldName = FieldName::new("segmentId");

/// Request body for `POST /api/v1/segments`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSegmentRequest {
    pub highway_id: HighwayId,
    pub office_id: OfficeId,
    #[schema(example = "Panipat bypass")]
    pub name: String,
    #[schema(example = 0.0)]
    pub start: Option<f64>,
    #[schema(example = 50.0)]
    pub end: Option<f64>,
    pub start_point: Option<GeoPoint>,
    pub end_point: Option<GeoPoint>,
    pub status: Option<SegmentStatus>,
    pub remarks: Option<String>,
}

impl TryFrom<CreateSegmentRequest> for SegmentDraft {
    type Error = Error;

    fn try_from(value: CreateSegmentRequest) -> Result<Self, Self::Error> {
        let range = requested_range(value.start, value.end)?;
        let draft = Self::new(value.highway_id, value.office_id, &value.name, range)?
            .with_endpoints(value.start_point, value.end_point)
            .with_remarks(value.remarks.as_deref());
        Ok(match value.status {
            Some(status) => draft.with_status(status),
            None => draft,
        })
    }
}

/// Segments visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/segments",
    responses((status = 200, description = "Segments", body = [Segment])),
    tags = ["segments"],
    operation_id = "listSegments"
)]
#[get("/segments")]
pub async fn list_segments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Segment>>> {
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.segments(&caller).await))
}

/// Create a segment.
#[utoipa::path(
    post,
    path = "/api/v1/segments",
    request_body = CreateSegmentRequest,
    responses(
        (status = 201, description = "Segment created", body = Segment),
        (status = 400, description = "Invalid range or request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 404, description = "Unknown highway or office", body = Error),
        (status = 409, description = "Overlaps an existing segment", body = Error)
    ),
    tags = ["segments"],
    operation_id = "createSegment"
)]
#[post("/segments")]
pub async fn create_segment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateSegmentRequest>,
) -> ApiResult<HttpResponse> {
    let caller = state.caller(&session).await?;
    let draft = SegmentDraft::try_from(payload.into_inner())?;
    let segment = state.corridor.create_segment(&caller, draft).await?;
    Ok(HttpResponse::Created().json(segment))
}

/// One segment; segments of another office read as missing.
#[utoipa::path(
    get,
    path = "/api/v1/segments/{segment_id}",
    params(("segment_id" = String, Path, description = "Segment identifier")),
    responses(
        (status = 200, description = "Segment", body = Segment),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown or hidden segment", body = Error)
    ),
    tags = ["segments"],
    operation_id = "getSegment"
)]
#[get("/segments/{segment_id}")]
pub async fn get_segment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Segment>> {
    let id: SegmentId = parse_id(&path, SEGMENT_ID)?;
    let caller = state.caller(&session).await?;
    Ok(web::Json(state.corridor.segment(&caller, id).await?))
}

/// Change a segment; omitted fields stay as they are.
#[utoipa::path(
    patch,
    path = "/api/v1/segments/{segment_id}",
    request_body = SegmentPatch,
    params(("segment_id" = String, Path, description = "Segment identifier")),
    responses(
        (status = 200, description = "Updated segment", body = Segment),
        (status = 400, description = "Invalid range or request", body = Error),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 404, description = "Unknown segment", body = Error),
        (status = 409, description = "Overlaps an existing segment", body = Error)
    ),
    tags = ["segments"],
    operation_id = "updateSegment"
)]
#[patch("/segments/{segment_id}")]
pub async fn update_segment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SegmentPatch>,
) -> ApiResult<web::Json<Segment>> {
    let id: SegmentId = parse_id(&path, SEGMENT_ID)?;
    let caller = state.caller(&session).await?;
    let segment = state.corridor.update_segment(&caller, id, &payload).await?;
    Ok(web::Json(segment))
}

/// Delete a segment together with its details.
#[utoipa::path(
    delete,
    path = "/api/v1/segments/{segment_id}",
    params(("segment_id" = String, Path, description = "Segment identifier")),
    responses(
        (status = 204, description = "Segment deleted"),
        (status = 403, description = "Caller is not a central administrator", body = Error),
        (status = 404, description = "Unknown segment", body = Error)
    ),
    tags = ["segments"],
    operation_id = "deleteSegment"
)]
#[delete("/segments/{segment_id}")]
pub async fn delete_segment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id: SegmentId = parse_id(&path, SEGMENT_ID)?;
    let caller = state.caller(&session).await?;
    state.corridor.delete_segment(&caller, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Details of a segment ordered by start chainage.
#[utoipa::path(
    get,
    path = "/api/v1/segments/{segment_id}/details",
    params(("segment_id" = String, Path, description = "Segment identifier")),
    responses(
        (status = 200, description = "Configuration details", body = [ConfigurationDetail]),
        (status = 400, description = "Invalid identifier", body = Error),
        (status = 404, description = "Unknown or hidden segment", body = Error)
    ),
    tags = ["segments"],
    operation_id = "listSegmentDetails"
)]
#[get("/segments/{segment_id}/details")]
pub async fn list_segment_details(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ConfigurationDetail>>> {
    let id: SegmentId = parse_id(&path, SEGMENT_ID)?;
    let caller = state.caller(&session).await?;
    let details = state.corridor.details_for_segment(&caller, id).await?;
    Ok(web::Json(details))
}
