//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the domain
//! types they exchange and the session cookie security scheme. Swagger UI
//! serves it in debug builds; `cargo run --bin openapi-dump` exports it.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::reports::{
    ConfigurationDetailRow, ConfigurationStatistics, HighwayConfigurationTotal, OfficeWorkload,
    UserActivity,
};
use crate::domain::validation::sweep::{
    ChainageGap, DetailOverlap, DetailSummary, OutOfBoundsDetail, SegmentOverlap, SegmentSummary,
};
use crate::domain::{
    ChainageRange, ConfigurationDetail, ConfigurationType, DetailPatch, Error, ErrorCode, GeoPoint,
    Highway, Office, Role, Segment, SegmentPatch, SegmentStatus, User,
};
use crate::inbound::http::{details, highways, reference_data, segments, users};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Corridor registry API",
        description = "Highway chainage registry: segments, configuration details, validation sweeps and reports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::highways::list_highways,
        crate::inbound::http::highways::create_highway,
        crate::inbound::http::highways::get_highway,
        crate::inbound::http::highways::rename_highway,
        crate::inbound::http::highways::list_highway_segments,
        crate::inbound::http::reference_data::list_offices,
        crate::inbound::http::reference_data::create_office,
        crate::inbound::http::reference_data::list_configuration_types,
        crate::inbound::http::reference_data::create_configuration_type,
        crate::inbound::http::segments::list_segments,
        crate::inbound::http::segments::create_segment,
        crate::inbound::http::segments::get_segment,
        crate::inbound::http::segments::update_segment,
        crate::inbound::http::segments::delete_segment,
        crate::inbound::http::segments::list_segment_details,
        crate::inbound::http::details::create_detail,
        crate::inbound::http::details::get_detail,
        crate::inbound::http::details::update_detail,
        crate::inbound::http::details::delete_detail,
        crate::inbound::http::sweeps::overlapping_segments,
        crate::inbound::http::sweeps::overlapping_details,
        crate::inbound::http::sweeps::out_of_bounds_details,
        crate::inbound::http::sweeps::chainage_gaps,
        crate::inbound::http::reports::highway_configurations,
        crate::inbound::http::reports::office_workload,
        crate::inbound::http::reports::configuration_statistics,
        crate::inbound::http::reports::configuration_details,
        crate::inbound::http::reports::user_activity,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        User,
        Role,
        Highway,
        Office,
        ConfigurationType,
        ConfigurationDetail,
        Segment,
        SegmentStatus,
        GeoPoint,
        ChainageRange,
        SegmentPatch,
        DetailPatch,
        SegmentSummary,
        DetailSummary,
        SegmentOverlap,
        DetailOverlap,
        OutOfBoundsDetail,
        ChainageGap,
        HighwayConfigurationTotal,
        OfficeWorkload,
        ConfigurationStatistics,
        ConfigurationDetailRow,
        UserActivity,
        users::LoginRequest,
        users::CreateUserRequest,
        users::UpdateUserRequest,
        highways::CreateHighwayRequest,
        highways::RenameHighwayRequest,
        reference_data::CreateOfficeRequest,
        reference_data::CreateConfigurationTypeRequest,
        segments::CreateSegmentRequest,
        details::CreateDetailRequest,
    )),
    tags(
        (name = "users", description = "Sessions and user management"),
        (name = "highways", description = "Highway reference data"),
        (name = "reference-data", description = "Offices and configuration types"),
        (name = "segments", description = "Chainage segments owned by offices"),
        (name = "details", description = "Configuration details inside segments"),
        (name = "validation", description = "Registry-wide consistency sweeps"),
        (name = "reports", description = "Aggregated registry reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
