//! Domain primitives, aggregates and services.
//!
//! Purpose: model highways, the offices that maintain them, the chainage
//! segments each office owns and the configuration details laid inside
//! those segments. The [`Registry`] keeps the chainage invariants whole;
//! [`CorridorService`] applies the access rules for a [`Caller`].
//!
//! Public surface:
//! - [`ChainageRange`]: kilometre interval with half-open overlap semantics.
//! - [`Error`] and [`ErrorCode`]: transport-agnostic failure payload.
//! - [`Registry`]: validated, write-through store of every entity.
//! - [`CorridorService`]: authorising facade used by inbound adapters.
//! - [`AuthenticationService`]: credential checks for login.

pub mod access;
pub mod authentication;
pub mod chainage;
pub mod configuration;
pub mod corridor_service;
pub mod error;
pub mod highway;
pub mod ids;
pub mod ports;
pub mod registry;
pub mod reports;
pub mod segment;
mod text;
pub mod trace_id;
pub mod user;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use self::access::Caller;
pub use self::authentication::{AuthenticationService, LoginCredentials, LoginValidationError};
pub use self::chainage::{ChainageRange, ChainageRangeError};
pub use self::configuration::{
    ConfigurationDetail, ConfigurationType, ConfigurationTypeDraft, DetailDraft, DetailPatch,
};
pub use self::corridor_service::CorridorService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::highway::{Highway, HighwayDraft, Office, OfficeDraft};
pub use self::ids::{ConfigurationTypeId, DetailId, HighwayId, OfficeId, SegmentId, UserId};
pub use self::registry::Registry;
pub use self::segment::{GeoPoint, Segment, SegmentDraft, SegmentPatch, SegmentStatus};
pub use self::text::BlankFieldError;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Role, RoleError, User, UserDraft};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use corridor::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::unauthorized("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
