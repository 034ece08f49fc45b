//! Office-owned chainage segments of a highway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text::{BlankFieldError, optional, required};
use super::{ChainageRange, HighwayId, OfficeId, SegmentId, UserId};

/// Lifecycle status of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    /// In service.
    #[default]
    Active,
    /// Retained for history but no longer maintained.
    Inactive,
}

impl SegmentStatus {
    /// Persisted text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parse the persisted text form.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Latitude/longitude pair recorded at a segment endpoint.
///
/// Informational only; no interval rule reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
}

/// A `[start, end)` stretch of one highway owned by one office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Stable identifier.
    pub id: SegmentId,
    /// Highway the segment lies on.
    pub highway_id: HighwayId,
    /// Owning office.
    pub office_id: OfficeId,
    /// Free-text name.
    #[schema(example = "Panipat bypass")]
    pub name: String,
    /// Chainage covered by the segment.
    pub range: ChainageRange,
    /// Coordinates at `range.start`.
    pub start_point: Option<GeoPoint>,
    /// Coordinates at `range.end`.
    pub end_point: Option<GeoPoint>,
    /// Lifecycle status.
    pub status: SegmentStatus,
    /// Optional remarks.
    pub remarks: Option<String>,
    /// User that created the segment.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a [`Segment`].
///
/// The range is carried as submitted; the validation engine decides whether
/// it is usable so that every rejection flows through one ordering.
///
/// # Examples
/// ```
/// use corridor::domain::{ChainageRange, HighwayId, OfficeId, SegmentDraft};
///
/// let draft = SegmentDraft::new(
///     HighwayId::random(),
///     OfficeId::random(),
///     "Km 0 to 50",
///     ChainageRange::unchecked(0.0, 50.0),
/// )
/// .unwrap()
/// .with_remarks(Some("four lane"));
/// assert_eq!(draft.remarks(), Some("four lane"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDraft {
    highway_id: HighwayId,
    office_id: OfficeId,
    name: String,
    range: ChainageRange,
    start_point: Option<GeoPoint>,
    end_point: Option<GeoPoint>,
    status: SegmentStatus,
    remarks: Option<String>,
}

impl SegmentDraft {
    /// Validate the name and capture the requested placement.
    pub fn new(
        highway_id: HighwayId,
        office_id: OfficeId,
        name: &str,
        range: ChainageRange,
    ) -> Result<Self, BlankFieldError> {
        Ok(Self {
            highway_id,
            office_id,
            name: required("name", name)?,
            range,
            start_point: None,
            end_point: None,
            status: SegmentStatus::Active,
            remarks: None,
        })
    }

    /// Attach endpoint coordinates.
    #[must_use]
    pub fn with_endpoints(mut self, start: Option<GeoPoint>, end: Option<GeoPoint>) -> Self {
        self.start_point = start;
        self.end_point = end;
        self
    }

    /// Attach remarks; blank input is dropped.
    #[must_use]
    pub fn with_remarks(mut self, remarks: Option<&str>) -> Self {
        self.remarks = optional(remarks);
        self
    }

    /// Override the initial status.
    #[must_use]
    pub fn with_status(mut self, status: SegmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Target highway.
    pub fn highway_id(&self) -> HighwayId {
        self.highway_id
    }

    /// Owning office.
    pub fn office_id(&self) -> OfficeId {
        self.office_id
    }

    /// Requested range.
    pub fn range(&self) -> ChainageRange {
        self.range
    }

    /// Remarks after trimming.
    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub(crate) fn into_segment(
        self,
        id: SegmentId,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Segment {
        Segment {
            id,
            highway_id: self.highway_id,
            office_id: self.office_id,
            name: self.name,
            range: self.range,
            start_point: self.start_point,
            end_point: self.end_point,
            status: self.status,
            remarks: self.remarks,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a [`Segment`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentPatch {
    /// Move the segment to another highway.
    pub highway_id: Option<HighwayId>,
    /// Reassign the owning office.
    pub office_id: Option<OfficeId>,
    /// Rename the segment.
    pub name: Option<String>,
    /// New start chainage.
    pub start: Option<f64>,
    /// New end chainage.
    pub end: Option<f64>,
    /// Replace the start coordinates.
    pub start_point: Option<GeoPoint>,
    /// Replace the end coordinates.
    pub end_point: Option<GeoPoint>,
    /// Change the lifecycle status.
    pub status: Option<SegmentStatus>,
    /// Replace the remarks; an empty string clears them.
    pub remarks: Option<String>,
}

impl SegmentPatch {
    /// Apply the patch to a copy of `current`, validating text fields.
    pub(crate) fn apply(
        &self,
        current: &Segment,
        now: DateTime<Utc>,
    ) -> Result<Segment, BlankFieldError> {
        let mut next = current.clone();
        if let Some(name) = &self.name {
            next.name = required("name", name)?;
        }
        if let Some(highway_id) = self.highway_id {
            next.highway_id = highway_id;
        }
        if let Some(office_id) = self.office_id {
            next.office_id = office_id;
        }
        next.range = current.range.with_bounds(self.start, self.end);
        if self.start_point.is_some() {
            next.start_point = self.start_point;
        }
        if self.end_point.is_some() {
            next.end_point = self.end_point;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(remarks) = &self.remarks {
            next.remarks = optional(Some(remarks));
        }
        next.updated_at = now;
        Ok(next)
    }
}
