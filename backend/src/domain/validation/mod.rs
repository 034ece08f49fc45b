//! Chainage validation engine.
//!
//! Inline checks run inside every registry write and only look at the
//! candidate's direct siblings. The order of checks is fixed: an unusable
//! range is reported first, then containment in the parent segment, then
//! overlap with a sibling. Full-registry audits live in [`sweep`].

pub mod sweep;

use serde_json::json;

use super::chainage::ChainageRangeError;
use super::{ChainageRange, ConfigurationDetail, DetailId, Error, Segment, SegmentId};

/// A rejected chainage write, carrying the bounds a caller needs to fix it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChainageViolation {
    /// The requested range is empty, inverted, negative or not finite.
    #[error("chainage {start} to {end} is not a valid range: {reason}")]
    RangeInvalid {
        /// Requested start.
        start: f64,
        /// Requested end.
        end: f64,
        /// Why the bounds were refused.
        reason: ChainageRangeError,
    },
    /// A detail does not fit inside its segment.
    #[error("chainage must be within segment boundaries ({bounds}); requested {range}")]
    OutOfBounds {
        /// Requested detail range.
        range: ChainageRange,
        /// Parent segment range.
        bounds: ChainageRange,
        /// Parent segment.
        segment_id: SegmentId,
    },
    /// Resizing a segment would strand one of its details.
    #[error("segment range {range} would no longer contain detail {detail_id} ({detail_range})")]
    StrandsDetail {
        /// Requested segment range.
        range: ChainageRange,
        /// First detail left outside.
        detail_id: DetailId,
        /// That detail's range.
        detail_range: ChainageRange,
    },
    /// A segment overlaps another segment of the same highway and office.
    #[error("chainage {range} overlaps segment {conflicting_id} ({conflicting_range})")]
    SegmentOverlap {
        /// Requested range.
        range: ChainageRange,
        /// Existing segment.
        conflicting_id: SegmentId,
        /// Existing segment's range.
        conflicting_range: ChainageRange,
    },
    /// A detail overlaps another detail of the same segment.
    #[error("chainage {range} overlaps configuration detail {conflicting_id} ({conflicting_range})")]
    DetailOverlap {
        /// Requested range.
        range: ChainageRange,
        /// Existing detail.
        conflicting_id: DetailId,
        /// Existing detail's range.
        conflicting_range: ChainageRange,
    },
}

fn bounds_json(range: &ChainageRange) -> serde_json::Value {
    json!({ "start": range.start, "end": range.end })
}

impl From<ChainageViolation> for Error {
    fn from(value: ChainageViolation) -> Self {
        let message = value.to_string();
        match value {
            ChainageViolation::RangeInvalid { start, end, .. } => Self::range_invalid(message)
                .with_details(json!({ "range": { "start": start, "end": end } })),
            ChainageViolation::OutOfBounds {
                range,
                bounds,
                segment_id,
            } => Self::out_of_bounds(message).with_details(json!({
                "range": bounds_json(&range),
                "bounds": bounds_json(&bounds),
                "segmentId": segment_id,
            })),
            ChainageViolation::StrandsDetail {
                range,
                detail_id,
                detail_range,
            } => Self::out_of_bounds(message).with_details(json!({
                "range": bounds_json(&range),
                "detailId": detail_id,
                "detailRange": bounds_json(&detail_range),
            })),
            ChainageViolation::SegmentOverlap {
                range,
                conflicting_id,
                conflicting_range,
            } => Self::overlap_conflict(message).with_details(json!({
                "range": bounds_json(&range),
                "conflictingSegmentId": conflicting_id,
                "conflictingRange": bounds_json(&conflicting_range),
            })),
            ChainageViolation::DetailOverlap {
                range,
                conflicting_id,
                conflicting_range,
            } => Self::overlap_conflict(message).with_details(json!({
                "range": bounds_json(&range),
                "conflictingDetailId": conflicting_id,
                "conflictingRange": bounds_json(&conflicting_range),
            })),
        }
    }
}

/// Reject ranges that are empty, inverted, negative or not finite.
pub fn check_range(range: &ChainageRange) -> Result<(), ChainageViolation> {
    ChainageRange::new(range.start, range.end)
        .map(|_| ())
        .map_err(|reason| ChainageViolation::RangeInvalid {
            start: range.start,
            end: range.end,
            reason,
        })
}

/// Validate a new or changed segment against existing segments.
///
/// `existing` may contain the candidate itself and segments of other
/// highways or offices; both are skipped.
pub fn check_segment<'a, I>(candidate: &Segment, existing: I) -> Result<(), ChainageViolation>
where
    I: IntoIterator<Item = &'a Segment>,
{
    check_range(&candidate.range)?;
    let conflict = existing
        .into_iter()
        .filter(|other| {
            other.id != candidate.id
                && other.highway_id == candidate.highway_id
                && other.office_id == candidate.office_id
                && other.range.overlaps(&candidate.range)
        })
        .min_by(|a, b| a.range.start.total_cmp(&b.range.start));
    match conflict {
        Some(other) => Err(ChainageViolation::SegmentOverlap {
            range: candidate.range,
            conflicting_id: other.id,
            conflicting_range: other.range,
        }),
        None => Ok(()),
    }
}

/// Ensure a resized segment still contains every attached detail.
pub fn check_segment_keeps_details<'a, I>(
    candidate: &Segment,
    details: I,
) -> Result<(), ChainageViolation>
where
    I: IntoIterator<Item = &'a ConfigurationDetail>,
{
    let stranded = details
        .into_iter()
        .filter(|detail| detail.segment_id == candidate.id)
        .filter(|detail| !candidate.range.contains(&detail.range))
        .min_by(|a, b| a.range.start.total_cmp(&b.range.start));
    match stranded {
        Some(detail) => Err(ChainageViolation::StrandsDetail {
            range: candidate.range,
            detail_id: detail.id,
            detail_range: detail.range,
        }),
        None => Ok(()),
    }
}

/// Validate a new or changed detail against its parent and siblings.
pub fn check_detail<'a, I>(
    candidate: &ConfigurationDetail,
    parent: &Segment,
    siblings: I,
) -> Result<(), ChainageViolation>
where
    I: IntoIterator<Item = &'a ConfigurationDetail>,
{
    check_range(&candidate.range)?;
    if !parent.range.contains(&candidate.range) {
        return Err(ChainageViolation::OutOfBounds {
            range: candidate.range,
            bounds: parent.range,
            segment_id: parent.id,
        });
    }
    let conflict = siblings
        .into_iter()
        .filter(|other| {
            other.id != candidate.id
                && other.segment_id == candidate.segment_id
                && other.range.overlaps(&candidate.range)
        })
        .min_by(|a, b| a.range.start.total_cmp(&b.range.start));
    match conflict {
        Some(other) => Err(ChainageViolation::DetailOverlap {
            range: candidate.range,
            conflicting_id: other.id,
            conflicting_range: other.range,
        }),
        None => Ok(()),
    }
}
