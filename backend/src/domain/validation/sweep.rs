//! Read-only consistency sweeps over a registry snapshot.
//!
//! Inline checks keep the registry consistent, but rows imported from
//! outside the engine may not be. Sweeps report such inconsistencies as data
//! and never repair them. Every result is sorted by highway number, then
//! start chainage, then identifier, so repeated sweeps are identical.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::RegistrySnapshot;
use crate::domain::{
    ChainageRange, ConfigurationDetail, ConfigurationTypeId, DetailId, Highway, HighwayId,
    OfficeId, Segment, SegmentId,
};

/// Minimal view of a segment inside a sweep finding.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    /// Segment identifier.
    pub id: SegmentId,
    /// Segment name.
    pub name: String,
    /// Segment range.
    pub range: ChainageRange,
}

impl From<&Segment> for SegmentSummary {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            name: segment.name.clone(),
            range: segment.range,
        }
    }
}

/// Minimal view of a detail inside a sweep finding.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailSummary {
    /// Detail identifier.
    pub id: DetailId,
    /// Build standard.
    pub configuration_type_id: ConfigurationTypeId,
    /// Detail range.
    pub range: ChainageRange,
}

impl From<&ConfigurationDetail> for DetailSummary {
    fn from(detail: &ConfigurationDetail) -> Self {
        Self {
            id: detail.id,
            configuration_type_id: detail.configuration_type_id,
            range: detail.range,
        }
    }
}

/// Two segments of one highway and office that share chainage.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SegmentOverlap {
    /// Highway both segments lie on.
    pub highway_id: HighwayId,
    /// Route number, empty when the highway row is missing.
    pub highway_number: String,
    /// Owning office.
    pub office_id: OfficeId,
    /// Segment with the lower start.
    pub first: SegmentSummary,
    /// Segment with the higher start.
    pub second: SegmentSummary,
    /// Shared interval.
    pub overlap: ChainageRange,
}

/// Two details of one segment that share chainage.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailOverlap {
    /// Highway of the parent segment.
    pub highway_id: HighwayId,
    /// Route number, empty when the highway row is missing.
    pub highway_number: String,
    /// Parent segment.
    pub segment: SegmentSummary,
    /// Detail with the lower start.
    pub first: DetailSummary,
    /// Detail with the higher start.
    pub second: DetailSummary,
    /// Shared interval.
    pub overlap: ChainageRange,
}

/// A detail that extends past its parent segment.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutOfBoundsDetail {
    /// Highway of the parent segment.
    pub highway_id: HighwayId,
    /// Route number, empty when the highway row is missing.
    pub highway_number: String,
    /// Parent segment.
    pub segment: SegmentSummary,
    /// Offending detail.
    pub detail: DetailSummary,
}

/// Uncovered chainage between consecutive segments of a highway.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChainageGap {
    /// Highway checked.
    pub highway_id: HighwayId,
    /// Uncovered interval.
    pub gap: ChainageRange,
    /// Segment ending where the gap starts.
    pub before: SegmentId,
    /// Segment starting where the gap ends.
    pub after: SegmentId,
}

fn by_start(a: &ChainageRange, b: &ChainageRange) -> Ordering {
    a.start
        .total_cmp(&b.start)
        .then_with(|| a.end.total_cmp(&b.end))
}

fn intersection(a: &ChainageRange, b: &ChainageRange) -> ChainageRange {
    ChainageRange::unchecked(a.start.max(b.start), a.end.min(b.end))
}

struct Lookup<'a> {
    numbers: HashMap<HighwayId, &'a str>,
    segments: HashMap<SegmentId, &'a Segment>,
}

impl<'a> Lookup<'a> {
    fn new(snapshot: &'a RegistrySnapshot) -> Self {
        Self {
            numbers: snapshot
                .highways
                .iter()
                .map(|highway: &Highway| (highway.id, highway.number.as_str()))
                .collect(),
            segments: snapshot
                .segments
                .iter()
                .map(|segment| (segment.id, segment))
                .collect(),
        }
    }

    fn number(&self, highway_id: HighwayId) -> String {
        self.numbers
            .get(&highway_id)
            .map(|number| (*number).to_owned())
            .unwrap_or_default()
    }
}

/// Pairs of segments that share highway and office and overlap.
#[must_use]
pub fn find_overlapping_segments(snapshot: &RegistrySnapshot) -> Vec<SegmentOverlap> {
    let lookup = Lookup::new(snapshot);
    let mut groups: HashMap<(HighwayId, OfficeId), Vec<&Segment>> = HashMap::new();
    for segment in &snapshot.segments {
        groups
            .entry((segment.highway_id, segment.office_id))
            .or_default()
            .push(segment);
    }

    let mut findings = Vec::new();
    for ((highway_id, office_id), mut members) in groups {
        members.sort_by(|a, b| by_start(&a.range, &b.range).then_with(|| a.id.cmp(&b.id)));
        for (index, first) in members.iter().enumerate() {
            // Sorted by start: once a later segment starts at or past our
            // end, no further one can overlap.
            for second in members
                .iter()
                .skip(index + 1)
                .take_while(|other| other.range.start < first.range.end)
                .filter(|other| other.range.overlaps(&first.range))
            {
                findings.push(SegmentOverlap {
                    highway_id,
                    highway_number: lookup.number(highway_id),
                    office_id,
                    first: SegmentSummary::from(*first),
                    second: SegmentSummary::from(*second),
                    overlap: intersection(&first.range, &second.range),
                });
            }
        }
    }
    findings.sort_by(|a, b| {
        a.highway_number
            .cmp(&b.highway_number)
            .then_with(|| by_start(&a.first.range, &b.first.range))
            .then_with(|| a.first.id.cmp(&b.first.id))
            .then_with(|| a.second.id.cmp(&b.second.id))
    });
    findings
}

/// Pairs of details on the same segment that overlap, whatever their type.
#[must_use]
pub fn find_overlapping_configuration_details(snapshot: &RegistrySnapshot) -> Vec<DetailOverlap> {
    let lookup = Lookup::new(snapshot);
    let mut groups: HashMap<SegmentId, Vec<&ConfigurationDetail>> = HashMap::new();
    for detail in &snapshot.details {
        groups.entry(detail.segment_id).or_default().push(detail);
    }

    let mut findings = Vec::new();
    for (segment_id, mut members) in groups {
        let Some(segment) = lookup.segments.get(&segment_id) else {
            continue;
        };
        members.sort_by(|a, b| by_start(&a.range, &b.range).then_with(|| a.id.cmp(&b.id)));
        for (index, first) in members.iter().enumerate() {
            for second in members
                .iter()
                .skip(index + 1)
                .take_while(|other| other.range.start < first.range.end)
                .filter(|other| other.range.overlaps(&first.range))
            {
                findings.push(DetailOverlap {
                    highway_id: segment.highway_id,
                    highway_number: lookup.number(segment.highway_id),
                    segment: SegmentSummary::from(*segment),
                    first: DetailSummary::from(*first),
                    second: DetailSummary::from(*second),
                    overlap: intersection(&first.range, &second.range),
                });
            }
        }
    }
    findings.sort_by(|a, b| {
        a.highway_number
            .cmp(&b.highway_number)
            .then_with(|| by_start(&a.segment.range, &b.segment.range))
            .then_with(|| a.segment.id.cmp(&b.segment.id))
            .then_with(|| by_start(&a.first.range, &b.first.range))
            .then_with(|| a.first.id.cmp(&b.first.id))
            .then_with(|| a.second.id.cmp(&b.second.id))
    });
    findings
}

/// Details whose range is not contained by their parent segment.
#[must_use]
pub fn find_out_of_bounds_details(snapshot: &RegistrySnapshot) -> Vec<OutOfBoundsDetail> {
    let lookup = Lookup::new(snapshot);
    let mut findings: Vec<OutOfBoundsDetail> = snapshot
        .details
        .iter()
        .filter_map(|detail| {
            let segment = lookup.segments.get(&detail.segment_id)?;
            (!segment.range.contains(&detail.range)).then(|| OutOfBoundsDetail {
                highway_id: segment.highway_id,
                highway_number: lookup.number(segment.highway_id),
                segment: SegmentSummary::from(*segment),
                detail: DetailSummary::from(detail),
            })
        })
        .collect();
    findings.sort_by(|a, b| {
        a.highway_number
            .cmp(&b.highway_number)
            .then_with(|| by_start(&a.detail.range, &b.detail.range))
            .then_with(|| a.detail.id.cmp(&b.detail.id))
    });
    findings
}

/// Stretches of a highway not covered by any segment, across all offices.
///
/// Only gaps between the first covered kilometre and the last are listed;
/// where the highway begins and ends is not recorded anywhere.
#[must_use]
pub fn find_chainage_gaps(snapshot: &RegistrySnapshot, highway_id: HighwayId) -> Vec<ChainageGap> {
    let mut segments: Vec<&Segment> = snapshot
        .segments
        .iter()
        .filter(|segment| segment.highway_id == highway_id)
        .collect();
    segments.sort_by(|a, b| by_start(&a.range, &b.range).then_with(|| a.id.cmp(&b.id)));

    let mut gaps = Vec::new();
    let mut iter = segments.into_iter();
    let Some(first) = iter.next() else {
        return gaps;
    };
    let mut reach = first;
    for segment in iter {
        if segment.range.start > reach.range.end {
            gaps.push(ChainageGap {
                highway_id,
                gap: ChainageRange::unchecked(reach.range.end, segment.range.start),
                before: reach.id,
                after: segment.id,
            });
        }
        if segment.range.end > reach.range.end {
            reach = segment;
        }
    }
    gaps
}
