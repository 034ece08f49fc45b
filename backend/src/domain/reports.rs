//! Aggregate reports over a registry snapshot.
//!
//! Every report is a pure function of a [`RegistrySnapshot`]. Lengths are
//! summed from raw chainage and rounded with [`round_km`] only when a row is
//! produced.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::chainage::round_km;
use super::ports::RegistrySnapshot;
use super::{
    ChainageRange, ConfigurationType, ConfigurationTypeId, DetailId, Highway, HighwayId, Office,
    OfficeId, Segment, SegmentId, UserId,
};

struct Index<'a> {
    highways: HashMap<HighwayId, &'a Highway>,
    offices: HashMap<OfficeId, &'a Office>,
    segments: HashMap<SegmentId, &'a Segment>,
    kinds: HashMap<ConfigurationTypeId, &'a ConfigurationType>,
}

impl<'a> Index<'a> {
    fn new(snapshot: &'a RegistrySnapshot) -> Self {
        Self {
            highways: snapshot.highways.iter().map(|h| (h.id, h)).collect(),
            offices: snapshot.offices.iter().map(|o| (o.id, o)).collect(),
            segments: snapshot.segments.iter().map(|s| (s.id, s)).collect(),
            kinds: snapshot
                .configuration_types
                .iter()
                .map(|k| (k.id, k))
                .collect(),
        }
    }
}

/// Length and section count of one build standard on one highway.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HighwayConfigurationTotal {
    /// Highway.
    pub highway_id: HighwayId,
    /// Route number.
    pub highway_number: String,
    /// Highway display name.
    pub highway_name: String,
    /// Build standard.
    pub configuration_type_id: ConfigurationTypeId,
    /// Build standard name.
    pub configuration_name: String,
    /// Kilometres, rounded to three decimals.
    pub total_length_km: f64,
    /// Number of details.
    pub section_count: usize,
}

/// Per highway and build standard totals, optionally for one route number.
#[must_use]
pub fn highway_configuration_totals(
    snapshot: &RegistrySnapshot,
    highway_number: Option<&str>,
) -> Vec<HighwayConfigurationTotal> {
    let index = Index::new(snapshot);
    let mut totals: HashMap<(HighwayId, ConfigurationTypeId), (f64, usize)> = HashMap::new();
    for detail in &snapshot.details {
        let Some(segment) = index.segments.get(&detail.segment_id) else {
            continue;
        };
        let entry = totals
            .entry((segment.highway_id, detail.configuration_type_id))
            .or_default();
        entry.0 += detail.range.length();
        entry.1 += 1;
    }

    let mut rows: Vec<HighwayConfigurationTotal> = totals
        .into_iter()
        .filter_map(|((highway_id, type_id), (length, count))| {
            let highway = index.highways.get(&highway_id)?;
            let kind = index.kinds.get(&type_id)?;
            Some(HighwayConfigurationTotal {
                highway_id,
                highway_number: highway.number.clone(),
                highway_name: highway.name.clone(),
                configuration_type_id: type_id,
                configuration_name: kind.name.clone(),
                total_length_km: round_km(length),
                section_count: count,
            })
        })
        .filter(|row| highway_number.is_none_or(|number| row.highway_number == number))
        .collect();
    rows.sort_by(|a, b| {
        a.highway_number
            .cmp(&b.highway_number)
            .then_with(|| a.configuration_name.cmp(&b.configuration_name))
    });
    rows
}

/// Segments owned by one office.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfficeWorkload {
    /// Office.
    pub office_id: OfficeId,
    /// Division the office belongs to.
    pub division_name: String,
    /// Office name.
    pub office_name: String,
    /// Segments owned.
    pub segment_count: usize,
    /// Distinct highways those segments lie on.
    pub highway_count: usize,
    /// Route numbers of those highways, sorted.
    pub highway_numbers: Vec<String>,
    /// Kilometres owned, rounded to three decimals.
    pub total_length_km: f64,
}

/// Workload of every office owning at least one segment.
#[must_use]
pub fn office_workload(
    snapshot: &RegistrySnapshot,
    division_name: Option<&str>,
) -> Vec<OfficeWorkload> {
    let index = Index::new(snapshot);
    let mut owned: HashMap<OfficeId, (usize, BTreeSet<HighwayId>, f64)> = HashMap::new();
    for segment in &snapshot.segments {
        let entry = owned.entry(segment.office_id).or_default();
        entry.0 += 1;
        entry.1.insert(segment.highway_id);
        entry.2 += segment.range.length();
    }

    let mut rows: Vec<OfficeWorkload> = owned
        .into_iter()
        .filter_map(|(office_id, (count, highways, length))| {
            let office = index.offices.get(&office_id)?;
            let mut highway_numbers: Vec<String> = highways
                .iter()
                .filter_map(|id| index.highways.get(id))
                .map(|highway| highway.number.clone())
                .collect();
            highway_numbers.sort();
            Some(OfficeWorkload {
                office_id,
                division_name: office.division_name.clone(),
                office_name: office.office_name.clone(),
                segment_count: count,
                highway_count: highways.len(),
                highway_numbers,
                total_length_km: round_km(length),
            })
        })
        .filter(|row| division_name.is_none_or(|name| row.division_name == name))
        .collect();
    rows.sort_by(|a, b| {
        a.division_name
            .cmp(&b.division_name)
            .then_with(|| a.office_name.cmp(&b.office_name))
    });
    rows
}

/// Usage statistics of one build standard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStatistics {
    /// Build standard.
    pub configuration_type_id: ConfigurationTypeId,
    /// Catalogue code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Distinct highways using it.
    pub highway_count: usize,
    /// Details using it.
    pub section_count: usize,
    /// Total kilometres.
    pub total_length_km: f64,
    /// Mean detail length, zero when unused.
    pub average_length_km: f64,
    /// Shortest detail, zero when unused.
    pub min_length_km: f64,
    /// Longest detail, zero when unused.
    pub max_length_km: f64,
}

/// Statistics for every catalogue entry, unused ones included with zeros.
#[must_use]
pub fn configuration_statistics(snapshot: &RegistrySnapshot) -> Vec<ConfigurationStatistics> {
    let index = Index::new(snapshot);
    let mut lengths: HashMap<ConfigurationTypeId, (BTreeSet<HighwayId>, Vec<f64>)> = HashMap::new();
    for detail in &snapshot.details {
        let entry = lengths.entry(detail.configuration_type_id).or_default();
        if let Some(segment) = index.segments.get(&detail.segment_id) {
            entry.0.insert(segment.highway_id);
        }
        entry.1.push(detail.range.length());
    }

    let mut rows: Vec<ConfigurationStatistics> = snapshot
        .configuration_types
        .iter()
        .map(|kind| {
            let (highways, sections) = lengths.remove(&kind.id).unwrap_or_default();
            let total: f64 = sections.iter().sum();
            let min = sections.iter().copied().reduce(f64::min).unwrap_or(0.0);
            let max = sections.iter().copied().reduce(f64::max).unwrap_or(0.0);
            let average = if sections.is_empty() {
                0.0
            } else {
                total / sections.len() as f64
            };
            ConfigurationStatistics {
                configuration_type_id: kind.id,
                code: kind.code.clone(),
                name: kind.name.clone(),
                highway_count: highways.len(),
                section_count: sections.len(),
                total_length_km: round_km(total),
                average_length_km: round_km(average),
                min_length_km: round_km(min),
                max_length_km: round_km(max),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.code.cmp(&b.code)));
    rows
}

/// Optional filters for [`configuration_detail_listing`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DetailListingFilter {
    /// Only details on this highway.
    pub highway_id: Option<HighwayId>,
    /// Only details of this build standard.
    pub configuration_type_id: Option<ConfigurationTypeId>,
}

/// One configuration detail with its surrounding context.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDetailRow {
    /// Detail.
    pub detail_id: DetailId,
    /// Highway.
    pub highway_id: HighwayId,
    /// Route number.
    pub highway_number: String,
    /// Parent segment.
    pub segment_id: SegmentId,
    /// Parent segment name.
    pub segment_name: String,
    /// Parent segment range.
    pub segment_range: ChainageRange,
    /// Owning office name.
    pub office_name: String,
    /// Division of the owning office.
    pub division_name: String,
    /// Build standard.
    pub configuration_type_id: ConfigurationTypeId,
    /// Build standard name.
    pub configuration_name: String,
    /// Detail range.
    pub range: ChainageRange,
    /// Detail length, rounded to three decimals.
    pub length_km: f64,
    /// Free-text remarks.
    pub remarks: Option<String>,
}

/// Every detail matching `filter`, by highway number, segment start and
/// detail start.
#[must_use]
pub fn configuration_detail_listing(
    snapshot: &RegistrySnapshot,
    filter: DetailListingFilter,
) -> Vec<ConfigurationDetailRow> {
    let index = Index::new(snapshot);
    let mut rows: Vec<ConfigurationDetailRow> = snapshot
        .details
        .iter()
        .filter(|detail| {
            filter
                .configuration_type_id
                .is_none_or(|id| detail.configuration_type_id == id)
        })
        .filter_map(|detail| {
            let segment = index.segments.get(&detail.segment_id)?;
            if filter.highway_id.is_some_and(|id| segment.highway_id != id) {
                return None;
            }
            let highway = index.highways.get(&segment.highway_id);
            let office = index.offices.get(&segment.office_id);
            let kind = index.kinds.get(&detail.configuration_type_id);
            Some(ConfigurationDetailRow {
                detail_id: detail.id,
                highway_id: segment.highway_id,
                highway_number: highway.map(|h| h.number.clone()).unwrap_or_default(),
                segment_id: segment.id,
                segment_name: segment.name.clone(),
                segment_range: segment.range,
                office_name: office.map(|o| o.office_name.clone()).unwrap_or_default(),
                division_name: office.map(|o| o.division_name.clone()).unwrap_or_default(),
                configuration_type_id: detail.configuration_type_id,
                configuration_name: kind.map(|k| k.name.clone()).unwrap_or_default(),
                range: detail.range,
                length_km: round_km(detail.range.length()),
                remarks: detail.remarks.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.highway_number
            .cmp(&b.highway_number)
            .then_with(|| a.segment_range.start.total_cmp(&b.segment_range.start))
            .then_with(|| a.segment_id.cmp(&b.segment_id))
            .then_with(|| a.range.start.total_cmp(&b.range.start))
            .then_with(|| a.detail_id.cmp(&b.detail_id))
    });
    rows
}

/// Login activity of one user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    /// User.
    pub user_id: UserId,
    /// Login name.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// `central` or `division`.
    pub role: String,
    /// Division of the user's office.
    pub division_name: Option<String>,
    /// The user's office.
    pub office_name: Option<String>,
    /// Whether the account may sign in.
    pub active: bool,
    /// Most recent successful login.
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Every user by role, then division, then username.
#[must_use]
pub fn user_activity(snapshot: &RegistrySnapshot) -> Vec<UserActivity> {
    let index = Index::new(snapshot);
    let mut rows: Vec<UserActivity> = snapshot
        .users
        .iter()
        .map(|user| {
            let office = user
                .role
                .office_id()
                .and_then(|id| index.offices.get(&id));
            UserActivity {
                user_id: user.id,
                username: user.username.clone(),
                full_name: user.full_name.clone(),
                role: user.role.as_str().to_owned(),
                division_name: office.map(|o| o.division_name.clone()),
                office_name: office.map(|o| o.office_name.clone()),
                active: user.active,
                last_login_at: user.last_login_at,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        a.role
            .cmp(&b.role)
            .then_with(|| a.division_name.cmp(&b.division_name))
            .then_with(|| a.username.cmp(&b.username))
    });
    rows
}
