//! Indexed in-memory copy of every registry record.

use std::collections::{BTreeSet, HashMap};

use crate::domain::ports::{RegistryMutation, RegistrySnapshot};
use crate::domain::{
    ConfigurationDetail, ConfigurationType, ConfigurationTypeId, DetailId, Highway, HighwayId,
    Office, OfficeId, Segment, SegmentId, User, UserId,
};

/// Records keyed by id, plus the sibling indexes inline checks scan.
#[derive(Debug, Default)]
pub(super) struct RegistryState {
    pub(super) highways: HashMap<HighwayId, Highway>,
    pub(super) offices: HashMap<OfficeId, Office>,
    pub(super) configuration_types: HashMap<ConfigurationTypeId, ConfigurationType>,
    pub(super) segments: HashMap<SegmentId, Segment>,
    pub(super) details: HashMap<DetailId, ConfigurationDetail>,
    pub(super) users: HashMap<UserId, User>,
    segments_by_placement: HashMap<(HighwayId, OfficeId), BTreeSet<SegmentId>>,
    details_by_segment: HashMap<SegmentId, BTreeSet<DetailId>>,
}

impl RegistryState {
    pub(super) fn from_snapshot(snapshot: RegistrySnapshot) -> Self {
        let mut state = Self::default();
        for highway in snapshot.highways {
            state.highways.insert(highway.id, highway);
        }
        for office in snapshot.offices {
            state.offices.insert(office.id, office);
        }
        for kind in snapshot.configuration_types {
            state.configuration_types.insert(kind.id, kind);
        }
        for user in snapshot.users {
            state.users.insert(user.id, user);
        }
        for segment in snapshot.segments {
            state.put_segment(segment);
        }
        for detail in snapshot.details {
            state.put_detail(detail);
        }
        state
    }

    pub(super) fn to_snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            highways: self.highways.values().cloned().collect(),
            offices: self.offices.values().cloned().collect(),
            configuration_types: self.configuration_types.values().cloned().collect(),
            segments: self.segments.values().cloned().collect(),
            details: self.details.values().cloned().collect(),
            users: self.users.values().cloned().collect(),
        }
    }

    /// Segments sharing a highway and office.
    pub(super) fn segments_at(
        &self,
        highway_id: HighwayId,
        office_id: OfficeId,
    ) -> impl Iterator<Item = &Segment> {
        self.segments_by_placement
            .get(&(highway_id, office_id))
            .into_iter()
            .flatten()
            .filter_map(|id| self.segments.get(id))
    }

    /// Details attached to a segment.
    pub(super) fn details_of(
        &self,
        segment_id: SegmentId,
    ) -> impl Iterator<Item = &ConfigurationDetail> {
        self.details_by_segment
            .get(&segment_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.details.get(id))
    }

    pub(super) fn highway_number(&self, highway_id: HighwayId) -> &str {
        self.highways
            .get(&highway_id)
            .map_or("", |highway| highway.number.as_str())
    }

    pub(super) fn apply(&mut self, mutation: &RegistryMutation) {
        match mutation {
            RegistryMutation::PutHighway(highway) => {
                self.highways.insert(highway.id, highway.clone());
            }
            RegistryMutation::PutOffice(office) => {
                self.offices.insert(office.id, office.clone());
            }
            RegistryMutation::PutConfigurationType(kind) => {
                self.configuration_types.insert(kind.id, kind.clone());
            }
            RegistryMutation::PutUser(user) => {
                self.users.insert(user.id, user.clone());
            }
            RegistryMutation::PutSegment(segment) => self.put_segment(segment.clone()),
            RegistryMutation::DeleteSegment {
                segment_id,
                detail_ids,
            } => {
                for detail_id in detail_ids {
                    self.details.remove(detail_id);
                }
                self.details_by_segment.remove(segment_id);
                if let Some(segment) = self.segments.remove(segment_id) {
                    self.unindex_segment(&segment);
                }
            }
            RegistryMutation::PutDetail(detail) => self.put_detail(detail.clone()),
            RegistryMutation::DeleteDetail(detail_id) => {
                if let Some(detail) = self.details.remove(detail_id) {
                    self.unindex_detail(detail.segment_id, *detail_id);
                }
            }
            RegistryMutation::RecordLogin { user_id, at } => {
                if let Some(user) = self.users.get_mut(user_id) {
                    user.last_login_at = Some(*at);
                }
            }
        }
    }

    fn put_segment(&mut self, segment: Segment) {
        if let Some(previous) = self.segments.get(&segment.id).cloned() {
            self.unindex_segment(&previous);
        }
        self.segments_by_placement
            .entry((segment.highway_id, segment.office_id))
            .or_default()
            .insert(segment.id);
        self.segments.insert(segment.id, segment);
    }

    fn unindex_segment(&mut self, segment: &Segment) {
        let key = (segment.highway_id, segment.office_id);
        if let Some(members) = self.segments_by_placement.get_mut(&key) {
            members.remove(&segment.id);
            if members.is_empty() {
                self.segments_by_placement.remove(&key);
            }
        }
    }

    fn put_detail(&mut self, detail: ConfigurationDetail) {
        let moved_from = self
            .details
            .get(&detail.id)
            .map(|previous| previous.segment_id)
            .filter(|segment_id| *segment_id != detail.segment_id);
        if let Some(segment_id) = moved_from {
            self.unindex_detail(segment_id, detail.id);
        }
        self.details_by_segment
            .entry(detail.segment_id)
            .or_default()
            .insert(detail.id);
        self.details.insert(detail.id, detail);
    }

    fn unindex_detail(&mut self, segment_id: SegmentId, detail_id: DetailId) {
        if let Some(siblings) = self.details_by_segment.get_mut(&segment_id) {
            siblings.remove(&detail_id);
        }
    }
}
