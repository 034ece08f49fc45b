//! Authoritative registry of corridor records.
//!
//! The registry keeps every record in memory behind one `RwLock` and mirrors
//! each accepted write into a [`RegistryStore`]. A write holds the write
//! guard while it validates, persists and applies, so writers are serialised
//! and readers never see a half-applied change. Memory is only touched after
//! the store accepted the mutation; a failed or cancelled write leaves no
//! trace.

mod state;

use std::fmt;
use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use self::state::RegistryState;
use super::ports::{RegistryMutation, RegistrySnapshot, RegistryStore};
use super::text::required;
use super::validation::{
    ChainageViolation, check_detail, check_range, check_segment, check_segment_keeps_details,
};
use super::{
    ConfigurationDetail, ConfigurationType, ConfigurationTypeDraft, ConfigurationTypeId,
    DetailDraft, DetailId, DetailPatch, Error, Highway, HighwayDraft, HighwayId, Office,
    OfficeDraft, OfficeId, Role, Segment, SegmentDraft, SegmentId, SegmentPatch, User, UserDraft,
    UserId,
};

/// Build the `NotFound` error used for every missing or hidden record.
pub(crate) fn not_found(entity: &'static str, id: impl fmt::Display) -> Error {
    let id = id.to_string();
    Error::not_found(format!("{entity} {id} not found"))
        .with_details(json!({ "entity": entity, "id": id }))
}

fn rejected(operation: &'static str, violation: ChainageViolation) -> Error {
    debug!(operation, %violation, "chainage write rejected");
    violation.into()
}

/// In-memory registry backed by a durable [`RegistryStore`].
pub struct Registry<S: ?Sized> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    state: RwLock<RegistryState>,
}

impl<S> Registry<S>
where
    S: RegistryStore + ?Sized,
{
    /// Load every record from `store` and start serving.
    pub async fn open(store: Arc<S>, clock: Arc<dyn Clock>) -> Result<Self, Error> {
        let snapshot = store.load_snapshot().await?;
        info!(
            highways = snapshot.highways.len(),
            offices = snapshot.offices.len(),
            segments = snapshot.segments.len(),
            details = snapshot.details.len(),
            users = snapshot.users.len(),
            "registry opened"
        );
        Ok(Self {
            store,
            clock,
            state: RwLock::new(RegistryState::from_snapshot(snapshot)),
        })
    }

    /// Stop serving and hand the store back to the caller.
    pub fn close(self) -> Arc<S> {
        info!("registry closed");
        self.store
    }

    async fn commit(
        &self,
        state: &mut RegistryState,
        mutation: RegistryMutation,
    ) -> Result<(), Error> {
        if let Err(err) = self.store.persist(&mutation).await {
            warn!(kind = mutation.kind(), error = %err, "registry store rejected mutation");
            return Err(err.into());
        }
        state.apply(&mutation);
        debug!(kind = mutation.kind(), "registry mutation applied");
        Ok(())
    }

    /// Register a highway; route numbers are unique.
    pub async fn create_highway(&self, draft: HighwayDraft) -> Result<Highway, Error> {
        let mut state = self.state.write().await;
        if state
            .highways
            .values()
            .any(|highway| highway.number == draft.number())
        {
            return Err(
                Error::conflict(format!("highway {} already exists", draft.number()))
                    .with_details(json!({ "field": "number", "value": draft.number() })),
            );
        }
        let highway = draft.into_highway(HighwayId::random());
        self.commit(&mut state, RegistryMutation::PutHighway(highway.clone()))
            .await?;
        Ok(highway)
    }

    /// Rename a highway; the route number is fixed.
    pub async fn update_highway_name(&self, id: HighwayId, name: &str) -> Result<Highway, Error> {
        let name = required("name", name)?;
        let mut state = self.state.write().await;
        let mut highway = state
            .highways
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("highway", id))?;
        highway.name = name;
        self.commit(&mut state, RegistryMutation::PutHighway(highway.clone()))
            .await?;
        Ok(highway)
    }

    /// Register an office.
    pub async fn create_office(&self, draft: OfficeDraft) -> Result<Office, Error> {
        let mut state = self.state.write().await;
        let office = draft.into_office(OfficeId::random());
        self.commit(&mut state, RegistryMutation::PutOffice(office.clone()))
            .await?;
        Ok(office)
    }

    /// Add a build standard to the catalogue; codes are unique.
    pub async fn create_configuration_type(
        &self,
        draft: ConfigurationTypeDraft,
    ) -> Result<ConfigurationType, Error> {
        let mut state = self.state.write().await;
        if state
            .configuration_types
            .values()
            .any(|kind| kind.code.eq_ignore_ascii_case(draft.code()))
        {
            return Err(
                Error::conflict(format!("configuration type {} already exists", draft.code()))
                    .with_details(json!({ "field": "code", "value": draft.code() })),
            );
        }
        let kind = draft.into_configuration_type(ConfigurationTypeId::random());
        self.commit(&mut state, RegistryMutation::PutConfigurationType(kind.clone()))
            .await?;
        Ok(kind)
    }

    /// Create a user whose secret was already hashed.
    pub async fn create_user(&self, draft: UserDraft, secret_hash: String) -> Result<User, Error> {
        let mut state = self.state.write().await;
        if let Role::Division { office_id } = draft.role() {
            if !state.offices.contains_key(&office_id) {
                return Err(not_found("office", office_id));
            }
        }
        if state
            .users
            .values()
            .any(|user| user.username == draft.username())
        {
            return Err(
                Error::conflict(format!("username {} is taken", draft.username()))
                    .with_details(json!({ "field": "username", "value": draft.username() })),
            );
        }
        let user = draft.into_user(UserId::random(), secret_hash, self.clock.utc());
        self.commit(&mut state, RegistryMutation::PutUser(user.clone()))
            .await?;
        info!(user_id = %user.id, role = user.role.as_str(), "user created");
        Ok(user)
    }

    /// Enable or disable sign-in for a user.
    pub async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<User, Error> {
        let mut state = self.state.write().await;
        let mut user = state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| not_found("user", user_id))?;
        user.active = active;
        self.commit(&mut state, RegistryMutation::PutUser(user.clone()))
            .await?;
        info!(user_id = %user_id, active, "user activation changed");
        Ok(user)
    }

    /// Stamp the user's last successful login.
    pub async fn record_login(&self, user_id: UserId) -> Result<User, Error> {
        let mut state = self.state.write().await;
        let mut user = state
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| not_found("user", user_id))?;
        let at = self.clock.utc();
        self.commit(&mut state, RegistryMutation::RecordLogin { user_id, at })
            .await?;
        user.last_login_at = Some(at);
        Ok(user)
    }

    /// Create a segment after checking references, range and overlap.
    pub async fn create_segment(
        &self,
        draft: SegmentDraft,
        creator: Option<UserId>,
    ) -> Result<Segment, Error> {
        let mut state = self.state.write().await;
        if !state.highways.contains_key(&draft.highway_id()) {
            return Err(not_found("highway", draft.highway_id()));
        }
        if !state.offices.contains_key(&draft.office_id()) {
            return Err(not_found("office", draft.office_id()));
        }
        let segment = draft.into_segment(SegmentId::random(), creator, self.clock.utc());
        check_segment(
            &segment,
            state.segments_at(segment.highway_id, segment.office_id),
        )
        .map_err(|violation| rejected("create_segment", violation))?;
        self.commit(&mut state, RegistryMutation::PutSegment(segment.clone()))
            .await?;
        Ok(segment)
    }

    /// Apply a patch to a segment.
    ///
    /// Overlap is checked against the other segments at the segment's new
    /// highway and office. A range change that would leave an attached
    /// detail outside the segment is refused with `OutOfBounds`.
    pub async fn update_segment(
        &self,
        id: SegmentId,
        patch: &SegmentPatch,
    ) -> Result<Segment, Error> {
        let mut state = self.state.write().await;
        let current = state
            .segments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("segment", id))?;
        let next = patch.apply(&current, self.clock.utc())?;
        if next.highway_id != current.highway_id && !state.highways.contains_key(&next.highway_id)
        {
            return Err(not_found("highway", next.highway_id));
        }
        if next.office_id != current.office_id && !state.offices.contains_key(&next.office_id) {
            return Err(not_found("office", next.office_id));
        }
        check_range(&next.range).map_err(|violation| rejected("update_segment", violation))?;
        check_segment_keeps_details(&next, state.details_of(id))
            .map_err(|violation| rejected("update_segment", violation))?;
        check_segment(&next, state.segments_at(next.highway_id, next.office_id))
            .map_err(|violation| rejected("update_segment", violation))?;
        self.commit(&mut state, RegistryMutation::PutSegment(next.clone()))
            .await?;
        Ok(next)
    }

    /// Delete a segment and every detail attached to it, atomically.
    pub async fn delete_segment(&self, id: SegmentId) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !state.segments.contains_key(&id) {
            return Err(not_found("segment", id));
        }
        let detail_ids: Vec<DetailId> = state.details_of(id).map(|detail| detail.id).collect();
        let removed = detail_ids.len();
        self.commit(
            &mut state,
            RegistryMutation::DeleteSegment {
                segment_id: id,
                detail_ids,
            },
        )
        .await?;
        info!(segment_id = %id, details = removed, "segment deleted");
        Ok(())
    }

    /// Create a configuration detail inside an existing segment.
    ///
    /// `authorise` sees the parent segment as it stands under the write
    /// lock and yields the creating user, so ownership cannot change between
    /// the check and the commit.
    pub async fn create_configuration_detail<A>(
        &self,
        draft: DetailDraft,
        authorise: A,
    ) -> Result<ConfigurationDetail, Error>
    where
        A: FnOnce(&Segment) -> Result<Option<UserId>, Error>,
    {
        let mut state = self.state.write().await;
        let parent = state
            .segments
            .get(&draft.segment_id)
            .cloned()
            .ok_or_else(|| not_found("segment", draft.segment_id))?;
        let creator = authorise(&parent)?;
        if !state
            .configuration_types
            .contains_key(&draft.configuration_type_id)
        {
            return Err(not_found(
                "configuration type",
                draft.configuration_type_id,
            ));
        }
        let detail = draft.into_detail(DetailId::random(), creator, self.clock.utc());
        check_detail(&detail, &parent, state.details_of(parent.id))
            .map_err(|violation| rejected("create_configuration_detail", violation))?;
        self.commit(&mut state, RegistryMutation::PutDetail(detail.clone()))
            .await?;
        Ok(detail)
    }

    /// Apply a patch to a detail, re-checking it against its segment.
    ///
    /// `authorise` runs against the locked parent before anything else is
    /// validated.
    pub async fn update_configuration_detail<A>(
        &self,
        id: DetailId,
        patch: &DetailPatch,
        authorise: A,
    ) -> Result<ConfigurationDetail, Error>
    where
        A: FnOnce(&Segment) -> Result<Option<UserId>, Error>,
    {
        let mut state = self.state.write().await;
        let current = state
            .details
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("configuration detail", id))?;
        let parent = state
            .segments
            .get(&current.segment_id)
            .cloned()
            .ok_or_else(|| not_found("segment", current.segment_id))?;
        authorise(&parent)?;
        if let Some(type_id) = patch.configuration_type_id {
            if !state.configuration_types.contains_key(&type_id) {
                return Err(not_found("configuration type", type_id));
            }
        }
        let next = patch.apply(&current, self.clock.utc());
        check_detail(&next, &parent, state.details_of(parent.id))
            .map_err(|violation| rejected("update_configuration_detail", violation))?;
        self.commit(&mut state, RegistryMutation::PutDetail(next.clone()))
            .await?;
        Ok(next)
    }

    /// Delete one configuration detail once `authorise` accepts its parent.
    pub async fn delete_configuration_detail<A>(
        &self,
        id: DetailId,
        authorise: A,
    ) -> Result<(), Error>
    where
        A: FnOnce(&Segment) -> Result<Option<UserId>, Error>,
    {
        let mut state = self.state.write().await;
        let segment_id = state
            .details
            .get(&id)
            .map(|detail| detail.segment_id)
            .ok_or_else(|| not_found("configuration detail", id))?;
        let parent = state
            .segments
            .get(&segment_id)
            .ok_or_else(|| not_found("segment", segment_id))?;
        authorise(parent)?;
        self.commit(&mut state, RegistryMutation::DeleteDetail(id))
            .await
    }

    /// All highways by route number.
    pub async fn highways(&self) -> Vec<Highway> {
        let state = self.state.read().await;
        let mut highways: Vec<Highway> = state.highways.values().cloned().collect();
        highways.sort_by(|a, b| a.number.cmp(&b.number));
        highways
    }

    /// One highway.
    pub async fn highway(&self, id: HighwayId) -> Result<Highway, Error> {
        let state = self.state.read().await;
        state
            .highways
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("highway", id))
    }

    /// All offices by division, then office name.
    pub async fn offices(&self) -> Vec<Office> {
        let state = self.state.read().await;
        let mut offices: Vec<Office> = state.offices.values().cloned().collect();
        offices.sort_by(|a, b| {
            a.division_name
                .cmp(&b.division_name)
                .then_with(|| a.office_name.cmp(&b.office_name))
        });
        offices
    }

    /// One office.
    pub async fn office(&self, id: OfficeId) -> Result<Office, Error> {
        let state = self.state.read().await;
        state
            .offices
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("office", id))
    }

    /// Active configuration types in display order.
    pub async fn configuration_types(&self) -> Vec<ConfigurationType> {
        let state = self.state.read().await;
        let mut kinds: Vec<ConfigurationType> = state
            .configuration_types
            .values()
            .filter(|kind| kind.active)
            .cloned()
            .collect();
        kinds.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        kinds
    }

    /// One segment.
    pub async fn segment(&self, id: SegmentId) -> Result<Segment, Error> {
        let state = self.state.read().await;
        state
            .segments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("segment", id))
    }

    /// All segments by highway number, then start chainage.
    pub async fn segments(&self) -> Vec<Segment> {
        let state = self.state.read().await;
        let segments = state.segments.values().cloned().collect();
        sorted_by_highway(&state, segments)
    }

    /// Segments of one highway across all offices, by start chainage.
    pub async fn segments_for_highway(&self, id: HighwayId) -> Result<Vec<Segment>, Error> {
        let state = self.state.read().await;
        if !state.highways.contains_key(&id) {
            return Err(not_found("highway", id));
        }
        let segments = state
            .segments
            .values()
            .filter(|segment| segment.highway_id == id)
            .cloned()
            .collect();
        Ok(sorted_by_highway(&state, segments))
    }

    /// Segments owned by one office, by highway number, then start chainage.
    pub async fn segments_for_office(&self, id: OfficeId) -> Vec<Segment> {
        let state = self.state.read().await;
        let segments = state
            .segments
            .values()
            .filter(|segment| segment.office_id == id)
            .cloned()
            .collect();
        sorted_by_highway(&state, segments)
    }

    /// Details of one segment by start chainage.
    pub async fn details_for_segment(
        &self,
        id: SegmentId,
    ) -> Result<Vec<ConfigurationDetail>, Error> {
        let state = self.state.read().await;
        if !state.segments.contains_key(&id) {
            return Err(not_found("segment", id));
        }
        let mut details: Vec<ConfigurationDetail> = state.details_of(id).cloned().collect();
        details.sort_by(|a, b| {
            a.range
                .start
                .total_cmp(&b.range.start)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(details)
    }

    /// One configuration detail.
    pub async fn detail(&self, id: DetailId) -> Result<ConfigurationDetail, Error> {
        let state = self.state.read().await;
        state
            .details
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("configuration detail", id))
    }

    /// One user.
    pub async fn user(&self, id: UserId) -> Result<User, Error> {
        let state = self.state.read().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("user", id))
    }

    /// Look a user up by login name.
    pub async fn user_by_username(&self, username: &str) -> Option<User> {
        let username = username.trim();
        let state = self.state.read().await;
        state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned()
    }

    /// Copy of every record, for sweeps and reports.
    pub async fn snapshot(&self) -> RegistrySnapshot {
        self.state.read().await.to_snapshot()
    }
}

fn sorted_by_highway(state: &RegistryState, mut segments: Vec<Segment>) -> Vec<Segment> {
    segments.sort_by(|a, b| {
        state
            .highway_number(a.highway_id)
            .cmp(state.highway_number(b.highway_id))
            .then_with(|| a.range.start.total_cmp(&b.range.start))
            .then_with(|| a.id.cmp(&b.id))
    });
    segments
}
