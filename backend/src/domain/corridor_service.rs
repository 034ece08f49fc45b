//! Request facade over the registry.
//!
//! Every inbound request goes through [`CorridorService`]: the caller is
//! authorised first, then the registry, sweep or report is invoked. Detail
//! writes are authorised a second time inside the registry's write lock.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use super::access::{
    Caller, require_authenticated, require_central, require_detail_editor, visible_segments,
};
use super::ports::{RegistrySnapshot, RegistryStore, SecretHasher};
use super::registry::{Registry, not_found};
use super::reports::{
    self, ConfigurationDetailRow, ConfigurationStatistics, DetailListingFilter,
    HighwayConfigurationTotal, OfficeWorkload, UserActivity,
};
use super::validation::sweep::{self, ChainageGap, DetailOverlap, OutOfBoundsDetail, SegmentOverlap};
use super::{
    ConfigurationDetail, ConfigurationType, ConfigurationTypeDraft, DetailDraft, DetailId,
    DetailPatch, Error, Highway, HighwayDraft, HighwayId, Office, OfficeDraft, Role, Segment,
    SegmentDraft, SegmentId, SegmentPatch, User, UserDraft, UserId,
};

const EDIT_DETAILS: &str = "edit details of this segment";

/// Ownership check the registry runs against a detail's locked parent.
fn detail_editor(caller: &Caller) -> impl FnOnce(&Segment) -> Result<Option<UserId>, Error> + '_ {
    move |parent| require_detail_editor(caller, parent, EDIT_DETAILS).map(Some)
}

/// Keep only the records a caller may see.
fn scoped(caller: &Caller, mut snapshot: RegistrySnapshot) -> RegistrySnapshot {
    if let Caller::Division { office_id, .. } = caller {
        snapshot
            .segments
            .retain(|segment| segment.office_id == *office_id);
        let visible: HashSet<SegmentId> =
            snapshot.segments.iter().map(|segment| segment.id).collect();
        snapshot
            .details
            .retain(|detail| visible.contains(&detail.segment_id));
    }
    snapshot
}

/// Authorising facade used by every inbound adapter.
pub struct CorridorService<S: ?Sized> {
    registry: Arc<Registry<S>>,
    hasher: Arc<dyn SecretHasher>,
}

impl<S> CorridorService<S>
where
    S: RegistryStore + ?Sized,
{
    /// Create a service over a shared registry.
    pub fn new(registry: Arc<Registry<S>>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self { registry, hasher }
    }

    /// Resolve a session's user id into a caller.
    ///
    /// Unknown or inactive users resolve to [`Caller::Anonymous`].
    pub async fn resolve_caller(&self, user_id: Option<UserId>) -> Caller {
        let Some(user_id) = user_id else {
            return Caller::Anonymous;
        };
        match self.registry.user(user_id).await {
            Ok(user) => Caller::from_user(&user),
            Err(_) => Caller::Anonymous,
        }
    }

    async fn visible_segment(&self, caller: &Caller, id: SegmentId) -> Result<Segment, Error> {
        let segment = self.registry.segment(id).await?;
        if caller.can_see(&segment) {
            Ok(segment)
        } else {
            Err(not_found("segment", id))
        }
    }

    async fn snapshot_for(&self, caller: &Caller) -> Result<RegistrySnapshot, Error> {
        require_authenticated(caller)?;
        Ok(scoped(caller, self.registry.snapshot().await))
    }

    /// All highways.
    pub async fn highways(&self) -> Vec<Highway> {
        self.registry.highways().await
    }

    /// One highway.
    pub async fn highway(&self, id: HighwayId) -> Result<Highway, Error> {
        self.registry.highway(id).await
    }

    /// Register a highway.
    pub async fn create_highway(
        &self,
        caller: &Caller,
        draft: HighwayDraft,
    ) -> Result<Highway, Error> {
        require_central(caller, "create highways")?;
        self.registry.create_highway(draft).await
    }

    /// Rename a highway.
    pub async fn update_highway_name(
        &self,
        caller: &Caller,
        id: HighwayId,
        name: &str,
    ) -> Result<Highway, Error> {
        require_central(caller, "rename highways")?;
        self.registry.update_highway_name(id, name).await
    }

    /// All offices.
    pub async fn offices(&self) -> Vec<Office> {
        self.registry.offices().await
    }

    /// Register an office.
    pub async fn create_office(
        &self,
        caller: &Caller,
        draft: OfficeDraft,
    ) -> Result<Office, Error> {
        require_central(caller, "create offices")?;
        self.registry.create_office(draft).await
    }

    /// Active configuration types.
    pub async fn configuration_types(&self) -> Vec<ConfigurationType> {
        self.registry.configuration_types().await
    }

    /// Add a build standard.
    pub async fn create_configuration_type(
        &self,
        caller: &Caller,
        draft: ConfigurationTypeDraft,
    ) -> Result<ConfigurationType, Error> {
        require_central(caller, "create configuration types")?;
        self.registry.create_configuration_type(draft).await
    }

    /// The signed-in user.
    pub async fn current_user(&self, caller: &Caller) -> Result<User, Error> {
        let user_id = require_authenticated(caller)?;
        self.registry.user(user_id).await
    }

    /// Create a user; the secret is hashed before it reaches the registry.
    pub async fn create_user(&self, caller: &Caller, draft: UserDraft) -> Result<User, Error> {
        require_central(caller, "create users")?;
        let secret_hash = self.hasher.hash(draft.secret());
        self.registry.create_user(draft, secret_hash).await
    }

    /// Enable or disable a user.
    pub async fn set_user_active(
        &self,
        caller: &Caller,
        user_id: UserId,
        active: bool,
    ) -> Result<User, Error> {
        require_central(caller, "change user activation")?;
        self.registry.set_user_active(user_id, active).await
    }

    /// Create the configured central user on first start.
    ///
    /// Returns `None` when the username already exists.
    pub async fn bootstrap_central_user(&self, draft: UserDraft) -> Result<Option<User>, Error> {
        if !matches!(draft.role(), Role::Central) {
            return Err(Error::invalid_request(
                "bootstrap user must have the central role",
            ));
        }
        if self.registry.user_by_username(draft.username()).await.is_some() {
            return Ok(None);
        }
        let secret_hash = self.hasher.hash(draft.secret());
        let user = self.registry.create_user(draft, secret_hash).await?;
        info!(user_id = %user.id, "bootstrap central user created");
        Ok(Some(user))
    }

    /// Segments the caller may see.
    pub async fn segments(&self, caller: &Caller) -> Vec<Segment> {
        visible_segments(caller, self.registry.segments().await)
    }

    /// Visible segments of one highway.
    pub async fn segments_for_highway(
        &self,
        caller: &Caller,
        id: HighwayId,
    ) -> Result<Vec<Segment>, Error> {
        let segments = self.registry.segments_for_highway(id).await?;
        Ok(visible_segments(caller, segments))
    }

    /// One segment; hidden segments read as missing.
    pub async fn segment(&self, caller: &Caller, id: SegmentId) -> Result<Segment, Error> {
        self.visible_segment(caller, id).await
    }

    /// Create a segment; central callers only.
    pub async fn create_segment(
        &self,
        caller: &Caller,
        draft: SegmentDraft,
    ) -> Result<Segment, Error> {
        let user_id = require_central(caller, "create segments")?;
        self.registry.create_segment(draft, Some(user_id)).await
    }

    /// Update a segment; central callers only.
    pub async fn update_segment(
        &self,
        caller: &Caller,
        id: SegmentId,
        patch: &SegmentPatch,
    ) -> Result<Segment, Error> {
        require_central(caller, "update segments")?;
        self.registry.update_segment(id, patch).await
    }

    /// Delete a segment and its details; central callers only.
    pub async fn delete_segment(&self, caller: &Caller, id: SegmentId) -> Result<(), Error> {
        require_central(caller, "delete segments")?;
        self.registry.delete_segment(id).await
    }

    /// Details of a visible segment.
    pub async fn details_for_segment(
        &self,
        caller: &Caller,
        segment_id: SegmentId,
    ) -> Result<Vec<ConfigurationDetail>, Error> {
        self.visible_segment(caller, segment_id).await?;
        self.registry.details_for_segment(segment_id).await
    }

    /// One detail; details of hidden segments read as missing.
    pub async fn detail(
        &self,
        caller: &Caller,
        id: DetailId,
    ) -> Result<ConfigurationDetail, Error> {
        let detail = self.registry.detail(id).await?;
        let parent = self.registry.segment(detail.segment_id).await?;
        if caller.can_see(&parent) {
            Ok(detail)
        } else {
            Err(not_found("configuration detail", id))
        }
    }

    /// Create a detail on a segment the caller may edit.
    ///
    /// The parent is checked once here and again by the registry under its
    /// write lock, where the segment's office cannot change underneath.
    pub async fn create_detail(
        &self,
        caller: &Caller,
        draft: DetailDraft,
    ) -> Result<ConfigurationDetail, Error> {
        let parent = self.registry.segment(draft.segment_id).await?;
        require_detail_editor(caller, &parent, EDIT_DETAILS)?;
        self.registry
            .create_configuration_detail(draft, detail_editor(caller))
            .await
    }

    /// Update a detail on a segment the caller may edit.
    pub async fn update_detail(
        &self,
        caller: &Caller,
        id: DetailId,
        patch: &DetailPatch,
    ) -> Result<ConfigurationDetail, Error> {
        let current = self.registry.detail(id).await?;
        let parent = self.registry.segment(current.segment_id).await?;
        require_detail_editor(caller, &parent, EDIT_DETAILS)?;
        self.registry
            .update_configuration_detail(id, patch, detail_editor(caller))
            .await
    }

    /// Delete a detail on a segment the caller may edit.
    pub async fn delete_detail(&self, caller: &Caller, id: DetailId) -> Result<(), Error> {
        let current = self.registry.detail(id).await?;
        let parent = self.registry.segment(current.segment_id).await?;
        require_detail_editor(caller, &parent, EDIT_DETAILS)?;
        self.registry
            .delete_configuration_detail(id, detail_editor(caller))
            .await
    }

    /// Overlapping segment pairs within the caller's scope.
    pub async fn overlapping_segments(
        &self,
        caller: &Caller,
    ) -> Result<Vec<SegmentOverlap>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(sweep::find_overlapping_segments(&snapshot))
    }

    /// Overlapping detail pairs within the caller's scope.
    pub async fn overlapping_details(&self, caller: &Caller) -> Result<Vec<DetailOverlap>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(sweep::find_overlapping_configuration_details(&snapshot))
    }

    /// Details outside their segment within the caller's scope.
    pub async fn out_of_bounds_details(
        &self,
        caller: &Caller,
    ) -> Result<Vec<OutOfBoundsDetail>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(sweep::find_out_of_bounds_details(&snapshot))
    }

    /// Uncovered stretches of a highway.
    ///
    /// Continuity spans every office, so the check ignores the caller's
    /// office scope.
    pub async fn chainage_gaps(
        &self,
        caller: &Caller,
        highway_id: HighwayId,
    ) -> Result<Vec<ChainageGap>, Error> {
        require_authenticated(caller)?;
        self.registry.highway(highway_id).await?;
        let snapshot = self.registry.snapshot().await;
        Ok(sweep::find_chainage_gaps(&snapshot, highway_id))
    }

    /// Per highway and build standard totals.
    pub async fn highway_configuration_totals(
        &self,
        caller: &Caller,
        highway_number: Option<&str>,
    ) -> Result<Vec<HighwayConfigurationTotal>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(reports::highway_configuration_totals(&snapshot, highway_number))
    }

    /// Per office workload.
    pub async fn office_workload(
        &self,
        caller: &Caller,
        division_name: Option<&str>,
    ) -> Result<Vec<OfficeWorkload>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(reports::office_workload(&snapshot, division_name))
    }

    /// Per build standard statistics.
    pub async fn configuration_statistics(
        &self,
        caller: &Caller,
    ) -> Result<Vec<ConfigurationStatistics>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(reports::configuration_statistics(&snapshot))
    }

    /// Detail listing with context.
    pub async fn configuration_detail_listing(
        &self,
        caller: &Caller,
        filter: DetailListingFilter,
    ) -> Result<Vec<ConfigurationDetailRow>, Error> {
        let snapshot = self.snapshot_for(caller).await?;
        Ok(reports::configuration_detail_listing(&snapshot, filter))
    }

    /// Login activity of every user; central callers only.
    pub async fn user_activity(&self, caller: &Caller) -> Result<Vec<UserActivity>, Error> {
        require_authenticated(caller)?;
        require_central(caller, "view user activity")?;
        let snapshot = self.registry.snapshot().await;
        Ok(reports::user_activity(&snapshot))
    }
}

#[cfg(test)]
#[path = "corridor_service_tests.rs"]
mod tests;
