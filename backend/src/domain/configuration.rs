//! Road build standards and the sub-intervals of a segment that use them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text::{BlankFieldError, optional, required};
use super::{ChainageRange, ConfigurationTypeId, DetailId, SegmentId, UserId};

/// Catalogue entry describing a physical road build standard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationType {
    /// Stable identifier.
    pub id: ConfigurationTypeId,
    /// Short code, unique across the catalogue.
    #[schema(example = "4L")]
    pub code: String,
    /// Display name.
    #[schema(example = "Four lane divided")]
    pub name: String,
    /// Position in listings.
    pub display_order: i32,
    /// Inactive types are hidden from listings but keep their details.
    pub active: bool,
}

/// Validated input for creating a [`ConfigurationType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationTypeDraft {
    code: String,
    name: String,
    display_order: i32,
}

impl ConfigurationTypeDraft {
    /// Trim and validate the code and name.
    pub fn new(code: &str, name: &str, display_order: i32) -> Result<Self, BlankFieldError> {
        Ok(Self {
            code: required("code", code)?,
            name: required("name", name)?,
            display_order,
        })
    }

    /// Catalogue code.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub(crate) fn into_configuration_type(self, id: ConfigurationTypeId) -> ConfigurationType {
        ConfigurationType {
            id,
            code: self.code,
            name: self.name,
            display_order: self.display_order,
            active: true,
        }
    }
}

/// A `[start, end)` sub-interval of one segment built to one standard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationDetail {
    /// Stable identifier.
    pub id: DetailId,
    /// Parent segment.
    pub segment_id: SegmentId,
    /// Build standard.
    pub configuration_type_id: ConfigurationTypeId,
    /// Chainage covered, always inside the parent segment.
    pub range: ChainageRange,
    /// Optional remarks.
    pub remarks: Option<String>,
    /// User that created the detail.
    pub created_by: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a [`ConfigurationDetail`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetailDraft {
    /// Parent segment.
    pub segment_id: SegmentId,
    /// Build standard.
    pub configuration_type_id: ConfigurationTypeId,
    /// Requested chainage, validated by the registry.
    pub range: ChainageRange,
    /// Optional remarks.
    pub remarks: Option<String>,
}

impl DetailDraft {
    /// Capture a detail request; remarks are trimmed.
    #[must_use]
    pub fn new(
        segment_id: SegmentId,
        configuration_type_id: ConfigurationTypeId,
        range: ChainageRange,
        remarks: Option<&str>,
    ) -> Self {
        Self {
            segment_id,
            configuration_type_id,
            range,
            remarks: optional(remarks),
        }
    }

    pub(crate) fn into_detail(
        self,
        id: DetailId,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> ConfigurationDetail {
        ConfigurationDetail {
            id,
            segment_id: self.segment_id,
            configuration_type_id: self.configuration_type_id,
            range: self.range,
            remarks: self.remarks,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a [`ConfigurationDetail`].
///
/// A detail cannot move to another segment; delete and recreate instead.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetailPatch {
    /// Switch the build standard.
    pub configuration_type_id: Option<ConfigurationTypeId>,
    /// New start chainage.
    pub start: Option<f64>,
    /// New end chainage.
    pub end: Option<f64>,
    /// Replace the remarks; an empty string clears them.
    pub remarks: Option<String>,
}

impl DetailPatch {
    pub(crate) fn apply(
        &self,
        current: &ConfigurationDetail,
        now: DateTime<Utc>,
    ) -> ConfigurationDetail {
        let mut next = current.clone();
        if let Some(type_id) = self.configuration_type_id {
            next.configuration_type_id = type_id;
        }
        next.range = current.range.with_bounds(self.start, self.end);
        if let Some(remarks) = &self.remarks {
            next.remarks = optional(Some(remarks));
        }
        next.updated_at = now;
        next
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn new_types_start_active() {
        let kind = ConfigurationTypeDraft::new(" 2L ", "Two lane", 2)
            .expect("valid draft")
            .into_configuration_type(ConfigurationTypeId::random());
        assert!(kind.active);
        assert_eq!(kind.code, "2L");
    }

    #[test]
    fn blank_code_is_rejected() {
        let err = ConfigurationTypeDraft::new("", "Two lane", 2).expect_err("blank code");
        assert_eq!(err.field, "code");
    }

    #[test]
    fn patch_keeps_unnamed_bounds() {
        let detail = DetailDraft::new(
            SegmentId::random(),
            ConfigurationTypeId::random(),
            ChainageRange::unchecked(0.0, 20.0),
            Some(" paved shoulder "),
        )
        .into_detail(DetailId::random(), None, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(detail.remarks.as_deref(), Some("paved shoulder"));

        let patch = DetailPatch {
            start: Some(5.0),
            ..DetailPatch::default()
        };
        let next = patch.apply(&detail, detail.updated_at);
        assert_eq!(next.range, ChainageRange::unchecked(5.0, 20.0));
        assert_eq!(next.segment_id, detail.segment_id);
    }
}
