//! Access scope of a caller over corridor records.
//!
//! Anyone may read highways, offices and the configuration catalogue.
//! Segments are readable by anonymous and central callers; a division caller
//! sees only its own office's segments, and a hidden segment is reported as
//! missing so its existence does not leak. Details inherit visibility from
//! their segment.
//!
//! Every mutation outside a caller's rights, anonymous ones included, is
//! refused with `Unauthorized`. `Unauthenticated` is reserved for reads that
//! need a session.

use serde_json::json;

use super::{Error, OfficeId, Role, Segment, User, UserId};

/// Resolved identity of whoever issued a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// No session.
    Anonymous,
    /// Central administrator.
    Central {
        /// Authenticated user.
        user_id: UserId,
    },
    /// Division staff bound to one office.
    Division {
        /// Authenticated user.
        user_id: UserId,
        /// Office whose segments the user may see and edit.
        office_id: OfficeId,
    },
}

impl Caller {
    /// Derive the caller from a stored user; inactive users are anonymous.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        if !user.active {
            return Self::Anonymous;
        }
        match user.role {
            Role::Central => Self::Central { user_id: user.id },
            Role::Division { office_id } => Self::Division {
                user_id: user.id,
                office_id,
            },
        }
    }

    /// Authenticated user, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Central { user_id } | Self::Division { user_id, .. } => Some(*user_id),
        }
    }

    /// `true` when `segment` is within the caller's read scope.
    #[must_use]
    pub fn can_see(&self, segment: &Segment) -> bool {
        match self {
            Self::Anonymous | Self::Central { .. } => true,
            Self::Division { office_id, .. } => segment.office_id == *office_id,
        }
    }
}

fn unauthenticated() -> Error {
    Error::unauthenticated("login required")
}

fn unauthorized(action: &'static str) -> Error {
    Error::unauthorized(format!("not permitted to {action}"))
        .with_details(json!({ "action": action }))
}

/// Require any signed-in caller.
pub fn require_authenticated(caller: &Caller) -> Result<UserId, Error> {
    caller.user_id().ok_or_else(unauthenticated)
}

/// Require a central caller; `action` names the refused operation.
pub fn require_central(caller: &Caller, action: &'static str) -> Result<UserId, Error> {
    match caller {
        Caller::Central { user_id } => Ok(*user_id),
        Caller::Anonymous | Caller::Division { .. } => Err(unauthorized(action)),
    }
}

/// Require a caller allowed to edit details of `parent`.
pub fn require_detail_editor(
    caller: &Caller,
    parent: &Segment,
    action: &'static str,
) -> Result<UserId, Error> {
    match caller {
        Caller::Central { user_id } => Ok(*user_id),
        Caller::Division { user_id, office_id } if *office_id == parent.office_id => Ok(*user_id),
        Caller::Anonymous | Caller::Division { .. } => Err(unauthorized(action)),
    }
}

/// Keep the segments the caller may read.
#[must_use]
pub fn visible_segments(caller: &Caller, segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .filter(|segment| caller.can_see(segment))
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ChainageRange, ErrorCode, HighwayId, SegmentDraft, SegmentId};
    use chrono::{DateTime, Utc};
    use rstest::{fixture, rstest};

    const OWNER: OfficeId = OfficeId::from_uuid(uuid::Uuid::from_u128(1));
    const STRANGER: OfficeId = OfficeId::from_uuid(uuid::Uuid::from_u128(2));

    #[fixture]
    fn owned_segment() -> Segment {
        SegmentDraft::new(
            HighwayId::random(),
            OWNER,
            "owned",
            ChainageRange::unchecked(0.0, 10.0),
        )
        .expect("valid draft")
        .into_segment(SegmentId::random(), None, DateTime::<Utc>::UNIX_EPOCH)
    }

    fn division(office_id: OfficeId) -> Caller {
        Caller::Division {
            user_id: UserId::random(),
            office_id,
        }
    }

    #[rstest]
    #[case(Caller::Anonymous, true)]
    #[case(Caller::Central { user_id: UserId::random() }, true)]
    #[case(division(OWNER), true)]
    #[case(division(STRANGER), false)]
    fn read_scope_follows_office(
        owned_segment: Segment,
        #[case] caller: Caller,
        #[case] visible: bool,
    ) {
        assert_eq!(caller.can_see(&owned_segment), visible);
        assert_eq!(
            visible_segments(&caller, vec![owned_segment]).len(),
            usize::from(visible)
        );
    }

    #[rstest]
    fn central_role_gates_segment_writes() {
        assert_eq!(
            require_central(&Caller::Anonymous, "create segment")
                .expect_err("anonymous")
                .code(),
            ErrorCode::Unauthorized
        );
        assert_eq!(
            require_central(&division(OWNER), "create segment")
                .expect_err("division")
                .code(),
            ErrorCode::Unauthorized
        );
        let user_id = UserId::random();
        assert_eq!(
            require_central(&Caller::Central { user_id }, "create segment"),
            Ok(user_id)
        );
    }

    #[rstest]
    fn division_may_edit_details_of_its_own_office(owned_segment: Segment) {
        let caller = division(OWNER);
        assert_eq!(
            require_detail_editor(&caller, &owned_segment, "create detail"),
            Ok(caller.user_id().expect("signed in"))
        );
        let err = require_detail_editor(&division(STRANGER), &owned_segment, "create detail")
            .expect_err("other office");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn anonymous_mutations_are_unauthorized_and_reads_unauthenticated(owned_segment: Segment) {
        let err = require_detail_editor(&Caller::Anonymous, &owned_segment, "delete detail")
            .expect_err("anonymous");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        let err = require_authenticated(&Caller::Anonymous).expect_err("no session");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }

    #[rstest]
    fn inactive_users_resolve_to_anonymous() {
        let mut user = crate::domain::UserDraft::new("asha", "Asha", None, Role::Central, "pw")
            .expect("draft")
            .into_user(UserId::random(), "hash".into(), DateTime::<Utc>::UNIX_EPOCH);
        assert!(matches!(Caller::from_user(&user), Caller::Central { .. }));
        user.active = false;
        assert_eq!(Caller::from_user(&user), Caller::Anonymous);
    }
}
