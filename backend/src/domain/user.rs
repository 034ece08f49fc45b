//! Registry users and their administrative roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::text::{BlankFieldError, optional, required};
use super::{OfficeId, UserId};

/// Administrative role of a user.
///
/// The shape encodes the office rule directly: a central user has no office
/// and a division user has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Sees and edits every segment.
    Central,
    /// Bound to the segments of one office.
    #[serde(rename_all = "camelCase")]
    Division {
        /// Office the user belongs to.
        office_id: OfficeId,
    },
}

impl Role {
    /// Persisted role name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::Division { .. } => "division",
        }
    }

    /// Office bound to the role, if any.
    #[must_use]
    pub const fn office_id(&self) -> Option<OfficeId> {
        match self {
            Self::Central => None,
            Self::Division { office_id } => Some(*office_id),
        }
    }

    /// Rebuild a role from its persisted columns.
    pub fn from_parts(name: &str, office_id: Option<OfficeId>) -> Result<Self, RoleError> {
        match (name, office_id) {
            ("central", None) => Ok(Self::Central),
            ("central", Some(_)) => Err(RoleError::CentralWithOffice),
            ("division", Some(office_id)) => Ok(Self::Division { office_id }),
            ("division", None) => Err(RoleError::DivisionWithoutOffice),
            (other, _) => Err(RoleError::Unknown {
                name: other.to_owned(),
            }),
        }
    }
}

/// Persisted role columns that violate the office rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// A central user carried an office.
    #[error("central users must not belong to an office")]
    CentralWithOffice,
    /// A division user had no office.
    #[error("division users must belong to exactly one office")]
    DivisionWithoutOffice,
    /// Unrecognised role name.
    #[error("unknown role `{name}`")]
    Unknown {
        /// The stored name.
        name: String,
    },
}

/// A credential holder. The secret hash never leaves the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Login name, unique and trimmed.
    #[schema(example = "ambala.engineer")]
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Contact address.
    pub email: Option<String>,
    /// Role and, for division users, the bound office.
    #[serde(flatten)]
    pub role: Role,
    /// Inactive users cannot authenticate.
    pub active: bool,
    /// Last successful authentication.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub(crate) secret_hash: String,
}

impl User {
    /// Opaque hash produced by the secret hasher port.
    #[must_use]
    pub fn secret_hash(&self) -> &str {
        &self.secret_hash
    }

    /// Rebuild a user loaded from the record store.
    #[expect(clippy::too_many_arguments, reason = "mirrors the persisted row")]
    #[must_use]
    pub fn from_record(
        id: UserId,
        username: String,
        full_name: String,
        email: Option<String>,
        role: Role,
        active: bool,
        last_login_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        secret_hash: String,
    ) -> Self {
        Self {
            id,
            username,
            full_name,
            email,
            role,
            active,
            last_login_at,
            created_at,
            secret_hash,
        }
    }
}

/// Validated request to create a [`User`]; the secret is wiped on drop.
#[derive(Debug, Clone)]
pub struct UserDraft {
    username: String,
    full_name: String,
    email: Option<String>,
    role: Role,
    secret: Zeroizing<String>,
}

impl UserDraft {
    /// Validate the identity fields and capture the initial secret.
    pub fn new(
        username: &str,
        full_name: &str,
        email: Option<&str>,
        role: Role,
        secret: &str,
    ) -> Result<Self, BlankFieldError> {
        if secret.is_empty() {
            return Err(BlankFieldError { field: "password" });
        }
        Ok(Self {
            username: required("username", username)?,
            full_name: required("fullName", full_name)?,
            email: optional(email),
            role,
            secret: Zeroizing::new(secret.to_owned()),
        })
    }

    /// Requested login name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Plain secret, only for hashing.
    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }

    pub(crate) fn into_user(self, id: UserId, secret_hash: String, now: DateTime<Utc>) -> User {
        User {
            id,
            username: self.username,
            full_name: self.full_name,
            email: self.email,
            role: self.role,
            active: true,
            last_login_at: None,
            created_at: now,
            secret_hash,
        }
    }
}
