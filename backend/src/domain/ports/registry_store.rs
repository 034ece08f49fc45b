//! Port for the durable record store behind the registry.
//!
//! The registry loads one snapshot at start-up and afterwards describes each
//! accepted write as a [`RegistryMutation`]. Adapters must apply a mutation
//! atomically: either every row it names changes or none do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    ConfigurationDetail, ConfigurationType, DetailId, Error, Highway, Office, Segment, SegmentId,
    User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RegistryStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "registry store connection failed: {message}",
        /// A query or write failed during execution.
        Query { message: String } =>
            "registry store query failed: {message}",
        /// Stored rows could not be decoded into domain records.
        Corrupt { message: String } =>
            "registry store returned invalid data: {message}",
    }
}

impl From<RegistryStoreError> for Error {
    fn from(value: RegistryStoreError) -> Self {
        Self::store_unavailable(value.to_string())
    }
}

/// Every record held by the store, as loaded at start-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrySnapshot {
    /// All highways.
    pub highways: Vec<Highway>,
    /// All offices.
    pub offices: Vec<Office>,
    /// The configuration catalogue, active or not.
    pub configuration_types: Vec<ConfigurationType>,
    /// All segments.
    pub segments: Vec<Segment>,
    /// All configuration details.
    pub details: Vec<ConfigurationDetail>,
    /// All users.
    pub users: Vec<User>,
}

/// One accepted registry write, persisted as a single transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryMutation {
    /// Insert or replace a highway.
    PutHighway(Highway),
    /// Insert or replace an office.
    PutOffice(Office),
    /// Insert or replace a configuration type.
    PutConfigurationType(ConfigurationType),
    /// Insert or replace a user.
    PutUser(User),
    /// Insert or replace a segment.
    PutSegment(Segment),
    /// Remove a segment together with every detail attached to it.
    DeleteSegment {
        /// Segment to remove.
        segment_id: SegmentId,
        /// Details removed in the same transaction.
        detail_ids: Vec<DetailId>,
    },
    /// Insert or replace a configuration detail.
    PutDetail(ConfigurationDetail),
    /// Remove one configuration detail.
    DeleteDetail(DetailId),
    /// Stamp a successful authentication.
    RecordLogin {
        /// Authenticated user.
        user_id: UserId,
        /// Time of authentication.
        at: DateTime<Utc>,
    },
}

impl RegistryMutation {
    /// Short label for structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PutHighway(_) => "put_highway",
            Self::PutOffice(_) => "put_office",
            Self::PutConfigurationType(_) => "put_configuration_type",
            Self::PutUser(_) => "put_user",
            Self::PutSegment(_) => "put_segment",
            Self::DeleteSegment { .. } => "delete_segment",
            Self::PutDetail(_) => "put_detail",
            Self::DeleteDetail(_) => "delete_detail",
            Self::RecordLogin { .. } => "record_login",
        }
    }
}

/// Port for loading and persisting registry records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load every record.
    async fn load_snapshot(&self) -> Result<RegistrySnapshot, RegistryStoreError>;

    /// Apply one mutation atomically.
    async fn persist(&self, mutation: &RegistryMutation) -> Result<(), RegistryStoreError>;
}

/// Store that starts empty and accepts every write without keeping it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRegistryStore;

#[async_trait]
impl RegistryStore for FixtureRegistryStore {
    async fn load_snapshot(&self) -> Result<RegistrySnapshot, RegistryStoreError> {
        Ok(RegistrySnapshot::default())
    }

    async fn persist(&self, _mutation: &RegistryMutation) -> Result<(), RegistryStoreError> {
        Ok(())
    }
}
