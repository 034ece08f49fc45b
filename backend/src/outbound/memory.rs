//! In-process `RegistryStore` for local runs and integration tests.
//!
//! Records live in a single [`RegistrySnapshot`] guarded by an async mutex.
//! Nothing survives a restart. A queued failure can be injected to exercise
//! the registry's all-or-nothing write path.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::ports::{RegistryMutation, RegistrySnapshot, RegistryStore, RegistryStoreError};

#[derive(Debug, Default)]
struct Inner {
    snapshot: RegistrySnapshot,
    fail_next: Option<RegistryStoreError>,
}

/// Volatile store that keeps every record in memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    inner: Mutex<Inner>,
}

fn upsert<T, K, F>(records: &mut Vec<T>, record: &T, key: F)
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let wanted = key(record);
    match records.iter_mut().find(|existing| key(existing) == wanted) {
        Some(existing) => existing.clone_from(record),
        None => records.push(record.clone()),
    }
}

fn apply(snapshot: &mut RegistrySnapshot, mutation: &RegistryMutation) {
    match mutation {
        RegistryMutation::PutHighway(highway) => {
            upsert(&mut snapshot.highways, highway, |h| h.id);
        }
        RegistryMutation::PutOffice(office) => upsert(&mut snapshot.offices, office, |o| o.id),
        RegistryMutation::PutConfigurationType(kind) => {
            upsert(&mut snapshot.configuration_types, kind, |k| k.id);
        }
        RegistryMutation::PutUser(user) => upsert(&mut snapshot.users, user, |u| u.id),
        RegistryMutation::PutSegment(segment) => {
            upsert(&mut snapshot.segments, segment, |s| s.id);
        }
        RegistryMutation::DeleteSegment { segment_id, .. } => {
            snapshot
                .details
                .retain(|detail| detail.segment_id != *segment_id);
            snapshot.segments.retain(|segment| segment.id != *segment_id);
        }
        RegistryMutation::PutDetail(detail) => upsert(&mut snapshot.details, detail, |d| d.id),
        RegistryMutation::DeleteDetail(detail_id) => {
            snapshot.details.retain(|detail| detail.id != *detail_id);
        }
        RegistryMutation::RecordLogin { user_id, at } => {
            if let Some(user) = snapshot.users.iter_mut().find(|user| user.id == *user_id) {
                user.last_login_at = Some(*at);
            }
        }
    }
}

impl InMemoryRegistryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with records, e.g. legacy rows that break invariants.
    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            inner: Mutex::new(Inner {
                snapshot,
                fail_next: None,
            }),
        }
    }

    /// Make the next `persist` call fail with `error` and change nothing.
    pub async fn fail_next_persist(&self, error: RegistryStoreError) {
        self.inner.lock().await.fail_next = Some(error);
    }

    /// Copy of the stored records.
    pub async fn contents(&self) -> RegistrySnapshot {
        self.inner.lock().await.snapshot.clone()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistryStore {
    async fn load_snapshot(&self) -> Result<RegistrySnapshot, RegistryStoreError> {
        Ok(self.contents().await)
    }

    async fn persist(&self, mutation: &RegistryMutation) -> Result<(), RegistryStoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(error) = inner.fail_next.take() {
            debug!(kind = mutation.kind(), %error, "injected store failure");
            return Err(error);
        }
        apply(&mut inner.snapshot, mutation);
        Ok(())
    }
}
