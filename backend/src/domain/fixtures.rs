//! Shared fixtures for domain unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use tokio::sync::{Mutex, MutexGuard, Notify};

use super::ports::{
    FixtureRegistryStore, RegistryMutation, RegistrySnapshot, RegistryStore, RegistryStoreError,
};
use super::registry::Registry;
use super::{
    ChainageRange, ConfigurationType, ConfigurationTypeDraft, Error, Highway, HighwayDraft,
    Office, OfficeDraft, Segment, UserId,
};

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) fn km(start: f64, end: f64) -> ChainageRange {
    ChainageRange::unchecked(start, end)
}

/// Registry seeded with one highway, two offices and one build standard.
pub(crate) struct SeededRegistry<S: ?Sized = FixtureRegistryStore> {
    pub(crate) registry: Arc<Registry<S>>,
    pub(crate) highway: Highway,
    pub(crate) office: Office,
    pub(crate) other_office: Office,
    pub(crate) kind: ConfigurationType,
}

pub(crate) async fn seeded_registry() -> SeededRegistry {
    seed(Arc::new(FixtureRegistryStore)).await
}

/// Seed a registry opened over `store`.
pub(crate) async fn seed<S>(store: Arc<S>) -> SeededRegistry<S>
where
    S: RegistryStore + ?Sized,
{
    let registry = Arc::new(Registry::open(store, fixture_clock()).await.expect("open registry"));
    let highway = registry
        .create_highway(HighwayDraft::new("NH-44", "North South Corridor").expect("draft"))
        .await
        .expect("create highway");
    let office = registry
        .create_office(OfficeDraft::new("Hyderabad", "Office 1").expect("draft"))
        .await
        .expect("create office");
    let other_office = registry
        .create_office(OfficeDraft::new("Warangal", "Office 2").expect("draft"))
        .await
        .expect("create office");
    let kind = registry
        .create_configuration_type(
            ConfigurationTypeDraft::new("4L", "Four lane", 1).expect("draft"),
        )
        .await
        .expect("create configuration type");
    SeededRegistry {
        registry,
        highway,
        office,
        other_office,
        kind,
    }
}

/// Authorisation that accepts every parent and records no creator.
pub(crate) fn any_editor(_parent: &Segment) -> Result<Option<UserId>, Error> {
    Ok(None)
}

/// Store whose writes can be held at the door.
///
/// While a test holds [`GatedRegistryStore::hold`], every `persist` call
/// parks inside the registry's write lock, so later writers queue up behind
/// it in a known order.
#[derive(Default)]
pub(crate) struct GatedRegistryStore {
    gate: Mutex<()>,
    entered: Notify,
}

impl GatedRegistryStore {
    /// Close the gate until the returned guard is dropped.
    pub(crate) async fn hold(&self) -> MutexGuard<'_, ()> {
        self.gate.lock().await
    }

    /// Wait until a write has parked at the closed gate.
    pub(crate) async fn entered(&self) {
        self.entered.notified().await;
    }
}

#[async_trait]
impl RegistryStore for GatedRegistryStore {
    async fn load_snapshot(&self) -> Result<RegistrySnapshot, RegistryStoreError> {
        Ok(RegistrySnapshot::default())
    }

    async fn persist(&self, _mutation: &RegistryMutation) -> Result<(), RegistryStoreError> {
        if self.gate.try_lock().is_err() {
            self.entered.notify_one();
        }
        let _pass = self.gate.lock().await;
        Ok(())
    }
}

/// Let spawned tasks run until they park on a lock.
pub(crate) async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
