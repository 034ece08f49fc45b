//! Behaviour tests for the registry's chainage and access rules.
//!
//! Steps drive a [`CorridorService`] over an in-memory store on a private
//! current-thread runtime, so no database or HTTP server is involved.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use corridor::domain::ports::RegistryStore;
use corridor::domain::{
    Caller, ChainageRange, ConfigurationType, ConfigurationTypeDraft, CorridorService, DetailDraft,
    DetailId, ErrorCode, Highway, HighwayDraft, Office, OfficeDraft, Registry, Role, Segment,
    SegmentDraft, UserDraft,
};
use corridor::outbound::credentials::Sha256SecretHasher;
use corridor::outbound::memory::InMemoryRegistryStore;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

struct Seeded {
    service: CorridorService<dyn RegistryStore>,
    central: Caller,
    highway: Highway,
    kind: ConfigurationType,
    offices: HashMap<String, Office>,
}

struct RegistryWorld {
    runtime: Runtime,
    seeded: RefCell<Option<Seeded>>,
    segments: RefCell<HashMap<String, Segment>>,
    details: RefCell<Vec<DetailId>>,
    division: RefCell<Option<Caller>>,
    outcome: RefCell<Option<Result<(), ErrorCode>>>,
}

impl RegistryWorld {
    fn new() -> Self {
        Self {
            runtime: tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime"),
            seeded: RefCell::new(None),
            segments: RefCell::new(HashMap::new()),
            details: RefCell::new(Vec::new()),
            division: RefCell::new(None),
            outcome: RefCell::new(None),
        }
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn with_seeded<T>(&self, f: impl FnOnce(&Seeded) -> T) -> T {
        let seeded = self.seeded.borrow();
        f(seeded.as_ref().expect("registry seeded"))
    }

    fn office(&self, label: &str) -> Office {
        self.with_seeded(|s| s.offices.get(label).cloned().expect("known office"))
    }

    fn segment_of(&self, label: &str) -> Segment {
        self.segments
            .borrow()
            .get(label)
            .cloned()
            .expect("segment recorded for office")
    }

    fn division(&self) -> Caller {
        (*self.division.borrow()).expect("division user created")
    }

    fn record<T>(&self, result: Result<T, ErrorCode>) -> Option<T> {
        match result {
            Ok(value) => {
                *self.outcome.borrow_mut() = Some(Ok(()));
                Some(value)
            }
            Err(code) => {
                *self.outcome.borrow_mut() = Some(Err(code));
                None
            }
        }
    }

    fn create_segment(
        &self,
        caller: &Caller,
        start: f64,
        end: f64,
        label: &str,
    ) -> Option<Segment> {
        let office = self.office(label);
        let result = self.with_seeded(|s| {
            let draft = SegmentDraft::new(
                s.highway.id,
                office.id,
                "section",
                ChainageRange::unchecked(start, end),
            )
            .expect("segment draft");
            self.block_on(s.service.create_segment(caller, draft))
        });
        let segment = self.record(result.map_err(|e| e.code()))?;
        self.segments
            .borrow_mut()
            .entry(label.to_owned())
            .or_insert_with(|| segment.clone());
        Some(segment)
    }

    fn create_detail(&self, caller: &Caller, start: f64, end: f64, label: &str) {
        let segment = self.segment_of(label);
        let result = self.with_seeded(|s| {
            let draft = DetailDraft::new(
                segment.id,
                s.kind.id,
                ChainageRange::unchecked(start, end),
                None,
            );
            self.block_on(s.service.create_detail(caller, draft))
        });
        if let Some(detail) = self.record(result.map_err(|e| e.code())) {
            self.details.borrow_mut().push(detail.id);
        }
    }

    fn central(&self) -> Caller {
        self.with_seeded(|s| s.central)
    }
}

async fn seed(labels: [&str; 2]) -> Seeded {
    let store: Arc<dyn RegistryStore> = Arc::new(InMemoryRegistryStore::new());
    let registry = Arc::new(
        Registry::open(store, Arc::new(DefaultClock))
            .await
            .expect("open registry"),
    );
    let service = CorridorService::new(registry, Arc::new(Sha256SecretHasher));
    let admin = service
        .bootstrap_central_user(
            UserDraft::new("admin", "Admin", None, Role::Central, "pw").expect("draft"),
        )
        .await
        .expect("bootstrap")
        .expect("created");
    let central = Caller::from_user(&admin);
    let highway = service
        .create_highway(&central, HighwayDraft::new("H1", "Trunk road").expect("draft"))
        .await
        .expect("highway");
    let kind = service
        .create_configuration_type(
            &central,
            ConfigurationTypeDraft::new("4L", "Four lane", 1).expect("draft"),
        )
        .await
        .expect("configuration type");
    let mut offices = HashMap::new();
    for label in labels {
        let office = service
            .create_office(&central, OfficeDraft::new("Division", label).expect("draft"))
            .await
            .expect("office");
        offices.insert(label.to_owned(), office);
    }
    Seeded {
        service,
        central,
        highway,
        kind,
        offices,
    }
}

#[fixture]
fn world() -> RegistryWorld {
    RegistryWorld::new()
}

#[given("a registry with offices \"{first}\" and \"{second}\"")]
fn a_registry_with_offices(world: &RegistryWorld, first: String, second: String) {
    let seeded = world.block_on(seed([first.as_str(), second.as_str()]));
    *world.seeded.borrow_mut() = Some(seeded);
}

#[given("a segment from {start:f64} to {end:f64} for office \"{office}\"")]
fn a_segment_for_office(world: &RegistryWorld, start: f64, end: f64, office: String) {
    let central = world.central();
    world
        .create_segment(&central, start, end, &office)
        .expect("seed segment");
}

#[given("a detail from {start:f64} to {end:f64} on the segment of office \"{office}\"")]
fn a_detail_on_segment(world: &RegistryWorld, start: f64, end: f64, office: String) {
    let central = world.central();
    world.create_detail(&central, start, end, &office);
    assert_eq!(*world.outcome.borrow(), Some(Ok(())), "seed detail");
}

#[given("a division user for office \"{office}\"")]
fn a_division_user(world: &RegistryWorld, office: String) {
    let office = world.office(&office);
    let caller = world.with_seeded(|s| {
        let draft = UserDraft::new(
            "division",
            "Division Staff",
            None,
            Role::Division {
                office_id: office.id,
            },
            "pw",
        )
        .expect("draft");
        let user = world
            .block_on(s.service.create_user(&s.central, draft))
            .expect("division user");
        Caller::from_user(&user)
    });
    *world.division.borrow_mut() = Some(caller);
}

#[when("central creates a segment from {start:f64} to {end:f64} for office \"{office}\"")]
fn central_creates_segment(world: &RegistryWorld, start: f64, end: f64, office: String) {
    let central = world.central();
    let _ = world.create_segment(&central, start, end, &office);
}

#[when("central creates a detail from {start:f64} to {end:f64} on the segment of office \"{office}\"")]
fn central_creates_detail(world: &RegistryWorld, start: f64, end: f64, office: String) {
    let central = world.central();
    world.create_detail(&central, start, end, &office);
}

#[when("the division user creates a segment from {start:f64} to {end:f64} for office \"{office}\"")]
fn division_creates_segment(world: &RegistryWorld, start: f64, end: f64, office: String) {
    let division = world.division();
    let _ = world.create_segment(&division, start, end, &office);
}

#[when(
    "the division user creates a detail from {start:f64} to {end:f64} on the segment of office \"{office}\""
)]
fn division_creates_detail(world: &RegistryWorld, start: f64, end: f64, office: String) {
    let division = world.division();
    world.create_detail(&division, start, end, &office);
}

#[when("central deletes the segment of office \"{office}\"")]
fn central_deletes_segment(world: &RegistryWorld, office: String) {
    let segment = world.segment_of(&office);
    let result = world.with_seeded(|s| {
        world.block_on(s.service.delete_segment(&s.central, segment.id))
    });
    world.record(result.map_err(|e| e.code()));
}

#[then("the request succeeds")]
fn the_request_succeeds(world: &RegistryWorld) {
    assert_eq!(*world.outcome.borrow(), Some(Ok(())));
}

#[then("the request fails with \"{code}\"")]
fn the_request_fails_with(world: &RegistryWorld, code: String) {
    let outcome = world.outcome.borrow().clone().expect("request made");
    let err = outcome.expect_err("request should fail");
    let actual = serde_json::to_value(err).expect("serialise code");
    assert_eq!(actual, serde_json::Value::String(code));
}

#[then("every recorded detail reads as not found")]
fn every_detail_is_missing(world: &RegistryWorld) {
    let ids = world.details.borrow().clone();
    assert_eq!(ids.len(), 3);
    world.with_seeded(|s| {
        for id in ids {
            let err = world
                .block_on(s.service.detail(&s.central, id))
                .expect_err("detail removed with its segment");
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    });
}

#[then("the highway's total configured length is \"{expected}\"")]
fn total_configured_length(world: &RegistryWorld, expected: String) {
    let rows = world.with_seeded(|s| {
        world
            .block_on(
                s.service
                    .highway_configuration_totals(&s.central, Some(s.highway.number.as_str())),
            )
            .expect("report")
    });
    assert_eq!(rows.len(), 1);
    assert_eq!(format!("{:.3}", rows[0].total_length_km), expected);
}

#[scenario(path = "tests/features/corridor_registry.feature", index = 0)]
fn touching_segments_coexist(world: RegistryWorld) {
    drop(world);
}

#[scenario(path = "tests/features/corridor_registry.feature", index = 1)]
fn details_stay_inside_their_segment(world: RegistryWorld) {
    drop(world);
}

#[scenario(path = "tests/features/corridor_registry.feature", index = 2)]
fn division_users_are_scoped(world: RegistryWorld) {
    drop(world);
}

#[scenario(path = "tests/features/corridor_registry.feature", index = 3)]
fn deleting_a_segment_removes_details(world: RegistryWorld) {
    drop(world);
}

#[scenario(path = "tests/features/corridor_registry.feature", index = 4)]
fn configuration_totals_add_up(world: RegistryWorld) {
    drop(world);
}
