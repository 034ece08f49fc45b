//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test as actix_test, web};
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::ports::{FixtureSecretHasher, RegistryStore};
use crate::domain::{
    Caller, ChainageRange, ConfigurationType, ConfigurationTypeDraft, Highway, HighwayDraft,
    Office, OfficeDraft, Registry, Role, Segment, SegmentDraft, UserDraft,
};
use crate::outbound::memory::InMemoryRegistryStore;

use super::api_services;
use super::state::HttpState;

/// Session middleware with a fresh key and insecure cookies for plain HTTP.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by a response.
pub fn session_cookie(res: &ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Password used for every seeded user.
pub const TEST_PASSWORD: &str = "pw";

/// Login name of the bootstrapped central administrator.
pub const ADMIN: &str = "admin";

/// HTTP state over an in-memory registry plus the seeded reference data.
pub struct TestContext {
    pub state: HttpState,
    pub central: Caller,
    pub highway: Highway,
    pub office: Office,
    pub other_office: Office,
    pub kind: ConfigurationType,
}

impl TestContext {
    /// Create a central segment on the seeded highway.
    pub async fn segment(&self, office: &Office, start: f64, end: f64) -> Segment {
        let draft = SegmentDraft::new(
            self.highway.id,
            office.id,
            "section",
            ChainageRange::unchecked(start, end),
        )
        .expect("segment draft");
        self.state
            .corridor
            .create_segment(&self.central, draft)
            .await
            .expect("seed segment")
    }

    /// Create a division user bound to `office` and return its username.
    pub async fn division_user(&self, office: &Office, username: &str) -> String {
        let draft = UserDraft::new(
            username,
            "Division Staff",
            None,
            Role::Division {
                office_id: office.id,
            },
            TEST_PASSWORD,
        )
        .expect("user draft");
        self.state
            .corridor
            .create_user(&self.central, draft)
            .await
            .expect("seed division user");
        username.to_owned()
    }
}

/// Build a context with one admin, one highway, two offices and one build
/// standard.
pub async fn test_context() -> TestContext {
    let store: Arc<dyn RegistryStore> = Arc::new(InMemoryRegistryStore::new());
    let registry = Arc::new(
        Registry::open(store, Arc::new(DefaultClock))
            .await
            .expect("open registry"),
    );
    let state = HttpState::new(registry, Arc::new(FixtureSecretHasher));
    let admin = state
        .corridor
        .bootstrap_central_user(
            UserDraft::new(ADMIN, "Central Admin", None, Role::Central, TEST_PASSWORD)
                .expect("admin draft"),
        )
        .await
        .expect("bootstrap admin")
        .expect("admin created");
    let central = Caller::from_user(&admin);
    let corridor = &state.corridor;
    let highway = corridor
        .create_highway(&central, HighwayDraft::new("NH-44", "North South").expect("draft"))
        .await
        .expect("seed highway");
    let office = corridor
        .create_office(&central, OfficeDraft::new("Hyderabad", "Office 1").expect("draft"))
        .await
        .expect("seed office");
    let other_office = corridor
        .create_office(&central, OfficeDraft::new("Warangal", "Office 2").expect("draft"))
        .await
        .expect("seed office");
    let kind = corridor
        .create_configuration_type(
            &central,
            ConfigurationTypeDraft::new("4L", "Four lane", 1).expect("draft"),
        )
        .await
        .expect("seed configuration type");
    TestContext {
        state,
        central,
        highway,
        office,
        other_office,
        kind,
    }
}

/// Every API handler under `/api/v1` with a test session store.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(api_services))
}

/// Login request for a seeded user.
pub fn login_request(username: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": username, "password": TEST_PASSWORD }))
}
