//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only ever talk to the
//! domain services it holds.

use std::sync::Arc;

use crate::domain::ports::{RegistryStore, SecretHasher};
use crate::domain::{AuthenticationService, Caller, CorridorService, Error, Registry};

use super::session::SessionContext;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authorising facade over the registry.
    pub corridor: Arc<CorridorService<dyn RegistryStore>>,
    /// Credential checks for login.
    pub authentication: Arc<AuthenticationService<dyn RegistryStore>>,
}

impl HttpState {
    /// Build both services over one shared registry.
    pub fn new(registry: Arc<Registry<dyn RegistryStore>>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self {
            corridor: Arc::new(CorridorService::new(
                Arc::clone(&registry),
                Arc::clone(&hasher),
            )),
            authentication: Arc::new(AuthenticationService::new(registry, hasher)),
        }
    }

    /// Resolve the session into a caller.
    pub async fn caller(&self, session: &SessionContext) -> Result<Caller, Error> {
        let user_id = session.user_id()?;
        Ok(self.corridor.resolve_caller(user_id).await)
    }
}
