//! Builders for the registry and the HTTP state that wraps it.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use corridor::domain::ports::RegistryStore;
use corridor::domain::{Error, Registry};
use corridor::inbound::http::state::HttpState;
use corridor::outbound::credentials::Sha256SecretHasher;
use corridor::outbound::memory::InMemoryRegistryStore;
use corridor::outbound::persistence::{DbPool, DieselRegistryStore};

/// Pick the record store: PostgreSQL when a pool is configured, otherwise
/// an in-memory store that forgets everything on restart.
fn build_store(db_pool: Option<&DbPool>) -> Arc<dyn RegistryStore> {
    match db_pool {
        Some(pool) => Arc::new(DieselRegistryStore::new(pool.clone())),
        None => {
            info!("no database configured; registry is held in memory");
            Arc::new(InMemoryRegistryStore::new())
        }
    }
}

/// Open the registry over the configured store and wrap it for handlers.
///
/// # Errors
/// Returns the store's error when the initial snapshot cannot be loaded.
pub async fn build_http_state(db_pool: Option<&DbPool>) -> Result<HttpState, Error> {
    let store = build_store(db_pool);
    let registry = Registry::open(store, Arc::new(DefaultClock)).await?;
    Ok(HttpState::new(
        Arc::new(registry),
        Arc::new(Sha256SecretHasher),
    ))
}
