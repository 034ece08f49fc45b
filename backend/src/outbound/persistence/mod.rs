//! PostgreSQL persistence for the registry using Diesel ORM.
//!
//! Connections come from a `bb8` pool with `diesel-async`. Row structs and
//! table definitions stay private; only the store, the pool and the migration
//! runner are exported.
//!
//! # Example
//!
//! ```ignore
//! use corridor::outbound::persistence::{DbPool, DieselRegistryStore, PoolConfig, run_migrations};
//!
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let store = DieselRegistryStore::new(pool);
//! ```

mod diesel_registry_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_registry_store::DieselRegistryStore;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
