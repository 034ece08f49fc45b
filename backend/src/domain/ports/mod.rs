//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod registry_store;
mod secret_hasher;

#[cfg(test)]
pub use registry_store::MockRegistryStore;
pub use registry_store::{
    FixtureRegistryStore, RegistryMutation, RegistrySnapshot, RegistryStore, RegistryStoreError,
};
#[cfg(test)]
pub use secret_hasher::MockSecretHasher;
pub use secret_hasher::{FixtureSecretHasher, SecretHasher, SecretHasherError};
