//! Login credentials and the service that checks them.
//!
//! Handlers build [`LoginCredentials`] from raw payload strings, then hand
//! them to [`AuthenticationService`], which compares the secret through the
//! [`SecretHasher`] port and stamps the login in the registry.

use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroizing;

use super::ports::{RegistryStore, SecretHasher};
use super::registry::Registry;
use super::{Error, User};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

impl From<LoginValidationError> for Error {
    fn from(value: LoginValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use corridor::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" madurai_office ", "secret").unwrap();
/// assert_eq!(creds.username(), "madurai_office");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username suitable for lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

fn invalid_credentials() -> Error {
    Error::unauthenticated("invalid credentials")
}

/// Checks credentials against stored users.
pub struct AuthenticationService<S: ?Sized> {
    registry: Arc<Registry<S>>,
    hasher: Arc<dyn SecretHasher>,
}

impl<S> AuthenticationService<S>
where
    S: RegistryStore + ?Sized,
{
    /// Create a service over a shared registry.
    pub fn new(registry: Arc<Registry<S>>, hasher: Arc<dyn SecretHasher>) -> Self {
        Self { registry, hasher }
    }

    /// Authenticate and record the login.
    ///
    /// Unknown users, inactive users and wrong passwords all fail with the
    /// same `Unauthenticated` error.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(user) = self.registry.user_by_username(credentials.username()).await else {
            return Err(invalid_credentials());
        };
        if !user.active {
            return Err(invalid_credentials());
        }
        match self.hasher.verify(credentials.password(), user.secret_hash()) {
            Ok(true) => {}
            Ok(false) => return Err(invalid_credentials()),
            Err(err) => {
                warn!(user_id = %user.id, error = %err, "stored secret hash is unreadable");
                return Err(Error::internal("credential check failed"));
            }
        }
        let user = self.registry.record_login(user.id).await?;
        info!(user_id = %user.id, "login succeeded");
        Ok(user)
    }
}
