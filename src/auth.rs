use crate::errors::{AppError, AppResult};
use std::sync::{Arc, RwLock};

pub const AUTH_USERNAME_KEY: &str = "maraschino_username";
pub const AUTH_PASSWORD_KEY: &str = "maraschino_password";

/// Credentials guarding the dashboard itself. `None` disables the check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Shared handle to the live authentication configuration. Settings saves
/// mutate it through these setters so changes apply without a restart.
#[derive(Debug, Clone, Default)]
pub struct AuthHandle {
    inner: Arc<RwLock<AuthConfig>>,
}

impl AuthHandle {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn snapshot(&self) -> AppResult<AuthConfig> {
        let guard = self
            .inner
            .read()
            .map_err(|_| AppError::Internal("auth lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    /// An empty value clears the credential.
    pub fn set_username(&self, value: &str) -> AppResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| AppError::Internal("auth lock poisoned".to_string()))?;
        guard.username = non_empty(value);
        Ok(())
    }

    pub fn set_password(&self, value: &str) -> AppResult<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| AppError::Internal("auth lock poisoned".to_string()))?;
        guard.password = non_empty(value);
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthConfig, AuthHandle};

    #[test]
    fn setters_are_visible_through_clones() {
        let handle = AuthHandle::default();
        let other = handle.clone();

        handle.set_username("bob").expect("set username");
        assert_eq!(
            other.snapshot().expect("snapshot").username.as_deref(),
            Some("bob")
        );
    }

    #[test]
    fn empty_value_clears_the_credential() {
        let handle = AuthHandle::new(AuthConfig {
            username: Some("bob".to_string()),
            password: Some("hunter2".to_string()),
        });

        handle.set_username("").expect("clear username");
        handle.set_password("").expect("clear password");

        let config = handle.snapshot().expect("snapshot");
        assert_eq!(config, AuthConfig::default());
    }
}
