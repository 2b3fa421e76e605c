use std::sync::RwLock;

/// Source of the bearer token attached to API requests.
///
/// Consulted on every request, so a token stored after login is picked up
/// without rebuilding the client.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// In-memory credentials, used for `--token` and after a login in the same process
#[derive(Debug, Default)]
pub struct MemoryCredentials {
    token: RwLock<Option<String>>,
}

impl MemoryCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: Option<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }
}

impl CredentialProvider for MemoryCredentials {
    fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Provider for anonymous use
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_credentials_updates() {
        let creds = MemoryCredentials::new(None);
        assert_eq!(creds.token(), None);

        creds.set(Some("jwt-token".to_string()));
        assert_eq!(creds.token().as_deref(), Some("jwt-token"));

        creds.set(None);
        assert_eq!(creds.token(), None);
    }
}
