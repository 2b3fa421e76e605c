use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::api::CredentialProvider;

const MIN_TOKEN_LEN: usize = 8;
const MAX_TOKEN_LEN: usize = 4096;

/// Manages JWT storage in the user's home directory.
///
/// The token is stored in `~/.board/jwt` with 0600 permissions
/// so only the owner can read/write the file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    /// Creates a new SessionStore with the default path `~/.board/jwt`.
    ///
    /// # Returns
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(Self::with_path(home_dir.join(".board").join("jwt")))
    }

    /// Creates a SessionStore backed by an explicit file
    pub fn with_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Loads the token from the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(token))` if the file exists and contains a plausible token
    /// - `Ok(None)` if the file doesn't exist or looks corrupted
    /// - `Err(_)` if the file cannot be read
    pub fn load(&self) -> Result<Option<String>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.file_path).context("Failed to read token file")?;
        let token = content.trim();

        if token.is_empty() {
            log::warn!("Token file is empty, treating as logged out");
            return Ok(None);
        }

        if token.len() < MIN_TOKEN_LEN || token.len() > MAX_TOKEN_LEN {
            log::warn!("Stored token has invalid length: {}, treating as corrupted", token.len());
            return Ok(None);
        }

        if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
            log::warn!("Token file contains control characters, treating as corrupted");
            return Ok(None);
        }

        Ok(Some(token.to_string()))
    }

    /// Saves the token with 0600 permissions.
    ///
    /// Writes to a temporary file first and renames it into place so a
    /// crash never leaves a half-written token behind.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create .board directory")?;
        }

        let temp_path = self.file_path.with_extension("tmp");

        let mut file = fs::File::create(&temp_path).context("Failed to create temporary token file")?;
        file.write_all(token.trim().as_bytes())
            .context("Failed to write token")?;
        file.sync_all().context("Failed to sync token file to disk")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&temp_path, permissions)
                .context("Failed to set token file permissions")?;
        }

        fs::rename(&temp_path, &self.file_path).context("Failed to rename temporary token file")?;

        log_session!("Saved token to {}", self.file_path.display());
        Ok(())
    }

    /// Deletes the token file. Succeeds if the file doesn't exist.
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete token file")?;
            log_session!("Deleted token file at {}", self.file_path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl CredentialProvider for SessionStore {
    fn token(&self) -> Option<String> {
        match self.load() {
            Ok(token) => token,
            Err(e) => {
                log::warn!("Could not read stored token: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store(temp_dir: &TempDir) -> SessionStore {
        SessionStore::with_path(temp_dir.path().join("jwt"))
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store.save("header.payload.signature").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("header.payload.signature"));
    }

    #[test]
    fn test_load_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        store.save("header.payload.signature").unwrap();
        assert!(store.path().exists());

        store.delete().unwrap();
        assert!(!store.path().exists());

        // Deleting twice is fine
        store.delete().unwrap();
    }

    #[test]
    fn test_whitespace_only_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        fs::write(store.path(), "   \n\t  ").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_invalid_token_length() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        fs::write(store.path(), "short").unwrap();
        assert_eq!(store.load().unwrap(), None);

        fs::write(store.path(), "a".repeat(MAX_TOKEN_LEN + 1)).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupted_file_with_control_chars() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);

        fs::write(store.path(), b"token\x00with\x01control\x02chars").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);
        store.save("header.payload.signature").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_credential_provider_reads_current_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_test_store(&temp_dir);
        assert_eq!(store.token(), None);

        store.save("header.payload.signature").unwrap();
        assert_eq!(store.token().as_deref(), Some("header.payload.signature"));
    }
}
