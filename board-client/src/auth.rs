use anyhow::{Context, Result};
use board_types::{CreatePostRequest, LoginRequest, SignUpRequest, User};

use crate::api::ApiClient;
use crate::session::SessionStore;
use crate::validation::{
    check_email, ValidationError, LOGIN_PASSWORD_LIMITS, POST_CONTENT_LIMITS, POST_TITLE_LIMITS,
    SIGNUP_PASSWORD_LIMITS, USERNAME_LIMITS,
};

/// Check a login form before it is sent
pub fn validate_login(request: &LoginRequest) -> Result<(), ValidationError> {
    check_email("email", &request.email)?;
    LOGIN_PASSWORD_LIMITS.check("password", &request.password)
}

/// Check a sign-up form before it is sent
pub fn validate_sign_up(request: &SignUpRequest) -> Result<(), ValidationError> {
    USERNAME_LIMITS.check("username", &request.username)?;
    SIGNUP_PASSWORD_LIMITS.check("password", &request.password)?;
    if request.password != request.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    check_email("email", &request.email)
}

/// Check a new post before it is sent
pub fn validate_post(request: &CreatePostRequest) -> Result<(), ValidationError> {
    POST_TITLE_LIMITS.check("title", &request.title)?;
    POST_CONTENT_LIMITS.check("content", &request.content)
}

/// Manages login, sign-up and the OAuth redirect flow.
///
/// Tokens obtained here are written to the session store, which is also
/// the credential provider of the API client, so later requests carry them.
pub struct AuthFlow {
    api_client: ApiClient,
    session_store: SessionStore,
}

impl AuthFlow {
    pub fn new(api_client: ApiClient, session_store: SessionStore) -> Self {
        Self {
            api_client,
            session_store,
        }
    }

    /// Returns the logged-in user if a stored token is still accepted.
    /// A rejected token is removed.
    pub async fn check_existing_session(&self) -> Result<Option<User>> {
        if self.session_store.load()?.is_none() {
            log::debug!("No existing session found");
            return Ok(None);
        }

        match self.api_client.current_user().await {
            Ok(user) => {
                log_session!("session is valid for user: {}", user.username);
                Ok(Some(user))
            }
            Err(e) => {
                log::warn!("Session validation failed: {}", e);
                let _ = self.session_store.delete();
                Ok(None)
            }
        }
    }

    /// Log in with email and password and store the token
    pub async fn login(&self, request: &LoginRequest) -> Result<()> {
        validate_login(request)?;
        let token = self
            .api_client
            .login(request)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        self.session_store.save(&token).context("Failed to save session token")?;
        log_session!("logged in as {}", request.email);
        Ok(())
    }

    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<()> {
        validate_sign_up(request)?;
        self.api_client
            .sign_up(request)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        log_session!("signed up {}", request.username);
        Ok(())
    }

    /// Fetch the third-party login page and open it in the browser.
    /// Returns the URL so it can be shown if the browser does not open.
    pub async fn start_oauth(&self) -> Result<String> {
        let login_url = self
            .api_client
            .oauth_login_url()
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;

        log::info!("Opening browser to: {}", login_url);
        if let Err(e) = webbrowser::open(&login_url) {
            log::warn!("Failed to open browser: {}", e);
        }
        Ok(login_url)
    }

    /// Exchange the code from the OAuth redirect for a token and store it
    pub async fn complete_oauth(&self, code: &str) -> Result<()> {
        let code = code.trim();
        if code.is_empty() {
            anyhow::bail!("Authorization code is empty");
        }
        let token = self
            .api_client
            .oauth_callback(code)
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        self.session_store.save(&token).context("Failed to save session token")?;
        log_session!("OAuth login completed");
        Ok(())
    }

    /// Forget the stored token
    pub fn logout(&self) -> Result<()> {
        self.session_store.delete().context("Failed to delete session token")?;
        log_session!("logged out");
        Ok(())
    }
}
