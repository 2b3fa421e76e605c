use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::{ApiError, ApiResult, BoardApi, CredentialProvider, NoCredentials};
use board_types::*;

/// API client for communicating with the board server
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// `base_url` is the API root (already including any `/api` prefix).
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            credentials,
        }
    }

    /// Client that never sends an Authorization header
    pub fn anonymous(base_url: impl Into<String>) -> Self {
        Self::new(base_url, Arc::new(NoCredentials))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token if the credential provider has one
    fn add_auth_header(&self, req: RequestBuilder) -> RequestBuilder {
        match self.credentials.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> ApiResult<Response> {
        let response = self.add_auth_header(req).send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    /// Turn a non-success response into an `ApiError`, keeping the server's
    /// `message` when the body carries one
    async fn error_from_response(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message);
        log_api_call!("request failed: status={} message={:?}", status, message);
        ApiError::from_status(status, message)
    }

    /// Helper to handle JSON API responses
    async fn handle_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let response = self.send(req).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Helper for endpoints that answer with an empty body or a plain ack
    async fn handle_ack(&self, req: RequestBuilder) -> ApiResult<()> {
        self.send(req).await?;
        Ok(())
    }

    /// Helper for endpoints that return a bare token, either as text or as a JSON string
    async fn handle_token(&self, req: RequestBuilder) -> ApiResult<String> {
        let response = self.send(req).await?;
        let is_json = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let body = response.text().await?;
        let token = if is_json {
            match serde_json::from_str::<serde_json::Value>(&body)? {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            }
        } else {
            body
        };
        Ok(token.trim().to_string())
    }

    // Board endpoints

    /// Get one page of the board listing. `page` is 1-based.
    pub async fn list_posts(&self, page: u32) -> ApiResult<PostPage> {
        let url = self.url(&format!("/posts?page={}", page.saturating_sub(1)));
        log_api_call!("GET {}", url);
        self.handle_json(self.client.get(&url)).await
    }

    /// Create a new post
    pub async fn create_post(&self, request: &CreatePostRequest) -> ApiResult<serde_json::Value> {
        let url = self.url("/posts");
        log_api_call!("POST {}", url);
        self.handle_json(self.client.post(&url).json(request)).await
    }

    // Authentication endpoints

    /// Log in with email and password; returns the JWT
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<String> {
        let url = self.url("/users/login");
        log_api_call!("POST {}", url);
        self.handle_token(self.client.post(&url).json(request)).await
    }

    /// Register a new account
    pub async fn sign_up(&self, request: &SignUpRequest) -> ApiResult<()> {
        let url = self.url("/users");
        log_api_call!("POST {}", url);
        self.handle_ack(self.client.post(&url).json(request)).await
    }

    /// Get the logged-in user
    pub async fn current_user(&self) -> ApiResult<User> {
        let url = self.url("/users/me");
        log_api_call!("GET {}", url);
        self.handle_json(self.client.get(&url)).await
    }

    /// Get the third-party authorization page to send the user to
    pub async fn oauth_login_url(&self) -> ApiResult<String> {
        let url = self.url("/auth/kakao/login");
        log_api_call!("GET {}", url);
        let response: OAuthLoginUrlResponse = self.handle_json(self.client.get(&url)).await?;
        Ok(response.login_url)
    }

    /// Exchange the authorization code from the OAuth redirect for a JWT
    pub async fn oauth_callback(&self, code: &str) -> ApiResult<String> {
        let url = self.url(&format!(
            "/auth/oauth2/kakao/callback?code={}",
            urlencoding::encode(code)
        ));
        log_api_call!("GET {}", self.url("/auth/oauth2/kakao/callback"));
        self.handle_token(self.client.get(&url)).await
    }
}

#[async_trait]
impl BoardApi for ApiClient {
    async fn get_post(&self, post_id: &str) -> ApiResult<PostDetailResponse> {
        let url = self.url(&format!("/posts/{}", urlencoding::encode(post_id)));
        log_api_call!("GET {}", url);
        self.handle_json(self.client.get(&url)).await
    }

    async fn delete_post(&self, post_id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/posts/{}", urlencoding::encode(post_id)));
        log_api_call!("DELETE {}", url);
        self.handle_ack(self.client.delete(&url)).await
    }

    async fn add_like(&self, post_id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/posts/{}/likes", urlencoding::encode(post_id)));
        log_api_call!("POST {}", url);
        self.handle_ack(self.client.post(&url)).await
    }

    async fn remove_like(&self, post_id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/posts/{}/likes", urlencoding::encode(post_id)));
        log_api_call!("DELETE {}", url);
        self.handle_ack(self.client.delete(&url)).await
    }

    async fn create_comment(&self, request: &CreateCommentRequest) -> ApiResult<Comment> {
        let url = self.url("/comments");
        log_api_call!("POST {} post_id={}", url, request.post_id);
        self.handle_json(self.client.post(&url).json(request)).await
    }

    async fn delete_comment(&self, comment_id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/comments/{}", urlencoding::encode(comment_id)));
        log_api_call!("DELETE {}", url);
        self.handle_ack(self.client.delete(&url)).await
    }

    async fn resolve_access_urls(&self, image_ids: &[String]) -> ApiResult<Vec<String>> {
        let url = self.url("/storage/accessUrls");
        log_api_call!("POST {} ids={}", url, image_ids.len());
        self.handle_json(self.client.post(&url).json(image_ids)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryCredentials;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::anonymous("http://localhost:8080/api/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.url("/posts/1"), "http://localhost:8080/api/posts/1");
    }

    #[test]
    fn test_auth_header_follows_provider() {
        let creds = Arc::new(MemoryCredentials::new(None));
        let client = ApiClient::new("http://localhost:8080/api", creds.clone());

        let req = client
            .add_auth_header(client.client.get(client.url("/users/me")))
            .build()
            .unwrap();
        assert!(req.headers().get(header::AUTHORIZATION).is_none());

        creds.set(Some("abc.def.ghi".to_string()));
        let req = client
            .add_auth_header(client.client.get(client.url("/users/me")))
            .build()
            .unwrap();
        assert_eq!(
            req.headers().get(header::AUTHORIZATION).unwrap(),
            "Bearer abc.def.ghi"
        );
    }
}
