mod client;
mod credentials;
mod error;

use async_trait::async_trait;
use board_types::{Comment, CreateCommentRequest, PostDetailResponse};

pub use client::ApiClient;
pub use credentials::{CredentialProvider, MemoryCredentials, NoCredentials};
pub use error::{ApiError, ApiResult, GENERIC_SERVER_ERROR};

/// The backend calls the post view needs.
///
/// `ApiClient` is the HTTP implementation; tests substitute an in-memory one.
#[async_trait]
pub trait BoardApi: Send + Sync {
    /// `GET /posts/{id}`: post, like state, comments and image ids
    async fn get_post(&self, post_id: &str) -> ApiResult<PostDetailResponse>;

    /// `DELETE /posts/{id}`
    async fn delete_post(&self, post_id: &str) -> ApiResult<()>;

    /// `POST /posts/{id}/likes`
    async fn add_like(&self, post_id: &str) -> ApiResult<()>;

    /// `DELETE /posts/{id}/likes`
    async fn remove_like(&self, post_id: &str) -> ApiResult<()>;

    /// `POST /comments`
    async fn create_comment(&self, request: &CreateCommentRequest) -> ApiResult<Comment>;

    /// `DELETE /comments/{id}`
    async fn delete_comment(&self, comment_id: &str) -> ApiResult<()>;

    /// `POST /storage/accessUrls`: urls in the same order as `image_ids`
    async fn resolve_access_urls(&self, image_ids: &[String]) -> ApiResult<Vec<String>>;
}
