use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::enums::LikeAction;

// Identifiers are opaque to the client; the server may send them as strings or numbers
mod opaque_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        })
    }

    pub mod seq {
        use super::RawId;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<Vec<RawId>> = Option::deserialize(deserializer)?;
            Ok(raw
                .unwrap_or_default()
                .into_iter()
                .map(|id| match id {
                    RawId::Text(s) => s,
                    RawId::Number(n) => n.to_string(),
                })
                .collect())
        }
    }
}

/// Format a server timestamp as `YYYY-MM-DD`.
///
/// Accepts RFC3339 as well as the offset-less `2024-05-01T12:30:00` form.
/// Returns `None` when the value cannot be parsed.
pub fn display_date(raw: &str) -> Option<String> {
    let date: NaiveDate = if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        dt.date_naive()
    } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        dt.date()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?
    };
    Some(date.format("%Y-%m-%d").to_string())
}

/// A post as held by an open post view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub created_at: String,
    /// Whether the current viewer likes this post
    pub is_liked: bool,
    pub likes: u32,
    pub image_ids: Vec<String>,
}

impl Post {
    /// Apply a confirmed like/unlike. The count never drops below zero.
    pub fn apply_like(&mut self, action: LikeAction) {
        match action {
            LikeAction::Add => {
                self.is_liked = true;
                self.likes = self.likes.saturating_add(1);
            }
            LikeAction::Remove => {
                self.is_liked = false;
                self.likes = self.likes.saturating_sub(1);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(deserialize_with = "opaque_id::deserialize")]
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Body of `GET /posts/{id}`: the post, the viewer's like state, the first
/// page of comments and the attached image identifiers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(deserialize_with = "opaque_id::deserialize")]
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, alias = "isLiked")]
    pub liked: bool,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default, deserialize_with = "opaque_id::seq::deserialize")]
    pub image_ids: Vec<String>,
}

impl PostDetailResponse {
    /// Split the response into the post and its comment list.
    /// Negative like counts from the server are clamped to zero.
    pub fn into_parts(self) -> (Post, Vec<Comment>) {
        let likes = u32::try_from(self.likes.max(0)).unwrap_or(u32::MAX);
        let post = Post {
            id: self.id,
            title: self.title,
            content: self.content,
            author: self.author,
            created_at: self.created_at,
            is_liked: self.liked,
            likes,
            image_ids: self.image_ids,
        };
        (post, self.comments)
    }
}

/// Resolved display URLs keyed by image identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrlMap {
    urls: HashMap<String, String>,
}

impl ImageUrlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair ids with urls by position. Returns `None` if the lengths differ.
    pub fn from_positional(ids: &[String], urls: Vec<String>) -> Option<Self> {
        if ids.len() != urls.len() {
            return None;
        }
        let urls = ids.iter().cloned().zip(urls).collect();
        Some(Self { urls })
    }

    pub fn get(&self, image_id: &str) -> Option<&str> {
        self.urls.get(image_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// URLs in the order of `ids`, skipping ids without a resolved URL
    pub fn ordered<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a str> + 'a {
        ids.iter().filter_map(move |id| self.get(id))
    }
}

/// One row of the paginated board listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    #[serde(deserialize_with = "opaque_id::deserialize")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub num_of_comments: Option<u32>,
    #[serde(default)]
    pub num_of_recommendations: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPage {
    pub content: Vec<PostSummary>,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

// Request/Response types for API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthLoginUrlResponse {
    pub login_url: String,
}

/// Error body returned with non-success statuses
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_json() -> serde_json::Value {
        serde_json::json!({
            "id": 42,
            "title": "Hello",
            "content": "First post",
            "author": null,
            "createdAt": "2024-05-01T12:30:00",
            "liked": true,
            "likes": 3,
            "comments": [
                { "id": "c1", "content": "nice one", "author": "kim", "createdAt": "2024-05-02T08:00:00" }
            ],
            "imageIds": ["img-a", "img-b"]
        })
    }

    #[test]
    fn test_post_detail_normalizes_into_parts() {
        let detail: PostDetailResponse = serde_json::from_value(detail_json()).unwrap();
        let (post, comments) = detail.into_parts();

        assert_eq!(post.id, "42");
        assert!(post.is_liked);
        assert_eq!(post.likes, 3);
        assert_eq!(post.image_ids, vec!["img-a", "img-b"]);
        assert_eq!(post.author, None);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, "c1");
    }

    #[test]
    fn test_negative_likes_are_clamped() {
        let mut json = detail_json();
        json["likes"] = serde_json::json!(-4);
        let detail: PostDetailResponse = serde_json::from_value(json).unwrap();
        let (post, _) = detail.into_parts();
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = serde_json::json!({ "id": "p1", "title": "t", "content": "c" });
        let detail: PostDetailResponse = serde_json::from_value(json).unwrap();
        let (post, comments) = detail.into_parts();
        assert!(!post.is_liked);
        assert_eq!(post.likes, 0);
        assert!(post.image_ids.is_empty());
        assert!(comments.is_empty());
    }

    #[test]
    fn test_is_liked_alias_accepted() {
        let mut json = detail_json();
        json.as_object_mut().unwrap().remove("liked");
        json["isLiked"] = serde_json::json!(true);
        let detail: PostDetailResponse = serde_json::from_value(json).unwrap();
        assert!(detail.liked);
    }

    #[test]
    fn test_apply_like_floors_at_zero() {
        let (mut post, _) = serde_json::from_value::<PostDetailResponse>(detail_json())
            .unwrap()
            .into_parts();
        post.likes = 0;
        post.apply_like(LikeAction::Remove);
        assert_eq!(post.likes, 0);
        assert!(!post.is_liked);

        post.apply_like(LikeAction::Add);
        assert_eq!(post.likes, 1);
        assert!(post.is_liked);
    }

    #[test]
    fn test_image_url_map_positional() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let map = ImageUrlMap::from_positional(&ids, vec!["urlA".into(), "urlB".into()]).unwrap();
        assert_eq!(map.get("a"), Some("urlA"));
        assert_eq!(map.get("b"), Some("urlB"));
        assert_eq!(map.ordered(&ids).collect::<Vec<_>>(), vec!["urlA", "urlB"]);

        assert!(ImageUrlMap::from_positional(&ids, vec!["urlA".into()]).is_none());
    }

    #[test]
    fn test_display_date_formats() {
        assert_eq!(display_date("2024-05-01T12:30:00").as_deref(), Some("2024-05-01"));
        assert_eq!(display_date("2024-05-01T23:30:00Z").as_deref(), Some("2024-05-01"));
        assert_eq!(display_date("2024-05-01").as_deref(), Some("2024-05-01"));
        assert_eq!(display_date("yesterday"), None);
    }

    #[test]
    fn test_create_comment_request_is_camel_case() {
        let req = CreateCommentRequest {
            post_id: "7".into(),
            content: "hello there".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "postId": "7", "content": "hello there" }));
    }
}
