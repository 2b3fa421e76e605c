use board_types::Post;
use serde::Serialize;

/// Social counters shown on a shared card
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialCounts {
    pub like_count: u32,
    pub comment_count: u32,
    pub view_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareButton {
    pub title: String,
    pub web_url: String,
}

/// Feed-style share card for a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePayload {
    pub title: String,
    pub image_url: Option<String>,
    pub web_url: String,
    pub social: SocialCounts,
    pub buttons: Vec<ShareButton>,
}

impl SharePayload {
    /// Build the card for `post`, linking to its page under `web_base_url`
    pub fn for_post(post: &Post, comment_count: usize, image_url: Option<&str>, web_base_url: &str) -> Self {
        let web_url = format!(
            "{}/posts/{}",
            web_base_url.trim_end_matches('/'),
            urlencoding::encode(&post.id)
        );
        Self {
            title: post.title.clone(),
            image_url: image_url.map(str::to_string),
            web_url: web_url.clone(),
            social: SocialCounts {
                like_count: post.likes,
                comment_count: u32::try_from(comment_count).unwrap_or(u32::MAX),
                view_count: 0,
            },
            buttons: vec![ShareButton {
                title: "View on web".to_string(),
                web_url,
            }],
        }
    }
}

/// Destination for share cards. Sharing is fire-and-forget: failures are
/// logged, never reported back into view state.
pub trait ShareTarget: Send + Sync {
    fn share(&self, payload: &SharePayload);
}

/// Opens a share intent for the card in the system browser
#[derive(Debug, Clone)]
pub struct BrowserShare {
    share_url: String,
}

impl BrowserShare {
    pub fn new(share_url: impl Into<String>) -> Self {
        Self {
            share_url: share_url.into(),
        }
    }

    pub fn intent_url(&self, payload: &SharePayload) -> String {
        format!(
            "{}?url={}&text={}",
            self.share_url,
            urlencoding::encode(&payload.web_url),
            urlencoding::encode(&payload.title)
        )
    }
}

impl ShareTarget for BrowserShare {
    fn share(&self, payload: &SharePayload) {
        let url = self.intent_url(payload);
        if let Ok(json) = serde_json::to_string(payload) {
            log::debug!("Share payload: {}", json);
        }
        log::info!("Sharing post via {}", url);
        if let Err(e) = webbrowser::open(&url) {
            log::warn!("Failed to open share link: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post() -> Post {
        Post {
            id: "12".to_string(),
            title: "Hello & welcome".to_string(),
            content: "Long content".to_string(),
            author: None,
            created_at: String::new(),
            is_liked: false,
            likes: 3,
            image_ids: vec!["img".to_string()],
        }
    }

    #[test]
    fn test_payload_for_post() {
        let payload = SharePayload::for_post(&post(), 4, Some("https://cdn/img"), "https://board.example.com/");

        assert_eq!(payload.web_url, "https://board.example.com/posts/12");
        assert_eq!(payload.image_url.as_deref(), Some("https://cdn/img"));
        assert_eq!(payload.social.like_count, 3);
        assert_eq!(payload.social.comment_count, 4);
        assert_eq!(payload.buttons[0].web_url, payload.web_url);
    }

    #[test]
    fn test_intent_url_is_encoded() {
        let payload = SharePayload::for_post(&post(), 0, None, "https://board.example.com");
        let share = BrowserShare::new("https://twitter.com/intent/tweet");

        assert_eq!(
            share.intent_url(&payload),
            "https://twitter.com/intent/tweet?url=https%3A%2F%2Fboard.example.com%2Fposts%2F12&text=Hello%20%26%20welcome"
        );
    }
}
