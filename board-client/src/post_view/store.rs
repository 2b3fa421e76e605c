use board_types::{Comment, ImageUrlMap, LikeAction, Post, PostDetailResponse};

use crate::api::ApiResult;

/// Where the post itself stands; comments and images hang off a loaded post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    /// Load failed; the view shows this message and no post
    Failed(String),
}

/// Identifies one `load` request so that only the latest one is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Result of applying a load completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A newer load was issued; this result was dropped
    Stale,
    /// Post is displayed. `resolve_images` holds ids that need URLs.
    Loaded { resolve_images: Option<Vec<String>> },
    Failed(String),
}

/// A change the server confirmed while a load was outstanding. The load
/// response may predate it, so it is applied again on top of that response.
#[derive(Debug, Clone)]
enum Confirmed {
    Like { is_liked: bool, likes: u32 },
    Appended(Comment),
    Removed(String),
}

/// Canonical view of one post and its comments
#[derive(Debug)]
pub struct PostStateStore {
    post_id: String,
    load_state: LoadState,
    post: Option<Post>,
    comments: Vec<Comment>,
    images: ImageUrlMap,
    /// Image ids the current map was (or is being) computed for
    images_for: Option<Vec<String>>,
    load_seq: u64,
    /// True between `begin_load` and the matching `finish_load`
    load_pending: bool,
    /// Confirmed changes since the outstanding load was issued
    confirmed: Vec<Confirmed>,
    deleting: bool,
}

impl PostStateStore {
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            load_state: LoadState::Loading,
            post: None,
            comments: Vec::new(),
            images: ImageUrlMap::new(),
            images_for: None,
            load_seq: 0,
            load_pending: false,
            confirmed: Vec::new(),
            deleting: false,
        }
    }

    pub fn post_id(&self) -> &str {
        &self.post_id
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// The post, only while it is loaded
    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn images(&self) -> &ImageUrlMap {
        &self.images
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Start a load (or refresh). A post already on screen stays visible
    /// until the new result arrives.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_seq += 1;
        self.load_pending = true;
        // Anything confirmed before this point is reflected in the new response
        self.confirmed.clear();
        if self.post.is_none() {
            self.load_state = LoadState::Loading;
        }
        LoadTicket(self.load_seq)
    }

    /// Apply the result of `GET /posts/{id}`.
    ///
    /// On failure the post and comments are cleared: a failed load never
    /// leaves a stale post on screen. On success, likes and comment changes
    /// confirmed after the load was issued are kept over the response.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: ApiResult<PostDetailResponse>) -> LoadOutcome {
        if ticket.0 != self.load_seq {
            return LoadOutcome::Stale;
        }
        self.load_pending = false;
        let confirmed = std::mem::take(&mut self.confirmed);

        match result {
            Ok(detail) => {
                let (post, comments) = detail.into_parts();
                let resolve_images = self.track_image_ids(&post.image_ids);
                self.post = Some(post);
                self.comments = comments;
                self.replay(confirmed);
                self.load_state = LoadState::Loaded;
                LoadOutcome::Loaded { resolve_images }
            }
            Err(e) => {
                let message = e.user_message();
                self.post = None;
                self.comments.clear();
                self.images = ImageUrlMap::new();
                self.images_for = None;
                self.load_state = LoadState::Failed(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    fn replay(&mut self, confirmed: Vec<Confirmed>) {
        for change in confirmed {
            match change {
                Confirmed::Like { is_liked, likes } => {
                    if let Some(post) = self.post.as_mut() {
                        post.is_liked = is_liked;
                        post.likes = likes;
                    }
                }
                Confirmed::Appended(comment) => {
                    if !self.comments.iter().any(|c| c.id == comment.id) {
                        self.comments.push(comment);
                    }
                }
                Confirmed::Removed(comment_id) => self.comments.retain(|c| c.id != comment_id),
            }
        }
    }

    fn record(&mut self, change: Confirmed) {
        if self.load_pending {
            self.confirmed.push(change);
        }
    }

    /// Reset the image map when the id sequence changed. Returns the ids to
    /// resolve, or `None` when nothing needs fetching.
    fn track_image_ids(&mut self, image_ids: &[String]) -> Option<Vec<String>> {
        if self.images_for.as_deref() == Some(image_ids) {
            return None;
        }
        self.images = ImageUrlMap::new();
        self.images_for = Some(image_ids.to_vec());
        if image_ids.is_empty() {
            None
        } else {
            Some(image_ids.to_vec())
        }
    }

    /// Install resolved URLs if they were requested for the current ids.
    /// Returns `false` for a result that no longer matches the post.
    pub fn apply_images(&mut self, image_ids: &[String], images: ImageUrlMap) -> bool {
        if self.images_for.as_deref() != Some(image_ids) {
            return false;
        }
        self.images = images;
        true
    }

    /// Mark the post as being deleted. Returns `None` if nothing is loaded
    /// or a delete is already in flight.
    pub fn begin_delete(&mut self) -> Option<String> {
        if self.deleting || self.post.is_none() {
            return None;
        }
        self.deleting = true;
        Some(self.post_id.clone())
    }

    /// Apply the delete result. `Ok` means the caller should leave the view.
    pub fn finish_delete(&mut self, result: ApiResult<()>) -> Result<(), String> {
        self.deleting = false;
        result.map_err(|e| e.user_message())
    }

    /// Append a server-confirmed comment. Returns `false` when no post is
    /// loaded, in which case there is no list to show it in.
    pub fn append_comment(&mut self, comment: Comment) -> bool {
        if self.post.is_none() {
            return false;
        }
        self.record(Confirmed::Appended(comment.clone()));
        self.comments.push(comment);
        true
    }

    /// Remove a comment after its deletion was confirmed
    pub fn remove_comment(&mut self, comment_id: &str) -> Option<Comment> {
        self.record(Confirmed::Removed(comment_id.to_string()));
        let index = self.comments.iter().position(|c| c.id == comment_id)?;
        Some(self.comments.remove(index))
    }

    /// Like state changes only through a confirmed like request
    pub(super) fn apply_confirmed_like(&mut self, action: LikeAction) -> bool {
        match self.post.as_mut() {
            Some(post) => {
                post.apply_like(action);
                let change = Confirmed::Like {
                    is_liked: post.is_liked,
                    likes: post.likes,
                };
                self.record(change);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::ApiError;

    pub(crate) fn detail(id: &str, liked: bool, likes: i64, image_ids: &[&str]) -> PostDetailResponse {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": "Weekend meetup",
            "content": "Who is coming on Saturday?",
            "author": "hong",
            "createdAt": "2024-05-01T12:30:00",
            "liked": liked,
            "likes": likes,
            "comments": [
                { "id": "c1", "content": "I am in!", "author": "kim", "createdAt": "2024-05-01T13:00:00" },
                { "id": "c2", "content": "Count me too", "author": null, "createdAt": "2024-05-01T13:05:00" },
                { "id": "c3", "content": "Where exactly?", "author": "lee", "createdAt": "2024-05-01T13:10:00" }
            ],
            "imageIds": image_ids,
        }))
        .unwrap()
    }

    pub(crate) fn comment(id: &str, content: &str) -> Comment {
        Comment {
            id: id.to_string(),
            content: content.to_string(),
            author: Some("park".to_string()),
            created_at: "2024-05-02T09:00:00".to_string(),
        }
    }

    fn loaded_store() -> PostStateStore {
        let mut store = PostStateStore::new("7");
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(detail("7", false, 5, &[])));
        store
    }

    #[test]
    fn test_load_success_requests_images() {
        let mut store = PostStateStore::new("7");
        assert_eq!(store.load_state(), &LoadState::Loading);

        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Ok(detail("7", false, 5, &["a", "b"])));

        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                resolve_images: Some(vec!["a".to_string(), "b".to_string()])
            }
        );
        assert_eq!(store.load_state(), &LoadState::Loaded);
        assert_eq!(store.post().unwrap().likes, 5);
        assert_eq!(store.comments().len(), 3);
    }

    #[test]
    fn test_load_without_images_skips_resolution() {
        let mut store = PostStateStore::new("7");
        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Ok(detail("7", false, 5, &[])));
        assert_eq!(outcome, LoadOutcome::Loaded { resolve_images: None });
    }

    #[test]
    fn test_load_failure_shows_no_post() {
        let mut store = loaded_store();
        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Err(ApiError::from_status(404, Some("No such post".into()))));

        assert_eq!(outcome, LoadOutcome::Failed("No such post".to_string()));
        assert_eq!(store.load_state(), &LoadState::Failed("No such post".to_string()));
        assert!(store.post().is_none());
        assert!(store.comments().is_empty());
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut store = PostStateStore::new("7");
        let first = store.begin_load();
        let second = store.begin_load();

        assert_eq!(store.finish_load(first, Ok(detail("7", true, 9, &[]))), LoadOutcome::Stale);
        assert!(store.post().is_none());

        store.finish_load(second, Ok(detail("7", false, 5, &[])));
        assert_eq!(store.post().unwrap().likes, 5);
    }

    #[test]
    fn test_refresh_with_same_images_does_not_resolve_again() {
        let mut store = PostStateStore::new("7");
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(detail("7", false, 5, &["a"])));
        let ids = vec!["a".to_string()];
        let map = ImageUrlMap::from_positional(&ids, vec!["urlA".into()]).unwrap();
        assert!(store.apply_images(&ids, map));

        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Ok(detail("7", false, 5, &["a"])));
        assert_eq!(outcome, LoadOutcome::Loaded { resolve_images: None });
        assert_eq!(store.images().get("a"), Some("urlA"));

        let ticket = store.begin_load();
        let outcome = store.finish_load(ticket, Ok(detail("7", false, 5, &["a", "b"])));
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                resolve_images: Some(vec!["a".to_string(), "b".to_string()])
            }
        );
        assert!(store.images().is_empty());
    }

    #[test]
    fn test_images_for_old_ids_are_dropped() {
        let mut store = PostStateStore::new("7");
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(detail("7", false, 5, &["x"])));

        let old = vec!["a".to_string()];
        let map = ImageUrlMap::from_positional(&old, vec!["urlA".into()]).unwrap();
        assert!(!store.apply_images(&old, map));
        assert!(store.images().is_empty());
    }

    #[test]
    fn test_remove_comment_preserves_order() {
        let mut store = loaded_store();
        let removed = store.remove_comment("c2").unwrap();

        assert_eq!(removed.id, "c2");
        let ids: Vec<&str> = store.comments().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c3"]);
        assert!(store.remove_comment("missing").is_none());
        assert_eq!(store.comments().len(), 2);
    }

    #[test]
    fn test_append_comment_goes_last() {
        let mut store = loaded_store();
        store.append_comment(comment("c9", "late to the party"));
        assert_eq!(store.comments().last().unwrap().id, "c9");
        assert_eq!(store.comments().len(), 4);
    }

    #[test]
    fn test_append_without_post_is_dropped() {
        let mut store = loaded_store();
        let ticket = store.begin_load();
        store.finish_load(ticket, Err(ApiError::from_status(500, None)));

        assert!(!store.append_comment(comment("c9", "anyone there?")));
        assert!(store.comments().is_empty());
    }

    #[test]
    fn test_changes_confirmed_during_load_survive_its_response() {
        let mut store = loaded_store();
        let ticket = store.begin_load();

        assert!(store.apply_confirmed_like(LikeAction::Add));
        assert!(store.append_comment(comment("c9", "late to the party")));
        store.remove_comment("c1");

        // Response was produced before any of the above
        store.finish_load(ticket, Ok(detail("7", false, 5, &[])));
        let post = store.post().unwrap();
        assert!(post.is_liked);
        assert_eq!(post.likes, 6);
        let ids: Vec<&str> = store.comments().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c3", "c9"]);

        // A load issued afterwards is taken as is
        let ticket = store.begin_load();
        store.finish_load(ticket, Ok(detail("7", false, 5, &[])));
        assert!(!store.post().unwrap().is_liked);
        assert_eq!(store.comments().len(), 3);
    }

    #[test]
    fn test_delete_is_single_flight() {
        let mut store = loaded_store();
        assert_eq!(store.begin_delete().as_deref(), Some("7"));
        assert!(store.begin_delete().is_none());

        let err = store
            .finish_delete(Err(ApiError::from_status(403, Some("Not your post".into()))))
            .unwrap_err();
        assert_eq!(err, "Not your post");
        assert!(!store.is_deleting());
        assert!(store.post().is_some());
    }

    #[test]
    fn test_delete_requires_loaded_post() {
        let mut store = PostStateStore::new("7");
        assert!(store.begin_delete().is_none());
    }
}
