//! State of one open post: the post and its comments, the like toggle,
//! the comment editor and resolved image URLs.

mod comments;
mod images;
mod like;
mod store;

use std::fmt;

use uuid::Uuid;

use crate::config::ClientConfig;

pub use comments::{CommentEditor, CommentError};
pub use images::ImageResolver;
pub use like::{LikeCoordinator, LikeOutcome, LikeThrottle, LikeTicket, ToggleRejected};
pub use store::{LoadOutcome, LoadState, LoadTicket, PostStateStore};

#[cfg(test)]
pub(crate) use store::tests as fixtures;

/// Identifies one open post view. Results of requests issued by a view
/// carry its id and are dropped once another view is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything owned by one open post view
#[derive(Debug)]
pub struct PostView {
    pub id: SessionId,
    pub store: PostStateStore,
    pub like: LikeCoordinator,
    pub editor: CommentEditor,
    /// Index into the comment list for delete
    pub selected_comment: Option<usize>,
}

impl PostView {
    pub fn new(post_id: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            id: SessionId::new(),
            store: PostStateStore::new(post_id),
            like: LikeCoordinator::new(config.like_throttle()),
            editor: CommentEditor::new(config.comment_limits),
            selected_comment: None,
        }
    }

    pub fn post_id(&self) -> &str {
        self.store.post_id()
    }

    /// Move the comment selection by `delta`, clamped to the list.
    /// With nothing selected yet, the first comment is selected.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.store.comments().len();
        self.selected_comment = match self.selected_comment {
            _ if len == 0 => None,
            None => Some(0),
            Some(current) => {
                let next = (current as isize + delta).clamp(0, len as isize - 1);
                Some(next as usize)
            }
        };
    }

    /// Keep the selection inside the list after it shrank or grew
    pub fn clamp_selection(&mut self) {
        let len = self.store.comments().len();
        self.selected_comment = match self.selected_comment {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => None,
        };
    }

    /// Teardown on navigation away
    pub fn dispose(&mut self) {
        self.like.dispose();
    }
}
