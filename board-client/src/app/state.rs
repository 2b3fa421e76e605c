use std::sync::Arc;

use board_types::{Comment, ImageUrlMap, PostDetailResponse};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::api::{ApiResult, BoardApi};
use crate::config::ClientConfig;
use crate::notify::Notifications;
use crate::post_view::{ImageResolver, LikeTicket, LoadTicket, PostView, SessionId};
use crate::share::ShareTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Board listing; where the view navigates after closing or deleting a post
    Board,
    PostView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Navigation, // Shortcuts active
    Typing,     // Writing a comment, shortcuts disabled
}

/// Result of a background request, tagged with the view that issued it
#[derive(Debug)]
pub enum Completion {
    PostLoaded {
        session: SessionId,
        ticket: LoadTicket,
        result: ApiResult<PostDetailResponse>,
    },
    ImagesResolved {
        session: SessionId,
        image_ids: Vec<String>,
        images: ImageUrlMap,
    },
    LikeFinished {
        session: SessionId,
        ticket: LikeTicket,
        result: ApiResult<()>,
    },
    CommentCreated {
        session: SessionId,
        result: ApiResult<Comment>,
    },
    CommentDeleted {
        session: SessionId,
        comment_id: String,
        result: ApiResult<()>,
    },
    PostDeleted {
        session: SessionId,
        result: ApiResult<()>,
    },
}

impl Completion {
    pub fn session(&self) -> SessionId {
        match self {
            Completion::PostLoaded { session, .. }
            | Completion::ImagesResolved { session, .. }
            | Completion::LikeFinished { session, .. }
            | Completion::CommentCreated { session, .. }
            | Completion::CommentDeleted { session, .. }
            | Completion::PostDeleted { session, .. } => *session,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Completion::PostLoaded { .. } => "post_loaded",
            Completion::ImagesResolved { .. } => "images_resolved",
            Completion::LikeFinished { .. } => "like_finished",
            Completion::CommentCreated { .. } => "comment_created",
            Completion::CommentDeleted { .. } => "comment_deleted",
            Completion::PostDeleted { .. } => "post_deleted",
        }
    }
}

/// Main application state
pub struct App {
    pub running: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    /// The active post view; `None` on the board screen
    pub view: Option<PostView>,
    pub notifications: Notifications,
    pub config: ClientConfig,
    pub(super) api: Arc<dyn BoardApi>,
    pub(super) images: ImageResolver,
    pub(super) share: Box<dyn ShareTarget>,
    pub(super) completions_tx: UnboundedSender<Completion>,
    pub(super) completions_rx: UnboundedReceiver<Completion>,
}
