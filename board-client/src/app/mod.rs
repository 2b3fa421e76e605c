use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::api::BoardApi;
use crate::config::ClientConfig;
use crate::notify::Notifications;
use crate::post_view::{CommentError, ImageResolver, LikeOutcome, LoadOutcome, PostView, SessionId, ToggleRejected};
use crate::share::{SharePayload, ShareTarget};

pub mod state;
pub use state::*;
pub mod handlers;


impl App {
    pub fn new(api: Arc<dyn BoardApi>, config: ClientConfig, share: Box<dyn ShareTarget>) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            running: true,
            screen: Screen::Board,
            input_mode: InputMode::Navigation,
            view: None,
            notifications: Notifications::new(),
            config,
            images: ImageResolver::new(api.clone()),
            api,
            share,
            completions_tx,
            completions_rx,
        }
    }

    /// Run a request in the background; its completion is delivered through
    /// the completion channel and applied by `apply_completion`
    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            // The receiver lives as long as the app; a send error only happens on shutdown
            let _ = tx.send(request.await);
        });
    }

    /// Wait for the next background completion
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.recv().await
    }

    /// Take a completion if one is ready, without waiting
    pub fn try_next_completion(&mut self) -> Option<Completion> {
        self.completions_rx.try_recv().ok()
    }

    /// The active view, if it is the one identified by `session`
    fn live_view(&mut self, session: SessionId) -> Option<&mut PostView> {
        self.view.as_mut().filter(|view| view.id == session)
    }

    // Session lifecycle

    /// Open a post: tears down any current view, then starts the load
    pub fn open_post(&mut self, post_id: impl Into<String>) {
        self.close_post();

        let view = PostView::new(post_id, &self.config);
        log_session!("opening post {} in session {}", view.post_id(), view.id);
        self.view = Some(view);
        self.screen = Screen::PostView;
        self.input_mode = InputMode::Navigation;
        self.load_post();
    }

    /// Re-fetch the current post and its comments
    pub fn refresh(&mut self) {
        self.load_post();
    }

    fn load_post(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let session = view.id;
        let ticket = view.store.begin_load();
        let post_id = view.post_id().to_string();
        let api = self.api.clone();
        self.spawn_request(async move {
            let result = api.get_post(&post_id).await;
            Completion::PostLoaded { session, ticket, result }
        });
    }

    fn resolve_images(&self, session: SessionId, image_ids: Vec<String>) {
        let resolver = self.images.clone();
        self.spawn_request(async move {
            let images = resolver.resolve(&image_ids).await;
            Completion::ImagesResolved {
                session,
                image_ids,
                images,
            }
        });
    }

    /// Leave the post view. Requests still in flight complete into nothing.
    pub fn close_post(&mut self) {
        if let Some(mut view) = self.view.take() {
            view.dispose();
            log_session!("closed session {} for post {}", view.id, view.post_id());
        }
        self.screen = Screen::Board;
        self.input_mode = InputMode::Navigation;
    }

    // Likes

    /// Toggle the like on the current post (throttled, single-flight)
    pub fn toggle_like(&mut self, now: Instant) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        match view.like.request_toggle(&view.store, now) {
            Ok(_) => {}
            Err(ToggleRejected::NotLoaded) => {
                self.notifications.error("The post has not loaded yet.", now);
            }
            // Dropped silently; the like control already shows it is busy
            Err(ToggleRejected::InFlight) | Err(ToggleRejected::Disposed) => {}
        }
    }

    /// Issue time-based work: a throttled like request that became due, and
    /// notice expiry
    pub fn tick(&mut self, now: Instant) {
        self.notifications.prune(now);

        let Some(view) = self.view.as_mut() else {
            return;
        };
        let Some(ticket) = view.like.poll(&view.store, now) else {
            return;
        };
        let session = view.id;
        let api = self.api.clone();
        self.spawn_request(async move {
            let result = match ticket.action {
                board_types::LikeAction::Add => api.add_like(&ticket.post_id).await,
                board_types::LikeAction::Remove => api.remove_like(&ticket.post_id).await,
            };
            Completion::LikeFinished { session, ticket, result }
        });
    }

    // Comments

    /// Validate and submit the comment being written
    pub fn submit_comment(&mut self, now: Instant) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        if view.store.post().is_none() {
            self.notifications.error("The post has not loaded yet.", now);
            return;
        }
        let post_id = view.post_id().to_string();
        let request = match view.editor.begin_submit(&post_id) {
            Ok(request) => request,
            Err(CommentError::SubmitInFlight) => return,
            Err(e) => {
                self.notifications.error(e.to_string(), now);
                return;
            }
        };
        let session = view.id;
        let api = self.api.clone();
        log_comment!("submitting comment to post {}", post_id);
        self.spawn_request(async move {
            let result = api.create_comment(&request).await;
            Completion::CommentCreated { session, result }
        });
    }

    /// Delete the comment under the cursor
    pub fn delete_selected_comment(&mut self, now: Instant) {
        let comment_id = self.view.as_ref().and_then(|view| {
            let index = view.selected_comment?;
            view.store.comments().get(index).map(|c| c.id.clone())
        });
        if let Some(comment_id) = comment_id {
            self.delete_comment(&comment_id, now);
        }
    }

    pub fn delete_comment(&mut self, comment_id: &str, now: Instant) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        match view.editor.begin_delete(comment_id, &view.store) {
            Ok(()) => {}
            Err(CommentError::DeleteInFlight) => return,
            Err(e) => {
                self.notifications.error(e.to_string(), now);
                return;
            }
        }
        let session = view.id;
        let api = self.api.clone();
        let comment_id = comment_id.to_string();
        self.spawn_request(async move {
            let result = api.delete_comment(&comment_id).await;
            Completion::CommentDeleted {
                session,
                comment_id,
                result,
            }
        });
    }

    /// Comment editing is offered in the menu but not supported by the client
    pub fn edit_comment(&mut self, now: Instant) {
        self.notifications.info("Editing comments is not supported yet.", now);
    }

    // Post

    pub fn delete_post(&mut self) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let Some(post_id) = view.store.begin_delete() else {
            return;
        };
        let session = view.id;
        let api = self.api.clone();
        self.spawn_request(async move {
            let result = api.delete_post(&post_id).await;
            Completion::PostDeleted { session, result }
        });
    }

    /// Hand the current post to the share target
    pub fn share_post(&mut self) {
        let Some(view) = self.view.as_ref() else {
            return;
        };
        let Some(post) = view.store.post() else {
            return;
        };
        let image_url = view.store.images().ordered(&post.image_ids).next();
        let payload = SharePayload::for_post(post, view.store.comments().len(), image_url, &self.config.web_url);
        self.share.share(&payload);
    }

    // Completions

    /// Apply a background completion to the view that issued it. Completions
    /// from a view that is no longer active are dropped.
    pub fn apply_completion(&mut self, completion: Completion, now: Instant) {
        let session = completion.session();
        if self.live_view(session).is_none() {
            log_session!("dropping {} for inactive session {}", completion.kind(), session);
            return;
        }

        match completion {
            Completion::PostLoaded { ticket, result, .. } => {
                let Some(view) = self.live_view(session) else { return };
                match view.store.finish_load(ticket, result) {
                    LoadOutcome::Loaded { resolve_images } => {
                        view.clamp_selection();
                        if let Some(image_ids) = resolve_images {
                            self.resolve_images(session, image_ids);
                        }
                    }
                    LoadOutcome::Failed(message) => self.notifications.error(message, now),
                    LoadOutcome::Stale => {}
                }
            }
            Completion::ImagesResolved { image_ids, images, .. } => {
                let Some(view) = self.live_view(session) else { return };
                if !view.store.apply_images(&image_ids, images) {
                    log_image!("dropping image urls for outdated ids");
                }
            }
            Completion::LikeFinished { ticket, result, .. } => {
                let Some(view) = self.live_view(session) else { return };
                match view.like.complete(&ticket, result, &mut view.store) {
                    LikeOutcome::Failed(message) => self.notifications.error(message, now),
                    LikeOutcome::Applied(_) | LikeOutcome::Ignored => {}
                }
            }
            Completion::CommentCreated { result, .. } => {
                let Some(view) = self.live_view(session) else { return };
                match view.editor.finish_submit(result, &mut view.store) {
                    Ok(()) => self.input_mode = InputMode::Navigation,
                    Err(message) => self.notifications.error(message, now),
                }
            }
            Completion::CommentDeleted { comment_id, result, .. } => {
                let Some(view) = self.live_view(session) else { return };
                let outcome = view.editor.finish_delete(&comment_id, result, &mut view.store);
                view.clamp_selection();
                if let Err(message) = outcome {
                    self.notifications.error(message, now);
                }
            }
            Completion::PostDeleted { result, .. } => {
                let Some(view) = self.live_view(session) else { return };
                match view.store.finish_delete(result) {
                    Ok(()) => {
                        self.close_post();
                        self.notifications.info("Post deleted.", now);
                    }
                    Err(message) => self.notifications.error(message, now),
                }
            }
        }
    }

    /// Apply every completion that is already waiting
    pub fn drain_completions(&mut self, now: Instant) {
        while let Some(completion) = self.try_next_completion() {
            self.apply_completion(completion, now);
        }
    }
}
