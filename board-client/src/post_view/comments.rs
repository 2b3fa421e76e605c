use std::collections::HashSet;

use board_types::{Comment, CreateCommentRequest};
use thiserror::Error;

use super::store::PostStateStore;
use crate::api::ApiResult;
use crate::validation::{LengthLimits, ValidationError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A comment is already being posted")]
    SubmitInFlight,

    #[error("That comment is already being deleted")]
    DeleteInFlight,

    #[error("Comment not found")]
    UnknownComment,
}

/// Comment input and the submit/delete requests of one post view.
///
/// Comments are added and removed only after the server confirms; their
/// ids are assigned by the server.
#[derive(Debug)]
pub struct CommentEditor {
    limits: LengthLimits,
    input: String,
    submitting: bool,
    deleting: HashSet<String>,
}

impl CommentEditor {
    pub fn new(limits: LengthLimits) -> Self {
        Self {
            limits,
            input: String::new(),
            submitting: false,
            deleting: HashSet::new(),
        }
    }

    pub fn limits(&self) -> LengthLimits {
        self.limits
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, content: impl Into<String>) {
        self.input = content.into();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_deleting(&self, comment_id: &str) -> bool {
        self.deleting.contains(comment_id)
    }

    pub fn validate(&self, content: &str) -> Result<(), ValidationError> {
        self.limits.check("content", content)
    }

    /// Validate the current input and build the create request.
    /// Nothing is sent when validation fails.
    pub fn begin_submit(&mut self, post_id: &str) -> Result<CreateCommentRequest, CommentError> {
        if self.submitting {
            return Err(CommentError::SubmitInFlight);
        }
        self.validate(&self.input)?;
        self.submitting = true;
        Ok(CreateCommentRequest {
            post_id: post_id.to_string(),
            content: self.input.clone(),
        })
    }

    /// Apply the create result: append and clear the input on success,
    /// keep the input as typed on failure
    pub fn finish_submit(&mut self, result: ApiResult<Comment>, store: &mut PostStateStore) -> Result<(), String> {
        self.submitting = false;
        match result {
            Ok(comment) => {
                let id = comment.id.clone();
                if store.append_comment(comment) {
                    log_comment!("comment {} added to post {}", id, store.post_id());
                } else {
                    log_comment!("comment {} created but post {} is not loaded", id, store.post_id());
                }
                self.input.clear();
                Ok(())
            }
            Err(e) => Err(e.user_message()),
        }
    }

    /// Start deleting a comment that is currently listed
    pub fn begin_delete(&mut self, comment_id: &str, store: &PostStateStore) -> Result<(), CommentError> {
        if !store.comments().iter().any(|c| c.id == comment_id) {
            return Err(CommentError::UnknownComment);
        }
        if !self.deleting.insert(comment_id.to_string()) {
            return Err(CommentError::DeleteInFlight);
        }
        Ok(())
    }

    /// Apply the delete result; the list is untouched on failure
    pub fn finish_delete(
        &mut self,
        comment_id: &str,
        result: ApiResult<()>,
        store: &mut PostStateStore,
    ) -> Result<(), String> {
        self.deleting.remove(comment_id);
        match result {
            Ok(()) => {
                store.remove_comment(comment_id);
                log_comment!("comment {} removed from post {}", comment_id, store.post_id());
                Ok(())
            }
            Err(e) => Err(e.user_message()),
        }
    }
}
