use serde::{Deserialize, Serialize};

/// Direction of a like toggle, fixed when the request begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeAction {
    Add,
    Remove,
}

impl LikeAction {
    /// The action that toggles the given like state
    pub fn toggling(is_liked: bool) -> Self {
        if is_liked {
            LikeAction::Remove
        } else {
            LikeAction::Add
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LikeAction::Add => "add",
            LikeAction::Remove => "remove",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Error,
}
