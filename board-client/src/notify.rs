use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub use board_types::NoticeLevel;

/// How long a notice stays on screen
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

const MAX_NOTICES: usize = 5;

/// A transient, toast-style message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub expires_at: Instant,
}

/// Queue of transient notices shown over the current view
#[derive(Debug, Default)]
pub struct Notifications {
    notices: VecDeque<Notice>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, text: impl Into<String>, now: Instant) {
        self.push(NoticeLevel::Info, text.into(), now);
    }

    pub fn error(&mut self, text: impl Into<String>, now: Instant) {
        self.push(NoticeLevel::Error, text.into(), now);
    }

    fn push(&mut self, level: NoticeLevel, text: String, now: Instant) {
        if level == NoticeLevel::Error {
            log::warn!("{}", text);
        }
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            text,
            expires_at: now + NOTICE_TTL,
        });
    }

    /// Drop notices that have expired
    pub fn prune(&mut self, now: Instant) {
        self.notices.retain(|n| n.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
