use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

/// Oldest notices are dropped past this many.
pub const MAX_NOTICES: usize = 32;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A dismissible message shown to the user.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: String,
    pub level: NoticeLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_script_lines: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Default)]
pub struct NoticeBoard {
    notices: Arc<RwLock<Vec<Notice>>>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notice and returns its id. Re-posting a showing message at the
    /// same level refreshes that notice (same id, moved to newest) instead of
    /// adding a copy.
    pub fn push(
        &self,
        level: NoticeLevel,
        message: impl Into<String>,
        affected_script_lines: Vec<u32>,
    ) -> String {
        let message = message.into();
        let mut notices = self.notices.write();

        let id = match notices
            .iter()
            .position(|notice| notice.level == level && notice.message == message)
        {
            Some(index) => notices.remove(index).id,
            None => Uuid::new_v4().to_string(),
        };
        notices.push(Notice {
            id: id.clone(),
            level,
            message,
            affected_script_lines,
            created_at: Utc::now(),
        });

        if notices.len() > MAX_NOTICES {
            let excess = notices.len() - MAX_NOTICES;
            notices.drain(..excess);
        }
        id
    }

    /// Returns whether a notice with `id` was showing.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut notices = self.notices.write();
        let before = notices.len();
        notices.retain(|notice| notice.id != id);
        notices.len() != before
    }

    /// Oldest first.
    pub fn active(&self) -> Vec<Notice> {
        self.notices.read().clone()
    }

    pub fn clear(&self) {
        self.notices.write().clear();
    }
}
