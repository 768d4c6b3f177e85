use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_required: Option<String>,
    pub headcount: i32,
    pub is_vacant: bool,
    pub pin_state: String,
    pub created_at: DateTime<Utc>,
}

/// Posting joined with its application count, as shown on the employer
/// dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingWithApplications {
    pub id: Uuid,
    pub employer_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills_required: Option<String>,
    pub headcount: i32,
    pub is_vacant: bool,
    pub pin_state: String,
    pub created_at: DateTime<Utc>,
    pub applications_received: i64,
}

/// Manual-override state for a posting's open/closed flag. Automatic closure
/// only acts on unpinned postings; a pinned flag stays where the operator put
/// it until explicitly unpinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinState {
    Unpinned,
    PinnedOpen,
    PinnedClosed,
}

impl PinState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PinState::Unpinned => "unpinned",
            PinState::PinnedOpen => "pinned_open",
            PinState::PinnedClosed => "pinned_closed",
        }
    }
}

impl std::str::FromStr for PinState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpinned" => Ok(PinState::Unpinned),
            "pinned_open" => Ok(PinState::PinnedOpen),
            "pinned_closed" => Ok(PinState::PinnedClosed),
            other => Err(format!("unknown pin state: {}", other)),
        }
    }
}
