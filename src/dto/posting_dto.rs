use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::job_posting::PinState;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePostingPayload {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    pub skills_required: Option<String>,
    #[validate(range(min = 0))]
    pub headcount: i32,
}

/// Edits always carry the new headcount since every edit is re-admitted
/// against the ledger; descriptive fields are optional and keep their stored
/// value when absent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePostingPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub skills_required: Option<String>,
    #[validate(range(min = 0))]
    pub headcount: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinPayload {
    pub pin_state: PinState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingListQuery {
    pub limit: Option<i64>,
}
