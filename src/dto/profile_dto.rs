use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::ledger_service::CapacityStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveProfilePayload {
    #[validate(length(min = 1))]
    pub company_name: String,
    #[validate(range(min = 0))]
    pub vacancy_capacity: i32,
    #[validate(range(min = 0))]
    pub staff_count: i32,
    pub location: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityStatusResponse {
    pub limit: i64,
    pub committed: i64,
    pub remaining: i64,
    pub can_post: bool,
}

impl From<CapacityStatus> for CapacityStatusResponse {
    fn from(status: CapacityStatus) -> Self {
        Self {
            limit: status.limit,
            committed: status.committed,
            remaining: status.remaining(),
            can_post: status.can_post(),
        }
    }
}
