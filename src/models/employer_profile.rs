use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One per employer account, replaced wholesale on every save.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerProfile {
    pub account_id: Uuid,
    pub company_name: String,
    pub vacancy_capacity: i32,
    pub staff_count: i32,
    pub location: Option<String>,
    pub contact_info: Option<String>,
    pub updated_at: DateTime<Utc>,
}
