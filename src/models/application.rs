use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub posting_id: Uuid,
    pub applicant_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub preferred_location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Application joined with its posting title, for the cross-posting employer
/// view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationWithPosting {
    pub id: Uuid,
    pub posting_id: Uuid,
    pub applicant_id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience: Option<String>,
    pub preferred_location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub posting_title: String,
}
