use crate::dto::application_dto::ApplyPayload;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationWithPosting};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records one application per (applicant, posting) pair. The unique
    /// constraint is the real guard; ON CONFLICT DO NOTHING means a raced
    /// double submit stores exactly one row and the loser sees a conflict.
    pub async fn submit(
        &self,
        posting_id: Uuid,
        applicant_id: Uuid,
        payload: ApplyPayload,
    ) -> Result<Application> {
        let posting_exists: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM job_postings WHERE id = $1")
                .bind(posting_id)
                .fetch_optional(&self.pool)
                .await?;
        if posting_exists.is_none() {
            return Err(Error::NotFound(format!("Posting {} not found", posting_id)));
        }

        let application = sqlx::query_as::<_, Application>(
            "INSERT INTO applications (posting_id, applicant_id, full_name, email, phone, experience, preferred_location)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (posting_id, applicant_id) DO NOTHING
             RETURNING id, posting_id, applicant_id, full_name, email, phone, experience, preferred_location, created_at",
        )
        .bind(posting_id)
        .bind(applicant_id)
        .bind(&payload.full_name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(&payload.experience)
        .bind(&payload.preferred_location)
        .fetch_optional(&self.pool)
        .await?;

        application.ok_or_else(|| {
            Error::Conflict("You have already applied for this job".to_string())
        })
    }

    pub async fn list_for_posting(&self, posting_id: Uuid) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT id, posting_id, applicant_id, full_name, email, phone, experience, preferred_location, created_at
             FROM applications
             WHERE posting_id = $1
             ORDER BY created_at DESC",
        )
        .bind(posting_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    /// All applications across an employer's postings, newest first.
    pub async fn list_for_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<ApplicationWithPosting>> {
        let applications = sqlx::query_as::<_, ApplicationWithPosting>(
            "SELECT a.id, a.posting_id, a.applicant_id, a.full_name, a.email, a.phone,
                    a.experience, a.preferred_location, a.created_at,
                    p.title AS posting_title
             FROM applications a
             JOIN job_postings p ON a.posting_id = p.id
             WHERE p.employer_id = $1
             ORDER BY a.created_at DESC",
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    pub async fn count_for_posting(&self, posting_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE posting_id = $1")
                .bind(posting_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
