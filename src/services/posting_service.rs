use crate::dto::posting_dto::{CreatePostingPayload, UpdatePostingPayload};
use crate::error::{Error, Result};
use crate::models::job_posting::{JobPosting, JobPostingWithApplications, PinState};
use crate::services::admission_service::{AdmissionControl, AdmissionDecision};
use crate::services::closure_service::ClosurePolicy;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Result of an admission-gated create or edit.
#[derive(Debug, Clone)]
pub enum PostingResult {
    Saved(JobPosting),
    Rejected { committed: i64, limit: i64 },
}

#[derive(Clone)]
pub struct PostingService {
    pool: PgPool,
    closure_policy: ClosurePolicy,
}

impl PostingService {
    pub fn new(pool: PgPool, closure_policy: ClosurePolicy) -> Self {
        Self {
            pool,
            closure_policy,
        }
    }

    // Serializes admission checks per employer so two concurrent postings
    // cannot both pass against the same remaining capacity. Transaction-scoped,
    // released on commit or rollback.
    async fn lock_employer(conn: &mut PgConnection, employer_id: Uuid) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(employer_id.to_string())
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn create(
        &self,
        employer_id: Uuid,
        payload: CreatePostingPayload,
    ) -> Result<PostingResult> {
        let mut tx = self.pool.begin().await?;
        Self::lock_employer(&mut tx, employer_id).await?;

        match AdmissionControl::admit_on(&mut tx, employer_id, payload.headcount, None).await? {
            AdmissionDecision::Rejected { committed, limit } => {
                tx.rollback().await?;
                return Ok(PostingResult::Rejected { committed, limit });
            }
            AdmissionDecision::Admitted => {}
        }

        let is_vacant = AdmissionControl::initial_flag(payload.headcount);
        let posting = sqlx::query_as::<_, JobPosting>(
            "INSERT INTO job_postings (employer_id, title, description, skills_required, headcount, is_vacant)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, employer_id, title, description, skills_required, headcount, is_vacant, pin_state, created_at",
        )
        .bind(employer_id)
        .bind(&payload.title)
        .bind(payload.description.as_deref().unwrap_or(""))
        .bind(&payload.skills_required)
        .bind(payload.headcount)
        .bind(is_vacant)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PostingResult::Saved(posting))
    }

    /// Edit path: the posting's own current headcount is excluded from the
    /// committed sum, the flag is recomputed from the new headcount, and the
    /// closure policy is re-run against the fresh value. A rejected edit
    /// writes nothing.
    pub async fn update(
        &self,
        employer_id: Uuid,
        posting_id: Uuid,
        payload: UpdatePostingPayload,
        now: DateTime<Utc>,
    ) -> Result<PostingResult> {
        let mut tx = self.pool.begin().await?;
        Self::lock_employer(&mut tx, employer_id).await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM job_postings WHERE id = $1 AND employer_id = $2",
        )
        .bind(posting_id)
        .bind(employer_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Err(Error::NotFound(
                "Posting not found or not owned by this employer".to_string(),
            ));
        }

        match AdmissionControl::admit_on(&mut tx, employer_id, payload.headcount, Some(posting_id))
            .await?
        {
            AdmissionDecision::Rejected { committed, limit } => {
                tx.rollback().await?;
                return Ok(PostingResult::Rejected { committed, limit });
            }
            AdmissionDecision::Admitted => {}
        }

        let is_vacant = AdmissionControl::initial_flag(payload.headcount);
        sqlx::query(
            "UPDATE job_postings
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 skills_required = COALESCE($4, skills_required),
                 headcount = $5,
                 is_vacant = $6
             WHERE id = $1",
        )
        .bind(posting_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.skills_required)
        .bind(payload.headcount)
        .bind(is_vacant)
        .execute(&mut *tx)
        .await?;

        self.closure_policy
            .evaluate_on(&mut tx, posting_id, now)
            .await?;

        let posting = sqlx::query_as::<_, JobPosting>(
            "SELECT id, employer_id, title, description, skills_required, headcount, is_vacant, pin_state, created_at
             FROM job_postings
             WHERE id = $1",
        )
        .bind(posting_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(PostingResult::Saved(posting))
    }

    /// Deletes the posting and all of its applications as one unit.
    pub async fn delete(&self, employer_id: Uuid, posting_id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM job_postings WHERE id = $1 AND employer_id = $2",
        )
        .bind(posting_id)
        .bind(employer_id)
        .fetch_optional(&mut *tx)
        .await?;
        if owned.is_none() {
            return Err(Error::NotFound(
                "Posting not found or not owned by this employer".to_string(),
            ));
        }

        sqlx::query("DELETE FROM applications WHERE posting_id = $1")
            .bind(posting_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM job_postings WHERE id = $1")
            .bind(posting_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Manual override. Pinning also forces the flag; unpinning leaves the
    /// flag as-is until the next automatic evaluation.
    pub async fn set_pin(
        &self,
        employer_id: Uuid,
        posting_id: Uuid,
        pin: PinState,
    ) -> Result<JobPosting> {
        let statement = match pin {
            PinState::Unpinned => {
                sqlx::query_as::<_, JobPosting>(
                    "UPDATE job_postings SET pin_state = $3
                     WHERE id = $1 AND employer_id = $2
                     RETURNING id, employer_id, title, description, skills_required, headcount, is_vacant, pin_state, created_at",
                )
            }
            PinState::PinnedOpen | PinState::PinnedClosed => {
                sqlx::query_as::<_, JobPosting>(
                    "UPDATE job_postings SET pin_state = $3, is_vacant = $4
                     WHERE id = $1 AND employer_id = $2
                     RETURNING id, employer_id, title, description, skills_required, headcount, is_vacant, pin_state, created_at",
                )
            }
        };

        let mut query = statement
            .bind(posting_id)
            .bind(employer_id)
            .bind(pin.as_str());
        if pin != PinState::Unpinned {
            query = query.bind(pin == PinState::PinnedOpen);
        }

        let updated = query.fetch_optional(&self.pool).await?;
        updated.ok_or_else(|| {
            Error::NotFound("Posting not found or not owned by this employer".to_string())
        })
    }

    pub async fn get_by_id(&self, posting_id: Uuid) -> Result<JobPosting> {
        let posting = sqlx::query_as::<_, JobPosting>(
            "SELECT id, employer_id, title, description, skills_required, headcount, is_vacant, pin_state, created_at
             FROM job_postings
             WHERE id = $1",
        )
        .bind(posting_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(posting)
    }

    pub async fn list_for_employer(
        &self,
        employer_id: Uuid,
    ) -> Result<Vec<JobPostingWithApplications>> {
        let postings = sqlx::query_as::<_, JobPostingWithApplications>(
            "SELECT p.id, p.employer_id, p.title, p.description, p.skills_required,
                    p.headcount, p.is_vacant, p.pin_state, p.created_at,
                    COUNT(a.id) AS applications_received
             FROM job_postings p
             LEFT JOIN applications a ON p.id = a.posting_id
             WHERE p.employer_id = $1
             GROUP BY p.id
             ORDER BY p.created_at DESC",
        )
        .bind(employer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(postings)
    }

    pub async fn list_open(&self, limit: i64) -> Result<Vec<JobPosting>> {
        let limit = if limit <= 0 { 20 } else { limit.min(100) };
        let postings = sqlx::query_as::<_, JobPosting>(
            "SELECT id, employer_id, title, description, skills_required, headcount, is_vacant, pin_state, created_at
             FROM job_postings
             WHERE is_vacant = TRUE
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(postings)
    }
}
