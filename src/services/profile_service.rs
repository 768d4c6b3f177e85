use crate::dto::profile_dto::SaveProfilePayload;
use crate::error::{Error, Result};
use crate::models::employer_profile::EmployerProfile;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileService {
    pool: PgPool,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, account_id: Uuid) -> Result<Option<EmployerProfile>> {
        let profile = sqlx::query_as::<_, EmployerProfile>(
            "SELECT account_id, company_name, vacancy_capacity, staff_count, location, contact_info, updated_at
             FROM employer_profiles
             WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Wholesale upsert, last write wins. The capacity-vs-staff invariant is
    /// checked only when replacing an existing profile, not on first save.
    pub async fn save(
        &self,
        account_id: Uuid,
        payload: SaveProfilePayload,
    ) -> Result<EmployerProfile> {
        let existing = self.get(account_id).await?;
        if existing.is_some() && payload.vacancy_capacity > payload.staff_count {
            return Err(Error::BadRequest(format!(
                "Vacancy capacity ({}) cannot exceed total staff count ({})",
                payload.vacancy_capacity, payload.staff_count
            )));
        }

        let profile = sqlx::query_as::<_, EmployerProfile>(
            "INSERT INTO employer_profiles (account_id, company_name, vacancy_capacity, staff_count, location, contact_info, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, NOW())
             ON CONFLICT (account_id) DO UPDATE SET
                 company_name = EXCLUDED.company_name,
                 vacancy_capacity = EXCLUDED.vacancy_capacity,
                 staff_count = EXCLUDED.staff_count,
                 location = EXCLUDED.location,
                 contact_info = EXCLUDED.contact_info,
                 updated_at = NOW()
             RETURNING account_id, company_name, vacancy_capacity, staff_count, location, contact_info, updated_at",
        )
        .bind(account_id)
        .bind(&payload.company_name)
        .bind(payload.vacancy_capacity)
        .bind(payload.staff_count)
        .bind(&payload.location)
        .bind(&payload.contact_info)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
