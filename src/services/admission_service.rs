use crate::error::{Error, Result};
use crate::services::ledger_service::CapacityLedger;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Outcome of an admission check. Rejection is an expected result, not an
/// error; it carries the numbers the caller needs for a precise message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admitted,
    Rejected { committed: i64, limit: i64 },
}

#[derive(Clone)]
pub struct AdmissionControl {
    pool: PgPool,
}

impl AdmissionControl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn admit(
        &self,
        employer_id: Uuid,
        proposed_headcount: i32,
        exclude_posting: Option<Uuid>,
    ) -> Result<AdmissionDecision> {
        let mut conn = self.pool.acquire().await?;
        Self::admit_on(&mut conn, employer_id, proposed_headcount, exclude_posting).await
    }

    /// The check itself, on a caller-held connection. A negative headcount is
    /// malformed input and never reaches the ledger. For the edit path the
    /// posting being edited is excluded from the committed sum so it is not
    /// counted against itself.
    pub async fn admit_on(
        conn: &mut PgConnection,
        employer_id: Uuid,
        proposed_headcount: i32,
        exclude_posting: Option<Uuid>,
    ) -> Result<AdmissionDecision> {
        if proposed_headcount < 0 {
            return Err(Error::BadRequest(
                "Headcount must be a non-negative integer".to_string(),
            ));
        }

        let status = CapacityLedger::status_on(conn, employer_id, exclude_posting).await?;
        if status.admits(i64::from(proposed_headcount)) {
            Ok(AdmissionDecision::Admitted)
        } else {
            Ok(AdmissionDecision::Rejected {
                committed: status.committed,
                limit: status.limit,
            })
        }
    }

    /// Flag assigned at create and recomputed at edit: open iff the posting
    /// still has slots declared. Independent of the closure policy.
    pub fn initial_flag(headcount: i32) -> bool {
        headcount > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_headcount_posting_starts_closed() {
        assert!(!AdmissionControl::initial_flag(0));
        assert!(AdmissionControl::initial_flag(1));
        assert!(AdmissionControl::initial_flag(25));
    }
}
