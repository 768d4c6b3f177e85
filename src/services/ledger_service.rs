use crate::error::Result;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

/// Snapshot of an employer's vacancy capacity: the declared limit and the
/// headcount already committed across their postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityStatus {
    pub limit: i64,
    pub committed: i64,
}

impl CapacityStatus {
    pub fn remaining(&self) -> i64 {
        (self.limit - self.committed).max(0)
    }

    pub fn can_post(&self) -> bool {
        self.remaining() > 0
    }

    /// Admission rule: the proposed headcount fits alongside what is already
    /// committed.
    pub fn admits(&self, proposed: i64) -> bool {
        self.committed + proposed <= self.limit
    }
}

#[derive(Clone)]
pub struct CapacityLedger {
    pool: PgPool,
}

impl CapacityLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pure read. An employer without a profile has a limit of 0, and no
    /// postings sum to a committed count of 0; absence of data is never an
    /// error here.
    pub async fn status(
        &self,
        employer_id: Uuid,
        exclude_posting: Option<Uuid>,
    ) -> Result<CapacityStatus> {
        let mut conn = self.pool.acquire().await?;
        Self::status_on(&mut conn, employer_id, exclude_posting).await
    }

    /// Same read on a caller-held connection, so admission can keep its
    /// transaction (and advisory lock) across check and write.
    pub async fn status_on(
        conn: &mut PgConnection,
        employer_id: Uuid,
        exclude_posting: Option<Uuid>,
    ) -> Result<CapacityStatus> {
        let limit: Option<i32> = sqlx::query_scalar(
            "SELECT vacancy_capacity FROM employer_profiles WHERE account_id = $1",
        )
        .bind(employer_id)
        .fetch_optional(&mut *conn)
        .await?;

        let committed: i64 = match exclude_posting {
            Some(excluded) => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(headcount), 0)
                     FROM job_postings
                     WHERE employer_id = $1 AND id != $2",
                )
                .bind(employer_id)
                .bind(excluded)
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(headcount), 0)
                     FROM job_postings
                     WHERE employer_id = $1",
                )
                .bind(employer_id)
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(CapacityStatus {
            limit: i64::from(limit.unwrap_or(0)),
            committed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_never_negative() {
        let status = CapacityStatus {
            limit: 5,
            committed: 9,
        };
        assert_eq!(status.remaining(), 0);
        assert!(!status.can_post());
    }

    #[test]
    fn remaining_subtracts_committed() {
        let status = CapacityStatus {
            limit: 10,
            committed: 7,
        };
        assert_eq!(status.remaining(), 3);
        assert!(status.can_post());
    }

    #[test]
    fn admits_up_to_the_limit() {
        // capacity 10, 7 committed: a posting of 3 fills it exactly
        let status = CapacityStatus {
            limit: 10,
            committed: 7,
        };
        assert!(status.admits(3));
        assert!(!status.admits(4));
    }

    #[test]
    fn full_ledger_rejects_any_headcount() {
        let status = CapacityStatus {
            limit: 10,
            committed: 10,
        };
        assert!(!status.admits(1));
        assert!(status.admits(0));
    }

    #[test]
    fn zero_limit_admits_only_zero() {
        // an employer without a profile reads as limit 0
        let status = CapacityStatus {
            limit: 0,
            committed: 0,
        };
        assert!(status.admits(0));
        assert!(!status.admits(1));
        assert!(!status.can_post());
    }
}
