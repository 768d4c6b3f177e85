use crate::error::{Error, Result};
use crate::models::job_posting::PinState;
use chrono::{DateTime, Duration, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostingState {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosureOutcome {
    pub state: PostingState,
    /// Whether the stored flag was rewritten by this evaluation.
    pub changed: bool,
}

/// Evaluates whether a posting's open/closed flag should flip, on demand:
/// after an application is recorded and after a headcount edit. There is no
/// background scheduler.
#[derive(Clone)]
pub struct ClosurePolicy {
    pool: PgPool,
    window: Duration,
}

impl ClosurePolicy {
    pub fn new(pool: PgPool, deactivation_days: i64) -> Self {
        Self {
            pool,
            window: Duration::days(deactivation_days),
        }
    }

    /// The transition rule. Saturation requires strictly more applications
    /// than the declared headcount; reaching it exactly does not count.
    pub fn decide(
        applications_received: i64,
        headcount: i32,
        posted_at: DateTime<Utc>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> PostingState {
        let is_saturated = applications_received > i64::from(headcount);
        let is_expired = now - posted_at > window;
        if is_saturated && is_expired {
            PostingState::Closed
        } else {
            PostingState::Open
        }
    }

    pub async fn evaluate(&self, posting_id: Uuid, now: DateTime<Utc>) -> Result<ClosureOutcome> {
        let mut conn = self.pool.acquire().await?;
        self.evaluate_on(&mut conn, posting_id, now).await
    }

    /// Loads the posting and its application count, decides, and writes the
    /// flag back only when it actually changes. Pinned postings are left
    /// alone. A missing posting is NotFound; a storage failure aborts with no
    /// write and no assumed state.
    pub async fn evaluate_on(
        &self,
        conn: &mut PgConnection,
        posting_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<ClosureOutcome> {
        let row: Option<(i32, bool, String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT headcount, is_vacant, pin_state, created_at
             FROM job_postings
             WHERE id = $1",
        )
        .bind(posting_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some((headcount, is_vacant, pin_state, created_at)) = row else {
            return Err(Error::NotFound(format!("Posting {} not found", posting_id)));
        };

        // Operator pins suspend automatic evaluation until unpinned.
        if pin_state != PinState::Unpinned.as_str() {
            let state = if is_vacant {
                PostingState::Open
            } else {
                PostingState::Closed
            };
            return Ok(ClosureOutcome {
                state,
                changed: false,
            });
        }

        let applications_received: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE posting_id = $1")
                .bind(posting_id)
                .fetch_one(&mut *conn)
                .await?;

        let state = Self::decide(applications_received, headcount, created_at, now, self.window);
        let new_flag = state == PostingState::Open;
        let changed = new_flag != is_vacant;

        if changed {
            sqlx::query("UPDATE job_postings SET is_vacant = $1 WHERE id = $2")
                .bind(new_flag)
                .bind(posting_id)
                .execute(&mut *conn)
                .await?;
            tracing::info!(posting_id = %posting_id, open = new_flag, "posting flag flipped");
        }

        Ok(ClosureOutcome { state, changed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn posted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn days_later(days: i64) -> DateTime<Utc> {
        posted_at() + Duration::days(days)
    }

    const WINDOW: i64 = 30;

    fn decide(applications: i64, headcount: i32, age_days: i64) -> PostingState {
        ClosurePolicy::decide(
            applications,
            headcount,
            posted_at(),
            days_later(age_days),
            Duration::days(WINDOW),
        )
    }

    #[test]
    fn exactly_headcount_is_not_saturated() {
        // 5 applications for 5 slots, 45 days old: stays open
        assert_eq!(decide(5, 5, 45), PostingState::Open);
    }

    #[test]
    fn over_headcount_and_expired_closes() {
        assert_eq!(decide(6, 5, 45), PostingState::Closed);
    }

    #[test]
    fn over_headcount_but_fresh_stays_open() {
        assert_eq!(decide(6, 5, 10), PostingState::Open);
    }

    #[test]
    fn expired_but_undersubscribed_stays_open() {
        assert_eq!(decide(0, 5, 45), PostingState::Open);
    }

    #[test]
    fn window_boundary_is_strict() {
        // exactly 30 days old is not yet expired
        assert_eq!(decide(6, 5, 30), PostingState::Open);
        assert_eq!(decide(6, 5, 31), PostingState::Closed);
    }

    #[test]
    fn zero_headcount_closes_after_window_with_any_application() {
        assert_eq!(decide(1, 0, 31), PostingState::Closed);
        assert_eq!(decide(0, 0, 31), PostingState::Open);
    }

    #[test]
    fn custom_window_is_respected() {
        let state = ClosurePolicy::decide(
            6,
            5,
            posted_at(),
            days_later(8),
            Duration::days(7),
        );
        assert_eq!(state, PostingState::Closed);
    }
}
