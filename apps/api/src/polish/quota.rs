use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::dream::PolishQuotaRow;
use crate::models::user::VipStatus;

const CREATE_RETRIES: u32 = 3;
const CREATE_BACKOFF_MS: u64 = 50;

/// Quota rows are keyed by the UTC day.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn fetch_vip_status(pool: &PgPool, user_id: Uuid) -> Result<VipStatus, AppError> {
    sqlx::query_as::<_, VipStatus>("SELECT is_vip, vip_expire_at FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Finds or lazily creates today's quota row.
///
/// First use of a day can race with itself: two requests both miss the read
/// and both insert. The loser hits the (user_id, date) unique constraint and
/// re-reads after a short backoff instead of erroring.
pub async fn get_or_create_quota(
    pool: &PgPool,
    user_id: Uuid,
    daily_total: i32,
) -> Result<PolishQuotaRow, AppError> {
    let today = today_utc();

    for attempt in 0..CREATE_RETRIES {
        if let Some(quota) = sqlx::query_as::<_, PolishQuotaRow>(
            "SELECT * FROM polish_quotas WHERE user_id = $1 AND date = $2",
        )
        .bind(user_id)
        .bind(today)
        .fetch_optional(pool)
        .await?
        {
            return Ok(quota);
        }

        let inserted = sqlx::query_as::<_, PolishQuotaRow>(
            "INSERT INTO polish_quotas (user_id, date, total, used, remaining) \
             VALUES ($1, $2, $3, 0, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(today)
        .bind(daily_total)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(quota) => return Ok(quota),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                warn!(
                    "quota row for user {user_id} on {today} created by a racing request \
                     (attempt {})",
                    attempt + 1
                );
                tokio::time::sleep(std::time::Duration::from_millis(
                    CREATE_BACKOFF_MS * (attempt as u64 + 1),
                ))
                .await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(anyhow::anyhow!(
        "quota row for user {user_id} kept conflicting after {CREATE_RETRIES} attempts"
    )))
}

/// Consumes one polish, atomically and only while quota remains. The check
/// and the decrement are a single conditional UPDATE so two concurrent
/// requests at `remaining = 1` cannot both succeed.
///
/// Returns the post-consumption row, or `None` when nothing was left.
pub async fn consume<'e, E>(
    executor: E,
    user_id: Uuid,
    day: NaiveDate,
) -> Result<Option<PolishQuotaRow>, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, PolishQuotaRow>(
        "UPDATE polish_quotas SET used = used + 1, remaining = remaining - 1, updated_at = now() \
         WHERE user_id = $1 AND date = $2 AND remaining > 0 RETURNING *",
    )
    .bind(user_id)
    .bind(day)
    .fetch_optional(executor)
    .await
}

/// What callers see of a user's daily allowance. VIP reports -1 as
/// "unlimited" in both total and remaining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    pub date: NaiveDate,
    pub total: i32,
    pub used: i32,
    pub remaining: i32,
    pub is_vip: bool,
}

pub fn snapshot_from(row: &PolishQuotaRow, vip_active: bool) -> QuotaSnapshot {
    if vip_active {
        QuotaSnapshot {
            date: row.date,
            total: -1,
            used: row.used,
            remaining: -1,
            is_vip: true,
        }
    } else {
        QuotaSnapshot {
            date: row.date,
            total: row.total,
            used: row.used,
            remaining: row.remaining,
            is_vip: false,
        }
    }
}

/// Today's quota as shown to the user, creating the row on first read.
pub async fn quota_snapshot(
    pool: &PgPool,
    user_id: Uuid,
    daily_total: i32,
) -> Result<QuotaSnapshot, AppError> {
    let vip = fetch_vip_status(pool, user_id).await?;
    let row = get_or_create_quota(pool, user_id, daily_total).await?;
    Ok(snapshot_from(&row, vip.is_active(Utc::now())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(total: i32, used: i32, remaining: i32) -> PolishQuotaRow {
        PolishQuotaRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date: today_utc(),
            total,
            used,
            remaining,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_passes_through_for_free_tier() {
        let snapshot = snapshot_from(&row(3, 1, 2), false);
        assert_eq!(snapshot.total, 3);
        assert_eq!(snapshot.used, 1);
        assert_eq!(snapshot.remaining, 2);
        assert!(!snapshot.is_vip);
    }

    #[test]
    fn test_snapshot_reports_unlimited_for_vip() {
        let snapshot = snapshot_from(&row(3, 2, 1), true);
        assert_eq!(snapshot.total, -1);
        assert_eq!(snapshot.remaining, -1);
        assert_eq!(snapshot.used, 2);
        assert!(snapshot.is_vip);
    }
}
