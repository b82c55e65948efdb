//! Fire-and-forget achievement notifications. The polish flow must never
//! fail because a milestone check did.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::dream::KIND_POLISHED;

/// Polish-count milestones and their achievement codes.
const POLISH_MILESTONES: &[(i64, &str)] = &[
    (1, "first_polish"),
    (10, "polish_adept"),
    (50, "polish_master"),
];

/// Notifies the achievement subsystem that a polish happened. Runs detached;
/// failures are logged, never propagated, never retried synchronously.
pub fn notify_polished(pool: PgPool, user_id: Uuid) {
    tokio::spawn(async move {
        if let Err(e) = unlock_polish_milestones(&pool, user_id).await {
            warn!("achievement check for user {user_id} failed: {e}");
        }
    });
}

async fn unlock_polish_milestones(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    let polish_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM dream_versions WHERE user_id = $1 AND kind = $2",
    )
    .bind(user_id)
    .bind(KIND_POLISHED)
    .fetch_one(pool)
    .await?;

    for &(threshold, code) in POLISH_MILESTONES {
        if polish_count < threshold {
            continue;
        }
        let result = sqlx::query(
            "INSERT INTO user_achievements (user_id, code) VALUES ($1, $2) \
             ON CONFLICT (user_id, code) DO NOTHING",
        )
        .bind(user_id)
        .bind(code)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!("user {user_id} unlocked achievement {code}");
        }
    }
    Ok(())
}
