use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::dreams::store::load_owned_dream;
use crate::errors::AppError;
use crate::models::dream::{DreamVersionRow, KIND_ORIGINAL, KIND_POLISHED};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VersionStats {
    pub total: usize,
    pub original: usize,
    pub polished: usize,
}

pub fn compute_stats(versions: &[DreamVersionRow]) -> VersionStats {
    VersionStats {
        total: versions.len(),
        original: versions.iter().filter(|v| v.kind == KIND_ORIGINAL).count(),
        polished: versions.iter().filter(|v| v.kind == KIND_POLISHED).count(),
    }
}

#[derive(Debug, Serialize)]
pub struct VersionListing {
    pub dream_id: Uuid,
    pub current_version_id: Option<Uuid>,
    pub stats: VersionStats,
    pub versions: Vec<DreamVersionRow>,
}

/// All versions of a dream, ordered by version_number ascending.
pub async fn list_versions(
    pool: &PgPool,
    dream_id: Uuid,
    requester: Uuid,
) -> Result<VersionListing, AppError> {
    let dream = load_owned_dream(pool, dream_id, requester).await?;

    let versions = sqlx::query_as::<_, DreamVersionRow>(
        "SELECT * FROM dream_versions WHERE dream_id = $1 ORDER BY version_number ASC",
    )
    .bind(dream_id)
    .fetch_all(pool)
    .await?;

    let stats = compute_stats(&versions);
    Ok(VersionListing {
        dream_id,
        current_version_id: dream.current_version_id,
        stats,
        versions,
    })
}

/// One version, ownership resolved through the version -> dream -> owner chain.
pub async fn version_detail(
    pool: &PgPool,
    version_id: Uuid,
    requester: Uuid,
) -> Result<DreamVersionRow, AppError> {
    let version = sqlx::query_as::<_, DreamVersionRow>("SELECT * FROM dream_versions WHERE id = $1")
        .bind(version_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

    let owner: Uuid = sqlx::query_scalar("SELECT user_id FROM dreams WHERE id = $1")
        .bind(version.dream_id)
        .fetch_one(pool)
        .await?;
    if owner != requester {
        return Err(AppError::Forbidden(
            "You do not own this version".to_string(),
        ));
    }
    Ok(version)
}

#[derive(Debug, Serialize)]
pub struct SwitchOutcome {
    pub message: String,
    pub version_id: Uuid,
    pub version_number: i32,
    pub kind: String,
    pub content: String,
}

/// Makes `version_id` the dream's current version.
///
/// Switching an already-current version is an idempotent success. Otherwise
/// the clear-then-set flip and the denormalized content refresh commit as one
/// transaction, so no reader ever observes zero or two current versions.
pub async fn switch_current(
    pool: &PgPool,
    dream_id: Uuid,
    requester: Uuid,
    version_id: Uuid,
) -> Result<SwitchOutcome, AppError> {
    load_owned_dream(pool, dream_id, requester).await?;

    let target = sqlx::query_as::<_, DreamVersionRow>(
        "SELECT * FROM dream_versions WHERE id = $1 AND dream_id = $2",
    )
    .bind(version_id)
    .bind(dream_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;

    if target.is_current {
        return Ok(SwitchOutcome {
            message: "This version is already current".to_string(),
            version_id: target.id,
            version_number: target.version_number,
            kind: target.kind,
            content: target.content,
        });
    }

    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE dream_versions SET is_current = FALSE WHERE dream_id = $1 AND is_current")
        .bind(dream_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE dream_versions SET is_current = TRUE WHERE id = $1")
        .bind(version_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE dreams SET content = $2, current_version_id = $3, updated_at = now() WHERE id = $1",
    )
    .bind(dream_id)
    .bind(&target.content)
    .bind(version_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "dream {dream_id}: current version switched to v{} ({version_id})",
        target.version_number
    );

    Ok(SwitchOutcome {
        message: "Version switched".to_string(),
        version_id: target.id,
        version_number: target.version_number,
        kind: target.kind,
        content: target.content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::dream::KIND_EDITED;
    use chrono::Utc;

    fn version(kind: &str, number: i32, is_current: bool) -> DreamVersionRow {
        DreamVersionRow {
            id: Uuid::new_v4(),
            dream_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: kind.to_string(),
            content: "I dreamed of flying over mountains".to_string(),
            polished_from: None,
            polish_prompt: None,
            ai_model: None,
            tokens_used: None,
            version_number: number,
            is_current,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_stats_count_by_kind() {
        let versions = vec![
            version(KIND_ORIGINAL, 1, false),
            version(KIND_POLISHED, 2, false),
            version(KIND_EDITED, 3, false),
            version(KIND_POLISHED, 4, true),
        ];
        let stats = compute_stats(&versions);
        assert_eq!(
            stats,
            VersionStats {
                total: 4,
                original: 1,
                polished: 2,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        assert_eq!(
            compute_stats(&[]),
            VersionStats {
                total: 0,
                original: 0,
                polished: 0,
            }
        );
    }
}
