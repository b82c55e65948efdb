//! The polish orchestrator: quota check -> rewrite -> version creation as one
//! user-visible action. Any failure before the final transaction leaves all
//! persisted state unchanged.

use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::achievements::notify_polished;
use crate::dreams::store::load_owned_dream;
use crate::errors::AppError;
use crate::models::dream::{DreamVersionRow, KIND_POLISHED};
use crate::polish::quota::{
    consume, fetch_vip_status, get_or_create_quota, snapshot_from, today_utc, QuotaSnapshot,
};
use crate::polish::rewrite::RewriteEngine;

pub const MAX_INSTRUCTION_CHARS: usize = 500;

#[derive(Debug, Default)]
pub struct PolishOptions {
    pub instruction: Option<String>,
    pub based_on_version_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PolishDreamOutcome {
    pub version_id: Uuid,
    pub content: String,
    pub version_number: i32,
    /// Post-consumption snapshot; `None` for VIP users.
    pub quota: Option<QuotaSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct PolishTextOutcome {
    pub content: String,
    pub quota: Option<QuotaSnapshot>,
}

fn validate_instruction(instruction: Option<&str>) -> Result<(), AppError> {
    if let Some(text) = instruction {
        if text.chars().count() > MAX_INSTRUCTION_CHARS {
            return Err(AppError::Validation(format!(
                "Polish instruction cannot exceed {MAX_INSTRUCTION_CHARS} characters"
            )));
        }
    }
    Ok(())
}

/// Polishes a dream: rewrites its base content and appends the result as a
/// new current `polished` version.
///
/// Quota consumption and version creation commit in one transaction; the
/// conditional consume makes two concurrent polishes at `remaining = 1`
/// resolve to one success and one `QuotaExhausted`.
pub async fn polish_dream(
    pool: &PgPool,
    rewriter: &dyn RewriteEngine,
    daily_quota: i32,
    user_id: Uuid,
    dream_id: Uuid,
    opts: PolishOptions,
) -> Result<PolishDreamOutcome, AppError> {
    validate_instruction(opts.instruction.as_deref())?;

    let dream = load_owned_dream(pool, dream_id, user_id).await?;

    let vip = fetch_vip_status(pool, user_id).await?;
    let vip_active = vip.is_active(Utc::now());

    if !vip_active {
        let quota = get_or_create_quota(pool, user_id, daily_quota).await?;
        if quota.remaining <= 0 {
            return Err(AppError::QuotaExhausted);
        }
    }

    // Resolve the text the rewrite starts from.
    let versions = sqlx::query_as::<_, DreamVersionRow>(
        "SELECT * FROM dream_versions WHERE dream_id = $1 ORDER BY version_number DESC",
    )
    .bind(dream_id)
    .fetch_all(pool)
    .await?;

    let (base_content, base_version_id) = match opts.based_on_version_id {
        Some(id) => {
            let base = versions
                .iter()
                .find(|v| v.id == id)
                .ok_or_else(|| AppError::NotFound("Version not found".to_string()))?;
            (base.content.clone(), Some(base.id))
        }
        None => match dream
            .current_version_id
            .and_then(|id| versions.iter().find(|v| v.id == id))
        {
            Some(current) => (current.content.clone(), Some(current.id)),
            // Dreams predating version tracking: fall back to the
            // denormalized content, with no lineage to point at.
            None => (dream.content.clone(), None),
        },
    };

    let rewritten = rewriter
        .rewrite(&base_content, opts.instruction.as_deref())
        .await?;

    let mut tx = pool.begin().await?;

    let consumed = if vip_active {
        None
    } else {
        match consume(&mut *tx, user_id, today_utc()).await? {
            Some(row) => Some(row),
            // The pre-check passed but a concurrent polish got here first.
            None => return Err(AppError::QuotaExhausted),
        }
    };

    let next: i32 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(version_number), 0) + 1 FROM dream_versions WHERE dream_id = $1",
    )
    .bind(dream_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE dream_versions SET is_current = FALSE WHERE dream_id = $1 AND is_current")
        .bind(dream_id)
        .execute(&mut *tx)
        .await?;

    let version = sqlx::query_as::<_, DreamVersionRow>(
        "INSERT INTO dream_versions \
         (dream_id, user_id, kind, content, polished_from, polish_prompt, ai_model, \
          tokens_used, version_number, is_current) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE) RETURNING *",
    )
    .bind(dream_id)
    .bind(user_id)
    .bind(KIND_POLISHED)
    .bind(&rewritten.text)
    .bind(base_version_id)
    .bind(opts.instruction.as_deref())
    .bind(&rewritten.model)
    .bind(rewritten.tokens_used)
    .bind(next)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        "UPDATE dreams SET content = $2, current_version_id = $3, updated_at = now() WHERE id = $1",
    )
    .bind(dream_id)
    .bind(&rewritten.text)
    .bind(version.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("dream {dream_id}: polished to v{next} for user {user_id}");

    notify_polished(pool.clone(), user_id);

    Ok(PolishDreamOutcome {
        version_id: version.id,
        content: version.content,
        version_number: version.version_number,
        quota: consumed.map(|row| snapshot_from(&row, false)),
    })
}

/// Free-standing text polish: same quota gating and rewrite, no dream or
/// version rows touched.
pub async fn polish_text(
    pool: &PgPool,
    rewriter: &dyn RewriteEngine,
    daily_quota: i32,
    user_id: Uuid,
    content: &str,
    instruction: Option<&str>,
) -> Result<PolishTextOutcome, AppError> {
    validate_instruction(instruction)?;

    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::Validation("Content cannot be empty".to_string()));
    }

    let vip = fetch_vip_status(pool, user_id).await?;
    let vip_active = vip.is_active(Utc::now());

    if !vip_active {
        let quota = get_or_create_quota(pool, user_id, daily_quota).await?;
        if quota.remaining <= 0 {
            return Err(AppError::QuotaExhausted);
        }
    }

    let rewritten = rewriter.rewrite(content, instruction).await?;

    let quota = if vip_active {
        None
    } else {
        match consume(pool, user_id, today_utc()).await? {
            Some(row) => Some(snapshot_from(&row, false)),
            None => return Err(AppError::QuotaExhausted),
        }
    };

    Ok(PolishTextOutcome {
        content: rewritten.text,
        quota,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_within_bound_accepted() {
        let instruction = "a".repeat(MAX_INSTRUCTION_CHARS);
        assert!(validate_instruction(Some(&instruction)).is_ok());
        assert!(validate_instruction(None).is_ok());
    }

    #[test]
    fn test_instruction_over_bound_rejected() {
        let instruction = "a".repeat(MAX_INSTRUCTION_CHARS + 1);
        assert!(validate_instruction(Some(&instruction)).is_err());
    }
}
