use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::dream::{
    DreamRow, DreamVersionRow, KIND_EDITED, KIND_ORIGINAL, STATUS_DELETED,
};

pub const MIN_CONTENT_CHARS: usize = 25;
pub const MAX_CONTENT_CHARS: usize = 1000;

/// Validates and trims dream text. Bounds are in characters, not bytes.
pub fn validate_content(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    let chars = trimmed.chars().count();
    if chars < MIN_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Dream content needs at least {MIN_CONTENT_CHARS} characters"
        )));
    }
    if chars > MAX_CONTENT_CHARS {
        return Err(AppError::Validation(format!(
            "Dream content cannot exceed {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(trimmed)
}

/// Loads a dream and verifies the requester owns it.
/// Soft-deleted dreams are reported as missing.
pub async fn load_owned_dream(
    pool: &PgPool,
    dream_id: Uuid,
    requester: Uuid,
) -> Result<DreamRow, AppError> {
    let dream = sqlx::query_as::<_, DreamRow>("SELECT * FROM dreams WHERE id = $1")
        .bind(dream_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Dream not found".to_string()))?;

    if dream.status == STATUS_DELETED {
        return Err(AppError::NotFound("Dream not found".to_string()));
    }
    if dream.user_id != requester {
        return Err(AppError::Forbidden("You do not own this dream".to_string()));
    }
    Ok(dream)
}

/// Creates a dream together with its `original` version (number 1, current)
/// in one transaction.
pub async fn create_dream(
    pool: &PgPool,
    user_id: Uuid,
    content: &str,
    is_public: bool,
) -> Result<DreamRow, AppError> {
    let content = validate_content(content)?;
    let word_count = content.chars().count() as i32;

    let mut tx = pool.begin().await?;

    let dream = sqlx::query_as::<_, DreamRow>(
        "INSERT INTO dreams (user_id, content, original_content, word_count, is_public) \
         VALUES ($1, $2, $2, $3, $4) RETURNING *",
    )
    .bind(user_id)
    .bind(content)
    .bind(word_count)
    .bind(is_public)
    .fetch_one(&mut *tx)
    .await?;

    let version = sqlx::query_as::<_, DreamVersionRow>(
        "INSERT INTO dream_versions (dream_id, user_id, kind, content, version_number, is_current) \
         VALUES ($1, $2, $3, $4, 1, TRUE) RETURNING *",
    )
    .bind(dream.id)
    .bind(user_id)
    .bind(KIND_ORIGINAL)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;

    let dream = sqlx::query_as::<_, DreamRow>(
        "UPDATE dreams SET current_version_id = $2 WHERE id = $1 RETURNING *",
    )
    .bind(dream.id)
    .bind(version.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("dream {} created for user {user_id} (v1 original)", dream.id);
    Ok(dream)
}

#[derive(Debug, Serialize)]
pub struct DreamPage {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub dreams: Vec<DreamRow>,
}

/// Newest-first page over the user's non-deleted dreams.
pub async fn list_dreams(
    pool: &PgPool,
    user_id: Uuid,
    page: i64,
    page_size: i64,
) -> Result<DreamPage, AppError> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, 100);
    let offset = (page - 1) * page_size;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM dreams WHERE user_id = $1 AND status <> $2")
            .bind(user_id)
            .bind(STATUS_DELETED)
            .fetch_one(pool)
            .await?;

    let dreams = sqlx::query_as::<_, DreamRow>(
        "SELECT * FROM dreams WHERE user_id = $1 AND status <> $2 \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(user_id)
    .bind(STATUS_DELETED)
    .bind(page_size)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(DreamPage {
        total,
        page,
        page_size,
        dreams,
    })
}

/// Rewrites a dream's text by appending an `edited` version and making it
/// current. The clear-then-set flip and the denormalized content refresh run
/// in one transaction.
pub async fn update_dream(
    pool: &PgPool,
    dream_id: Uuid,
    requester: Uuid,
    content: &str,
) -> Result<(DreamRow, DreamVersionRow), AppError> {
    let content = validate_content(content)?;
    load_owned_dream(pool, dream_id, requester).await?;

    let word_count = content.chars().count() as i32;
    let mut tx = pool.begin().await?;

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
        "INSERT INTO dream_versions (dream_id, user_id, kind, content, version_number, is_current) \
         VALUES ($1, $2, $3, $4, $5, TRUE) RETURNING *",
    )
    .bind(dream_id)
    .bind(requester)
    .bind(KIND_EDITED)
    .bind(content)
    .bind(next)
    .fetch_one(&mut *tx)
    .await?;

    let dream = sqlx::query_as::<_, DreamRow>(
        "UPDATE dreams SET content = $2, word_count = $3, current_version_id = $4, \
         updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(dream_id)
    .bind(content)
    .bind(word_count)
    .bind(version.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("dream {dream_id}: edited to v{next} by user {requester}");
    Ok((dream, version))
}

/// Soft delete. Version history is kept.
pub async fn delete_dream(pool: &PgPool, dream_id: Uuid, requester: Uuid) -> Result<(), AppError> {
    load_owned_dream(pool, dream_id, requester).await?;

    sqlx::query("UPDATE dreams SET status = $2, updated_at = now() WHERE id = $1")
        .bind(dream_id)
        .bind(STATUS_DELETED)
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_too_short_rejected() {
        assert!(validate_content("short dream").is_err());
    }

    #[test]
    fn test_content_at_lower_bound_accepted() {
        let content = "a".repeat(MIN_CONTENT_CHARS);
        assert_eq!(validate_content(&content).unwrap(), content);
    }

    #[test]
    fn test_content_over_upper_bound_rejected() {
        let content = "a".repeat(MAX_CONTENT_CHARS + 1);
        assert!(validate_content(&content).is_err());
    }

    #[test]
    fn test_content_is_trimmed_before_counting() {
        let padded = format!("   {}   ", "a".repeat(MIN_CONTENT_CHARS));
        assert_eq!(
            validate_content(&padded).unwrap().chars().count(),
            MIN_CONTENT_CHARS
        );
    }

    #[test]
    fn test_multibyte_content_counted_in_chars() {
        // 25 CJK characters are far more than 25 bytes but exactly at the bound.
        let content = "梦".repeat(MIN_CONTENT_CHARS);
        assert!(validate_content(&content).is_ok());
    }
}
