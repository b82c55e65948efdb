use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const KIND_ORIGINAL: &str = "original";
pub const KIND_EDITED: &str = "edited";
pub const KIND_POLISHED: &str = "polished";

pub const STATUS_DELETED: &str = "deleted";

/// A journaled dream. `content` is a denormalized copy of the current
/// version's text and must only change together with `current_version_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DreamRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub original_content: String,
    pub word_count: i32,
    pub status: String,
    pub is_public: bool,
    pub current_version_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An immutable snapshot of a dream's text. Exactly one version per dream
/// carries `is_current` at any time (partial unique index in the schema).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DreamVersionRow {
    pub id: Uuid,
    pub dream_id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub content: String,
    pub polished_from: Option<Uuid>,
    pub polish_prompt: Option<String>,
    pub ai_model: Option<String>,
    pub tokens_used: Option<i32>,
    pub version_number: i32,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

/// One row per (user, UTC day). `remaining` is kept denormalized
/// (= total - used) for fast reads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PolishQuotaRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub total: i32,
    pub used: i32,
    pub remaining: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
