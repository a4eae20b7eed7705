use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CampaignRow {
    pub id: Uuid,
    pub user_id: String,
    pub campaign_name: String,
    pub theme: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
    pub post_count: i32,
    /// Display slots, one per post.
    pub schedule: Value,
    /// `PostRecord` array as planned.
    pub posts: Value,
    pub generation_method: String,
    pub provider: Option<String>,
    #[serde(skip_serializing)]
    pub raw_output: Option<String>,
    pub generation_error: Option<String>,
    pub snapshot_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduledPostRow {
    pub id: Uuid,
    pub user_id: String,
    pub campaign_id: Uuid,
    pub post_index: i32,
    pub title: String,
    pub content: String,
    pub theme: String,
    pub schedule: String,
    pub scheduled_time: DateTime<Utc>,
    pub status: String,
    pub platform: String,
    pub post_type: String,
    pub call_to_action: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
