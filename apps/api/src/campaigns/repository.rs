//! SQL for campaigns and their calendar posts. All reads and writes are
//! scoped to the owning user.

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::campaigns::calendar::to_scheduled_time;
use crate::models::campaign::{CampaignRow, ScheduledPostRow};
use crate::planner::{CampaignPlan, PostRecord};

pub const CAMPAIGN_LIST_LIMIT: i64 = 100;
pub const POST_LIST_LIMIT: i64 = 200;
pub const DEFAULT_PLATFORM: &str = "linkedin";

/// Parameters for persisting a freshly planned campaign.
pub struct NewCampaign<'a> {
    pub user_id: &'a str,
    pub campaign_name: &'a str,
    pub theme: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub plan: &'a CampaignPlan,
}

/// Merged field values for `PUT /api/campaigns/:id`.
#[derive(Debug, Clone)]
pub struct CampaignChanges {
    pub campaign_name: String,
    pub theme: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: String,
}

/// Column values written for a plan. Shared by insert and replace so a
/// replaced campaign carries the dates its schedule was computed from.
#[derive(Debug, Clone, PartialEq)]
struct PlanColumns<'a> {
    start_date: NaiveDate,
    end_date: NaiveDate,
    post_count: i32,
    schedule: serde_json::Value,
    posts: serde_json::Value,
    generation_method: &'static str,
    provider: Option<&'a str>,
    raw_output: Option<&'a str>,
    generation_error: Option<&'a str>,
}

impl<'a> PlanColumns<'a> {
    fn from_new(new: &NewCampaign<'a>) -> Self {
        let plan = new.plan;
        Self {
            start_date: new.start_date,
            end_date: new.end_date,
            post_count: plan.posts.len() as i32,
            schedule: serde_json::json!(plan.schedule),
            posts: serde_json::json!(plan.posts),
            generation_method: plan.generation_method.as_str(),
            provider: plan.provider.as_deref(),
            raw_output: plan.raw_output.as_deref(),
            generation_error: plan.error.as_deref(),
        }
    }
}

/// Inserts the campaign row and returns its id.
pub async fn insert_campaign(
    conn: &mut PgConnection,
    new: &NewCampaign<'_>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let cols = PlanColumns::from_new(new);

    sqlx::query(
        r#"
        INSERT INTO campaigns
            (id, user_id, campaign_name, theme, start_date, end_date, status, post_count,
             schedule, posts, generation_method, provider, raw_output, generation_error)
        VALUES ($1, $2, $3, $4, $5, $6, 'draft', $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(id)
    .bind(new.user_id)
    .bind(new.campaign_name)
    .bind(new.theme)
    .bind(cols.start_date)
    .bind(cols.end_date)
    .bind(cols.post_count)
    .bind(cols.schedule)
    .bind(cols.posts)
    .bind(cols.generation_method)
    .bind(cols.provider)
    .bind(cols.raw_output)
    .bind(cols.generation_error)
    .execute(&mut *conn)
    .await?;

    info!("Inserted campaign {id} for user {}", new.user_id);
    Ok(id)
}

/// Overwrites the plan and date range of an existing campaign (dedup window
/// hit). Returns false when the campaign no longer exists.
pub async fn replace_campaign_plan(
    conn: &mut PgConnection,
    campaign_id: Uuid,
    new: &NewCampaign<'_>,
) -> Result<bool, sqlx::Error> {
    let cols = PlanColumns::from_new(new);

    let result = sqlx::query(
        r#"
        UPDATE campaigns
        SET start_date = $3, end_date = $4, post_count = $5, schedule = $6, posts = $7,
            generation_method = $8, provider = $9, raw_output = $10, generation_error = $11,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(campaign_id)
    .bind(new.user_id)
    .bind(cols.start_date)
    .bind(cols.end_date)
    .bind(cols.post_count)
    .bind(cols.schedule)
    .bind(cols.posts)
    .bind(cols.generation_method)
    .bind(cols.provider)
    .bind(cols.raw_output)
    .bind(cols.generation_error)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Inserts one calendar row per post. Returns the number inserted.
pub async fn insert_scheduled_posts(
    conn: &mut PgConnection,
    user_id: &str,
    campaign_id: Uuid,
    theme: &str,
    start_date: NaiveDate,
    posts: &[PostRecord],
) -> Result<u64, sqlx::Error> {
    let tags = vec![theme.to_string(), "campaign".to_string()];
    let mut inserted = 0;

    for (index, post) in posts.iter().enumerate() {
        let scheduled_time = to_scheduled_time(&post.schedule, start_date, index);
        sqlx::query(
            r#"
            INSERT INTO scheduled_posts
                (id, user_id, campaign_id, post_index, title, content, theme, schedule,
                 scheduled_time, status, platform, post_type, call_to_action, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'scheduled', $10, $11, $12, $13)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(campaign_id)
        .bind(index as i32)
        .bind(&post.title)
        .bind(&post.description)
        .bind(theme)
        .bind(&post.schedule)
        .bind(scheduled_time)
        .bind(DEFAULT_PLATFORM)
        .bind(&post.content_type)
        .bind(&post.call_to_action)
        .bind(&tags)
        .execute(&mut *conn)
        .await?;
        inserted += 1;
    }

    info!("Scheduled {inserted} posts for campaign {campaign_id}");
    Ok(inserted)
}

pub async fn delete_campaign_posts(
    conn: &mut PgConnection,
    user_id: &str,
    campaign_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM scheduled_posts WHERE campaign_id = $1 AND user_id = $2")
        .bind(campaign_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn set_snapshot_key(
    pool: &PgPool,
    campaign_id: Uuid,
    snapshot_key: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE campaigns SET snapshot_key = $2 WHERE id = $1")
        .bind(campaign_id)
        .bind(snapshot_key)
        .execute(pool)
        .await?;
    Ok(())
}

/// The caller's campaigns, newest first.
pub async fn list_campaigns(pool: &PgPool, user_id: &str) -> Result<Vec<CampaignRow>, sqlx::Error> {
    sqlx::query_as::<_, CampaignRow>(
        "SELECT * FROM campaigns WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(CAMPAIGN_LIST_LIMIT)
    .fetch_all(pool)
    .await
}

pub async fn get_campaign(
    pool: &PgPool,
    user_id: &str,
    campaign_id: Uuid,
) -> Result<Option<CampaignRow>, sqlx::Error> {
    sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE id = $1 AND user_id = $2")
        .bind(campaign_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn update_campaign(
    pool: &PgPool,
    user_id: &str,
    campaign_id: Uuid,
    changes: &CampaignChanges,
) -> Result<Option<CampaignRow>, sqlx::Error> {
    sqlx::query_as::<_, CampaignRow>(
        r#"
        UPDATE campaigns
        SET campaign_name = $3, theme = $4, start_date = $5, end_date = $6, status = $7,
            updated_at = $8
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(campaign_id)
    .bind(user_id)
    .bind(&changes.campaign_name)
    .bind(&changes.theme)
    .bind(changes.start_date)
    .bind(changes.end_date)
    .bind(&changes.status)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await
}

/// Deletes a campaign and its posts. Returns the number of posts removed, or
/// `None` when the campaign does not exist for this user.
pub async fn delete_campaign(
    pool: &PgPool,
    user_id: &str,
    campaign_id: Uuid,
) -> Result<Option<u64>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let deleted_posts = delete_campaign_posts(&mut tx, user_id, campaign_id).await?;
    let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND user_id = $2")
        .bind(campaign_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;
    info!("Deleted campaign {campaign_id} with {deleted_posts} posts");
    Ok(Some(deleted_posts))
}

pub async fn list_campaign_posts(
    pool: &PgPool,
    user_id: &str,
    campaign_id: Uuid,
) -> Result<Vec<ScheduledPostRow>, sqlx::Error> {
    sqlx::query_as::<_, ScheduledPostRow>(
        "SELECT * FROM scheduled_posts WHERE campaign_id = $1 AND user_id = $2 ORDER BY post_index ASC",
    )
    .bind(campaign_id)
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// The caller's calendar posts across all campaigns, newest first.
pub async fn list_user_posts(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<ScheduledPostRow>, sqlx::Error> {
    sqlx::query_as::<_, ScheduledPostRow>(
        "SELECT * FROM scheduled_posts WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(POST_LIST_LIMIT)
    .fetch_all(pool)
    .await
}
