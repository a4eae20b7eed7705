use std::future::Future;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::campaigns::dedup::{dedup_key, recent_campaign, remember_campaign};
use crate::campaigns::repository::{
    self, delete_campaign_posts, insert_campaign, insert_scheduled_posts, replace_campaign_plan,
    NewCampaign,
};
use crate::campaigns::snapshot::{render_campaign_to_md, snapshot_key, upload_snapshot};
use crate::campaigns::validation::{
    merge_update, validate_plan_request, PlanCampaignRequest, UpdateCampaignRequest,
};
use crate::errors::AppError;
use crate::models::campaign::{CampaignRow, ScheduledPostRow};
use crate::planner::{CampaignPlan, GenerationMethod, PostRecord};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PlanContent {
    pub parsed_posts: Vec<PostRecord>,
    pub dates: Vec<String>,
    #[serde(rename = "postCount")]
    pub post_count: usize,
    pub generation_method: GenerationMethod,
}

#[derive(Debug, Serialize)]
pub struct PlanCampaignResponse {
    pub campaign_id: Uuid,
    pub content: PlanContent,
    pub message: String,
    pub success: bool,
}

impl PlanCampaignResponse {
    fn new(campaign_id: Uuid, campaign_name: &str, plan: CampaignPlan) -> Self {
        let post_count = plan.posts.len();
        Self {
            campaign_id,
            message: format!(
                "Campaign '{campaign_name}' created successfully with {post_count} posts"
            ),
            content: PlanContent {
                parsed_posts: plan.posts,
                dates: plan.schedule,
                post_count,
                generation_method: plan.generation_method,
            },
            success: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignRow>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<ScheduledPostRow>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteCampaignResponse {
    pub success: bool,
    pub message: String,
    pub deleted_posts: u64,
}

fn campaign_not_found(campaign_id: Uuid) -> AppError {
    AppError::NotFound(format!("Campaign {campaign_id} not found"))
}

/// Uploads the snapshot, then records its key on the campaign. The campaign is
/// already committed, so failures are logged and never fail the request.
/// Returns true when both steps succeeded.
async fn store_snapshot<U, R, RF, E>(campaign_id: Uuid, upload: U, record: R) -> bool
where
    U: Future<Output = anyhow::Result<()>>,
    R: FnOnce() -> RF,
    RF: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    if let Err(e) = upload.await {
        warn!("Snapshot upload failed for campaign {campaign_id}: {e}");
        return false;
    }
    if let Err(e) = record().await {
        warn!("Failed to record snapshot key for campaign {campaign_id}: {e}");
        return false;
    }
    true
}

/// POST /api/plan-campaign/
pub async fn handle_plan_campaign(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<PlanCampaignRequest>,
) -> Result<Json<PlanCampaignResponse>, AppError> {
    let request = validate_plan_request(&req)?;
    info!(
        "Planning campaign '{}' ({} posts) for {user_id}",
        request.campaign_name, request.count
    );

    let plan = state.planner.plan(&request).await;
    let new = NewCampaign {
        user_id: &user_id,
        campaign_name: &request.campaign_name,
        theme: &request.theme,
        start_date: request.start_date,
        end_date: request.end_date,
        plan: &plan,
    };

    let key = dedup_key(&user_id, &request.campaign_name, &request.theme);
    let recent = recent_campaign(&state.redis, &key).await;

    let mut tx = state.db.begin().await?;
    let mut campaign_id = None;
    if let Some(existing) = recent {
        if replace_campaign_plan(&mut tx, existing, &new).await? {
            let removed = delete_campaign_posts(&mut tx, &user_id, existing).await?;
            info!("Repeat request replaced {removed} posts of campaign {existing}");
            campaign_id = Some(existing);
        }
    }
    let campaign_id = match campaign_id {
        Some(id) => id,
        None => insert_campaign(&mut tx, &new).await?,
    };
    insert_scheduled_posts(
        &mut tx,
        &user_id,
        campaign_id,
        &request.theme,
        request.start_date,
        &plan.posts,
    )
    .await?;
    tx.commit().await?;

    remember_campaign(&state.redis, &key, campaign_id).await;

    let s3_key = snapshot_key(&user_id, campaign_id);
    let md = render_campaign_to_md(campaign_id, &new);
    store_snapshot(
        campaign_id,
        upload_snapshot(&state.s3, &state.config.s3_bucket, &s3_key, md),
        || repository::set_snapshot_key(&state.db, campaign_id, &s3_key),
    )
    .await;

    info!(
        "Campaign {campaign_id} stored with {} posts ({})",
        plan.posts.len(),
        plan.generation_method.as_str()
    );
    Ok(Json(PlanCampaignResponse::new(
        campaign_id,
        &request.campaign_name,
        plan,
    )))
}

/// GET /api/campaigns/
pub async fn handle_list_campaigns(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<CampaignListResponse>, AppError> {
    let campaigns = repository::list_campaigns(&state.db, &user_id).await?;
    Ok(Json(CampaignListResponse {
        count: campaigns.len(),
        campaigns,
    }))
}

/// GET /api/campaigns/:id
pub async fn handle_get_campaign(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<CampaignRow>, AppError> {
    let campaign = repository::get_campaign(&state.db, &user_id, campaign_id)
        .await?
        .ok_or_else(|| campaign_not_found(campaign_id))?;
    Ok(Json(campaign))
}

/// PUT /api/campaigns/:id
pub async fn handle_update_campaign(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(campaign_id): Path<Uuid>,
    Json(req): Json<UpdateCampaignRequest>,
) -> Result<Json<CampaignRow>, AppError> {
    let existing = repository::get_campaign(&state.db, &user_id, campaign_id)
        .await?
        .ok_or_else(|| campaign_not_found(campaign_id))?;
    let changes = merge_update(&existing, &req)?;

    let updated = repository::update_campaign(&state.db, &user_id, campaign_id, &changes)
        .await?
        .ok_or_else(|| campaign_not_found(campaign_id))?;
    info!("Updated campaign {campaign_id} (status: {})", updated.status);
    Ok(Json(updated))
}

/// DELETE /api/campaigns/:id
pub async fn handle_delete_campaign(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<DeleteCampaignResponse>, AppError> {
    let deleted_posts = repository::delete_campaign(&state.db, &user_id, campaign_id)
        .await?
        .ok_or_else(|| campaign_not_found(campaign_id))?;
    Ok(Json(DeleteCampaignResponse {
        success: true,
        message: format!("Campaign deleted along with {deleted_posts} scheduled posts"),
        deleted_posts,
    }))
}

/// GET /api/campaigns/:id/posts
pub async fn handle_campaign_posts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<PostListResponse>, AppError> {
    repository::get_campaign(&state.db, &user_id, campaign_id)
        .await?
        .ok_or_else(|| campaign_not_found(campaign_id))?;
    let posts = repository::list_campaign_posts(&state.db, &user_id, campaign_id).await?;
    Ok(Json(PostListResponse {
        count: posts.len(),
        posts,
    }))
}

/// GET /api/posts/
pub async fn handle_user_posts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PostListResponse>, AppError> {
    let posts = repository::list_user_posts(&state.db, &user_id).await?;
    Ok(Json(PostListResponse {
        count: posts.len(),
        posts,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::fallback::synthesize;

    fn plan(method: GenerationMethod) -> CampaignPlan {
        let schedule = vec!["May 01 at 10:00 AM".to_string(), "May 05 at 2:00 PM".to_string()];
        CampaignPlan {
            posts: synthesize("EcoCampaign", "sustainability", 2, &schedule),
            schedule,
            generation_method: method,
            provider: None,
            raw_output: None,
            error: None,
        }
    }

    #[test]
    fn test_plan_response_shape() {
        let id = Uuid::new_v4();
        let response =
            PlanCampaignResponse::new(id, "EcoCampaign", plan(GenerationMethod::EnhancedFallback));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["campaign_id"], id.to_string());
        assert_eq!(json["success"], true);
        assert_eq!(
            json["message"],
            "Campaign 'EcoCampaign' created successfully with 2 posts"
        );
        assert_eq!(json["content"]["postCount"], 2);
        assert_eq!(json["content"]["generation_method"], "enhanced_fallback");
        assert_eq!(json["content"]["dates"][1], "May 05 at 2:00 PM");
        assert_eq!(
            json["content"]["parsed_posts"][0]["schedule"],
            "May 01 at 10:00 AM"
        );
    }

    #[tokio::test]
    async fn test_snapshot_key_failure_does_not_fail_request() {
        let stored = store_snapshot(Uuid::nil(), async { Ok(()) }, || async {
            Err::<(), _>(sqlx::Error::PoolTimedOut)
        })
        .await;
        assert!(!stored);
    }

    #[tokio::test]
    async fn test_failed_upload_skips_recording_key() {
        let recorded = std::cell::Cell::new(false);
        let stored = store_snapshot(
            Uuid::nil(),
            async { Err(anyhow::anyhow!("S3 upload failed")) },
            || {
                let recorded = &recorded;
                async move {
                    recorded.set(true);
                    Ok::<(), sqlx::Error>(())
                }
            },
        )
        .await;
        assert!(!stored);
        assert!(!recorded.get());
    }

    #[tokio::test]
    async fn test_snapshot_stored() {
        let stored =
            store_snapshot(Uuid::nil(), async { Ok(()) }, || async { Ok::<(), sqlx::Error>(()) })
                .await;
        assert!(stored);
    }

    #[test]
    fn test_not_found_message_names_campaign() {
        let id = Uuid::nil();
        match campaign_not_found(id) {
            AppError::NotFound(msg) => assert!(msg.contains(&id.to_string())),
            other => panic!("unexpected {other:?}"),
        }
    }
}
