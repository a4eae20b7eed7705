use aws_sdk_s3::Client as S3Client;
use axum::extract::FromRef;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::auth::SharedVerifier;
use crate::chat::ChatAssistant;
use crate::config::Config;
use crate::image_gen::HfImageClient;
use crate::planner::ContentPlanner;

/// Shared application state injected into all route handlers via Axum extractors.
/// Handlers that need only one service take it as a substate through `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: PgPool,
    /// Dedup markers for repeated plan requests.
    pub redis: RedisClient,
    pub s3: S3Client,
    pub config: Config,
    pub planner: ContentPlanner,
    pub chat: ChatAssistant,
    pub identity: SharedVerifier,
    /// `None` when no image API key is configured.
    pub images: Option<HfImageClient>,
}
