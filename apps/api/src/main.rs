mod auth;
mod campaigns;
mod chat;
mod config;
mod db;
mod errors;
mod image_gen;
mod llm_client;
mod models;
mod planner;
mod routes;
mod state;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{FirebaseVerifier, SharedVerifier, UnconfiguredVerifier};
use crate::chat::ChatAssistant;
use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::image_gen::HfImageClient;
use crate::llm_client::{GeminiClient, GroqClient, ProviderChain, TextGenerator};
use crate::planner::ContentPlanner;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Campaign API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Text-generation providers, shared by the planner and the chat assistant
    let providers = build_provider_chain(&config);
    if providers.is_empty() {
        warn!("No text-generation provider configured; plans will use the synthesized fallback");
    } else {
        info!("Text-generation providers: {:?}", providers.provider_names());
    }

    let identity: SharedVerifier = match &config.firebase_api_key {
        Some(key) => Arc::new(FirebaseVerifier::new(key.clone())),
        None => {
            warn!("FIREBASE_API_KEY not set; authenticated endpoints will answer 503");
            Arc::new(UnconfiguredVerifier)
        }
    };

    let images = config.hf_image_api_key.clone().map(HfImageClient::new);
    if images.is_none() {
        warn!("HF_IMAGE_API_KEY not set; image generation disabled");
    }

    // Build app state
    let state = AppState {
        db,
        redis,
        s3,
        config: config.clone(),
        planner: ContentPlanner::new(providers.clone()),
        chat: ChatAssistant::new(providers),
        identity,
        images,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Gemini first, then Groq. Providers without a usable key are skipped.
fn build_provider_chain(config: &Config) -> ProviderChain {
    let mut providers: Vec<Arc<dyn TextGenerator>> = Vec::new();
    if let Some(key) = &config.gemini_api_key {
        providers.push(Arc::new(GeminiClient::new(key.clone())));
    }
    match GroqClient::from_key(config.groq_api_key.as_deref()) {
        Some(groq) => providers.push(Arc::new(groq)),
        None if config.groq_api_key.is_some() => {
            warn!("GROQ_API_KEY does not look like a Groq key; provider skipped")
        }
        None => {}
    }
    ProviderChain::new(
        providers,
        Duration::from_secs(config.generation_timeout_secs),
    )
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "campaign-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
