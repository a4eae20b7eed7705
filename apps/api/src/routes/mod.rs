pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::campaigns::handlers as campaigns;
use crate::chat::handlers as chat;
use crate::image_gen::handlers as images;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Campaign planning and persistence
        .route("/api/plan-campaign/", post(campaigns::handle_plan_campaign))
        .route("/api/campaigns/", get(campaigns::handle_list_campaigns))
        .route(
            "/api/campaigns/:id",
            get(campaigns::handle_get_campaign)
                .put(campaigns::handle_update_campaign)
                .delete(campaigns::handle_delete_campaign),
        )
        .route(
            "/api/campaigns/:id/posts",
            get(campaigns::handle_campaign_posts),
        )
        .route("/api/posts/", get(campaigns::handle_user_posts))
        // Chat assistant
        .route("/api/chatbot/", post(chat::handle_chat))
        .route(
            "/api/chatbot/quick-suggestions/",
            post(chat::handle_quick_suggestions),
        )
        .route(
            "/api/chatbot/capabilities/",
            get(chat::handle_capabilities),
        )
        // Image generation
        .route("/api/generate-image/", post(images::handle_generate_image))
        .with_state(state)
}
