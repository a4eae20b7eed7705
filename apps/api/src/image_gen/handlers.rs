use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::auth::MaybeAuthUser;
use crate::errors::AppError;
use crate::image_gen::{HfImageClient, ImageGenError};

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// POST /api/generate-image/
pub async fn handle_generate_image(
    State(images): State<Option<HfImageClient>>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Json(req): Json<GenerateImageRequest>,
) -> Result<Response, AppError> {
    let prompt = req.prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Prompt is required".to_string()));
    }
    let client = images.ok_or(ImageGenError::NotConfigured)?;

    info!(
        "Image requested by {} ({} chars)",
        user_id.as_deref().unwrap_or("anonymous"),
        prompt.chars().count()
    );
    let image = client.generate(prompt, req.model.as_deref()).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png"),
            (
                header::CONTENT_DISPOSITION,
                "inline; filename=generated-image.png",
            ),
        ],
        image.bytes,
    )
        .into_response())
}
