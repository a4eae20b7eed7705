//! Markdown audit snapshot of a planned campaign, stored in S3 next to the
//! database rows.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::campaigns::repository::NewCampaign;

pub fn snapshot_key(user_id: &str, campaign_id: Uuid) -> String {
    format!("campaigns/{user_id}/{campaign_id}.md")
}

/// Renders the plan as a human-readable markdown document.
pub fn render_campaign_to_md(campaign_id: Uuid, campaign: &NewCampaign<'_>) -> String {
    let plan = campaign.plan;
    let mut md = format!("# Campaign Snapshot: {}\n\n", campaign.campaign_name);

    md.push_str(&format!("- **Campaign ID:** {campaign_id}\n"));
    md.push_str(&format!("- **Theme:** {}\n", campaign.theme));
    md.push_str(&format!(
        "- **Dates:** {} to {}\n",
        campaign.start_date, campaign.end_date
    ));
    md.push_str(&format!("- **Posts:** {}\n", plan.posts.len()));
    md.push_str(&format!(
        "- **Generation:** {}\n",
        plan.generation_method.as_str()
    ));
    if let Some(provider) = &plan.provider {
        md.push_str(&format!("- **Provider:** {provider}\n"));
    }
    if let Some(error) = &plan.error {
        md.push_str(&format!("- **Generation error:** {error}\n"));
    }
    md.push('\n');

    for post in &plan.posts {
        md.push_str(&format!("## Post {}: {}\n\n", post.post_number, post.title));
        md.push_str(&format!("- **When:** {}\n", post.schedule));
        md.push_str(&format!("- **Type:** {}\n", post.content_type));
        md.push_str(&format!("- **Call to action:** {}\n", post.call_to_action));
        if let Some(tags) = &post.suggested_hashtags {
            md.push_str(&format!("- **Hashtags:** {tags}\n"));
        }
        md.push_str(&format!("\n{}\n\n", post.description));
    }

    md
}

pub async fn upload_snapshot(
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    s3_key: &str,
    md_content: String,
) -> Result<()> {
    s3.put_object()
        .bucket(s3_bucket)
        .key(s3_key)
        .body(ByteStream::from(md_content.into_bytes()))
        .content_type("text/markdown")
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;

    info!("Uploaded campaign snapshot to s3://{}/{}", s3_bucket, s3_key);
    Ok(())
}
