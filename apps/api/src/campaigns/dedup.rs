//! Short-lived Redis marker that turns a rapid repeat of the same plan request
//! into an update of the campaign created moments earlier.
//!
//! Redis is advisory here: every failure is logged and treated as a miss.

use redis::Client as RedisClient;
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEDUP_WINDOW_SECS: u64 = 300;

/// Key for a `(user, name, theme)` triple. Name and theme are trimmed and
/// lowercased so trivial edits still hit the window.
pub fn dedup_key(user_id: &str, campaign_name: &str, theme: &str) -> String {
    format!(
        "campaign:dedup:{}:{}:{}",
        user_id,
        normalize(campaign_name),
        normalize(theme)
    )
}

fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Campaign id recorded for `key` within the window, if any.
pub async fn recent_campaign(redis: &RedisClient, key: &str) -> Option<Uuid> {
    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Redis unavailable for dedup lookup: {e}");
            return None;
        }
    };

    let value: Option<String> = match redis::cmd("GET")
        .arg(key)
        .query_async::<_, Option<String>>(&mut conn)
        .await
    {
        Ok(value) => value,
        Err(e) => {
            warn!("Dedup lookup failed for {key}: {e}");
            return None;
        }
    };

    let id = value.and_then(|v| Uuid::parse_str(&v).ok());
    if let Some(id) = id {
        debug!("Dedup window hit for {key}: campaign {id}");
    }
    id
}

/// Records `campaign_id` under `key` for the dedup window.
pub async fn remember_campaign(redis: &RedisClient, key: &str, campaign_id: Uuid) {
    let mut conn = match redis.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!("Redis unavailable, dedup marker not stored: {e}");
            return;
        }
    };

    let result = redis::cmd("SET")
        .arg(key)
        .arg(campaign_id.to_string())
        .arg("EX")
        .arg(DEDUP_WINDOW_SECS)
        .query_async::<_, ()>(&mut conn)
        .await;

    if let Err(e) = result {
        warn!("Failed to store dedup marker {key}: {e}");
    }
}
