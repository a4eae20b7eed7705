use chrono::NaiveDate;
use serde::Deserialize;

use crate::campaigns::repository::CampaignChanges;
use crate::errors::AppError;
use crate::models::campaign::CampaignRow;
use crate::planner::PlanRequest;

pub const MIN_POST_COUNT: i64 = 1;
pub const MAX_POST_COUNT: i64 = 50;
pub const CAMPAIGN_STATUSES: [&str; 5] = ["draft", "active", "paused", "completed", "archived"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Clients send the count either as a number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PostCount {
    Number(i64),
    Text(String),
}

impl PostCount {
    fn value(&self) -> Option<i64> {
        match self {
            PostCount::Number(n) => Some(*n),
            PostCount::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Body of `POST /api/plan-campaign/`. Every field is optional on the wire so
/// a missing one is reported as a validation error rather than a decode error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCampaignRequest {
    pub name: Option<String>,
    pub theme: Option<String>,
    pub count: Option<PostCount>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PUT /api/campaigns/:id`. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    #[serde(alias = "name", alias = "campaign_name")]
    pub campaign_name: Option<String>,
    pub theme: Option<String>,
    #[serde(alias = "start_date")]
    pub start_date: Option<String>,
    #[serde(alias = "end_date")]
    pub end_date: Option<String>,
    pub status: Option<String>,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, AppError> {
    value
        .as_deref()
        .ok_or_else(|| AppError::Validation(format!("Missing required field: {field}")))
}

fn non_blank(value: &str, field: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        AppError::Validation(format!(
            "Invalid date format for {field}: expected YYYY-MM-DD, got '{value}'"
        ))
    })
}

fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if start > end {
        return Err(AppError::Validation(format!(
            "Invalid date range: start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

/// Validates a plan request into planner input. Runs before any generation.
pub fn validate_plan_request(req: &PlanCampaignRequest) -> Result<PlanRequest, AppError> {
    let campaign_name = non_blank(required(&req.name, "name")?, "name")?;
    let theme = non_blank(required(&req.theme, "theme")?, "theme")?;

    let count = req
        .count
        .as_ref()
        .ok_or_else(|| AppError::Validation("Missing required field: count".to_string()))?
        .value()
        .filter(|n| (MIN_POST_COUNT..=MAX_POST_COUNT).contains(n))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "Invalid post count. Must be a number between {MIN_POST_COUNT} and {MAX_POST_COUNT}."
            ))
        })?;

    let start_date = parse_date(required(&req.start_date, "startDate")?, "startDate")?;
    let end_date = parse_date(required(&req.end_date, "endDate")?, "endDate")?;
    check_range(start_date, end_date)?;

    Ok(PlanRequest {
        campaign_name,
        theme,
        count: count as usize,
        start_date,
        end_date,
    })
}

/// Applies an update onto the stored campaign and validates the result.
pub fn merge_update(
    existing: &CampaignRow,
    req: &UpdateCampaignRequest,
) -> Result<CampaignChanges, AppError> {
    let campaign_name = match &req.campaign_name {
        Some(name) => non_blank(name, "name")?,
        None => existing.campaign_name.clone(),
    };
    let theme = match &req.theme {
        Some(theme) => non_blank(theme, "theme")?,
        None => existing.theme.clone(),
    };
    let start_date = match &req.start_date {
        Some(d) => parse_date(d, "startDate")?,
        None => existing.start_date,
    };
    let end_date = match &req.end_date {
        Some(d) => parse_date(d, "endDate")?,
        None => existing.end_date,
    };
    check_range(start_date, end_date)?;

    let status = match &req.status {
        Some(status) => {
            let status = status.trim().to_lowercase();
            if !CAMPAIGN_STATUSES.contains(&status.as_str()) {
                return Err(AppError::Validation(format!(
                    "Invalid status '{status}'. Expected one of: {}",
                    CAMPAIGN_STATUSES.join(", ")
                )));
            }
            status
        }
        None => existing.status.clone(),
    };

    Ok(CampaignChanges {
        campaign_name,
        theme,
        start_date,
        end_date,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn plan_request(body: serde_json::Value) -> PlanCampaignRequest {
        serde_json::from_value(body).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "name": "EcoCampaign",
            "theme": "sustainability",
            "count": 3,
            "startDate": "2025-05-01",
            "endDate": "2025-05-10"
        })
    }

    fn existing() -> CampaignRow {
        CampaignRow {
            id: Uuid::nil(),
            user_id: "uid42".to_string(),
            campaign_name: "EcoCampaign".to_string(),
            theme: "sustainability".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            status: "draft".to_string(),
            post_count: 3,
            schedule: json!([]),
            posts: json!([]),
            generation_method: "enhanced_fallback".to_string(),
            provider: None,
            raw_output: None,
            generation_error: None,
            snapshot_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assert_validation(result: Result<impl std::fmt::Debug, AppError>, needle: &str) {
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains(needle), "message: {msg}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_request() {
        let req = validate_plan_request(&plan_request(valid_body())).unwrap();
        assert_eq!(req.campaign_name, "EcoCampaign");
        assert_eq!(req.count, 3);
        assert_eq!(req.start_date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
    }

    #[test]
    fn test_count_accepts_numeric_string() {
        let mut body = valid_body();
        body["count"] = json!(" 12 ");
        assert_eq!(validate_plan_request(&plan_request(body)).unwrap().count, 12);
    }

    #[test]
    fn test_count_bounds() {
        for bad in [json!(0), json!(51), json!(-3), json!("many")] {
            let mut body = valid_body();
            body["count"] = bad;
            assert_validation(validate_plan_request(&plan_request(body)), "between 1 and 50");
        }
        for good in [1, 50] {
            let mut body = valid_body();
            body["count"] = json!(good);
            assert!(validate_plan_request(&plan_request(body)).is_ok());
        }
    }

    #[test]
    fn test_missing_fields_are_named() {
        for field in ["name", "theme", "count", "startDate", "endDate"] {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            assert_validation(
                validate_plan_request(&plan_request(body)),
                &format!("Missing required field: {field}"),
            );
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut body = valid_body();
        body["name"] = json!("   ");
        assert_validation(validate_plan_request(&plan_request(body)), "name cannot be empty");
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let mut body = valid_body();
        body["startDate"] = json!("05/01/2025");
        assert_validation(validate_plan_request(&plan_request(body)), "expected YYYY-MM-DD");
    }

    #[test]
    fn test_inverted_range_rejected_but_same_day_allowed() {
        let mut body = valid_body();
        body["startDate"] = json!("2025-05-11");
        assert_validation(validate_plan_request(&plan_request(body)), "Invalid date range");

        let mut body = valid_body();
        body["endDate"] = json!("2025-05-01");
        assert!(validate_plan_request(&plan_request(body)).is_ok());
    }

    #[test]
    fn test_merge_update_keeps_absent_fields() {
        let changes = merge_update(
            &existing(),
            &UpdateCampaignRequest {
                status: Some("Active".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(changes.status, "active");
        assert_eq!(changes.campaign_name, "EcoCampaign");
        assert_eq!(changes.end_date, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
    }

    #[test]
    fn test_merge_update_accepts_name_alias() {
        let req: UpdateCampaignRequest =
            serde_json::from_value(json!({"name": "Renamed", "endDate": "2025-06-01"})).unwrap();
        let changes = merge_update(&existing(), &req).unwrap();
        assert_eq!(changes.campaign_name, "Renamed");
        assert_eq!(changes.end_date, NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }

    #[test]
    fn test_merge_update_rejects_unknown_status_and_bad_range() {
        let req = UpdateCampaignRequest {
            status: Some("launched".to_string()),
            ..Default::default()
        };
        assert_validation(merge_update(&existing(), &req), "Invalid status");

        let req = UpdateCampaignRequest {
            end_date: Some("2025-04-01".to_string()),
            ..Default::default()
        };
        assert_validation(merge_update(&existing(), &req), "Invalid date range");
    }
}
