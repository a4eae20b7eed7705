//! Generation Orchestrator: schedule → generate → parse → repair.
//!
//! Every path ends in a full, schedule-stamped list of `count` posts. Provider
//! and parse failures are absorbed here and surface only as the
//! `generation_method` tag and the optional `error` text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::{Generated, LlmError, ProviderChain};
use crate::planner::fallback::{synthesize, synthesize_post};
use crate::planner::parser::{parse_posts, ParsedPost};
use crate::planner::post::PostRecord;
use crate::planner::prompts::{build_plan_prompt, planner_system};
use crate::planner::schedule::{day_slot, degenerate_schedule, generate_schedule};

/// How the posts of a plan were produced. Persisted and returned verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    /// Generated text parsed into at least one post.
    #[serde(rename = "crewai_enhanced")]
    Generated,
    /// No provider configured; synthesized without trying.
    EnhancedFallback,
    /// Generation or parsing failed; synthesized instead.
    FallbackAfterError,
    /// The schedule itself could not be computed.
    ErrorFallback,
}

impl GenerationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMethod::Generated => "crewai_enhanced",
            GenerationMethod::EnhancedFallback => "enhanced_fallback",
            GenerationMethod::FallbackAfterError => "fallback_after_error",
            GenerationMethod::ErrorFallback => "error_fallback",
        }
    }
}

/// Validated planner input.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub campaign_name: String,
    pub theme: String,
    pub count: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignPlan {
    pub schedule: Vec<String>,
    pub posts: Vec<PostRecord>,
    pub generation_method: GenerationMethod,
    pub provider: Option<String>,
    pub raw_output: Option<String>,
    pub error: Option<String>,
}

/// Result of the GENERATING stage.
#[derive(Debug)]
enum GenerationOutcome {
    Generated(Generated),
    Skipped,
    Failed(LlmError),
}

#[derive(Clone)]
pub struct ContentPlanner {
    providers: ProviderChain,
}

impl ContentPlanner {
    pub fn new(providers: ProviderChain) -> Self {
        Self { providers }
    }

    /// Runs the full pipeline. Never fails.
    pub async fn plan(&self, req: &PlanRequest) -> CampaignPlan {
        info!(
            "Planning campaign '{}' ({} posts, {}..{})",
            req.campaign_name, req.count, req.start_date, req.end_date
        );

        // SCHEDULED
        let schedule = match generate_schedule(req.start_date, req.end_date, req.count) {
            Ok(schedule) => schedule,
            Err(e) => {
                warn!("Schedule generation failed, using day labels: {e}");
                let schedule = degenerate_schedule(req.count);
                let posts = synthesize(&req.campaign_name, &req.theme, req.count, &schedule);
                return CampaignPlan {
                    schedule,
                    posts,
                    generation_method: GenerationMethod::ErrorFallback,
                    provider: None,
                    raw_output: None,
                    error: Some(e.to_string()),
                };
            }
        };

        // GENERATING
        let generated = match self.generate(req, &schedule).await {
            GenerationOutcome::Generated(generated) => generated,
            GenerationOutcome::Skipped => {
                info!("No text-generation provider configured, synthesizing posts");
                return self.fallback(req, schedule, GenerationMethod::EnhancedFallback, None, None);
            }
            GenerationOutcome::Failed(e) => {
                warn!("Generation failed for '{}': {e}", req.campaign_name);
                return self.fallback(
                    req,
                    schedule,
                    GenerationMethod::FallbackAfterError,
                    None,
                    Some(e.to_string()),
                );
            }
        };

        // PARSING
        let Some(parsed) = parse_posts(&generated.text) else {
            warn!(
                "Output from '{}' contained no usable posts, synthesizing instead",
                generated.provider
            );
            let mut plan = self.fallback(
                req,
                schedule,
                GenerationMethod::FallbackAfterError,
                Some(generated.text),
                Some("Generated text contained no parsable posts".to_string()),
            );
            plan.provider = Some(generated.provider);
            return plan;
        };

        // REPAIRING
        let posts = repair(parsed, req, &schedule);
        info!(
            "Campaign '{}' planned with {} posts from '{}'",
            req.campaign_name,
            posts.len(),
            generated.provider
        );

        CampaignPlan {
            schedule,
            posts,
            generation_method: GenerationMethod::Generated,
            provider: Some(generated.provider),
            raw_output: Some(generated.text),
            error: None,
        }
    }

    async fn generate(&self, req: &PlanRequest, schedule: &[String]) -> GenerationOutcome {
        if self.providers.is_empty() {
            return GenerationOutcome::Skipped;
        }

        let prompt = build_plan_prompt(&req.campaign_name, &req.theme, req.count, schedule);
        match self.providers.generate(&prompt, &planner_system()).await {
            Ok(generated) => GenerationOutcome::Generated(generated),
            Err(e) => GenerationOutcome::Failed(e),
        }
    }

    fn fallback(
        &self,
        req: &PlanRequest,
        schedule: Vec<String>,
        method: GenerationMethod,
        raw_output: Option<String>,
        error: Option<String>,
    ) -> CampaignPlan {
        let posts = synthesize(&req.campaign_name, &req.theme, req.count, &schedule);
        CampaignPlan {
            schedule,
            posts,
            generation_method: method,
            provider: None,
            raw_output,
            error,
        }
    }
}

/// Brings parsed posts to exactly `count` complete records: truncate, renumber,
/// stamp the computed slot, fill defaults, then pad with synthesized filler.
fn repair(parsed: Vec<ParsedPost>, req: &PlanRequest, schedule: &[String]) -> Vec<PostRecord> {
    let slot = |i: usize| schedule.get(i).cloned().unwrap_or_else(|| day_slot(i));

    let mut posts: Vec<PostRecord> = parsed
        .into_iter()
        .take(req.count)
        .enumerate()
        .map(|(i, mut post)| {
            post.post_number = i as u32 + 1;
            post.into_record(&req.theme, slot(i))
        })
        .collect();

    if posts.len() < req.count {
        warn!(
            "Parsed {} of {} posts, padding with synthesized content",
            posts.len(),
            req.count
        );
    }
    for i in posts.len()..req.count {
        let filler_slot = slot(i);
        posts.push(synthesize_post(
            &req.campaign_name,
            &req.theme,
            i,
            Some(filler_slot.as_str()),
        ));
    }

    debug_assert!(posts.iter().all(PostRecord::is_complete));
    posts
}
