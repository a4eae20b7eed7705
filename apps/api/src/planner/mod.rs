//! Campaign content planning: schedule slots, LLM text parsing, and the
//! deterministic fallback that guarantees a complete plan.

pub mod fallback;
pub mod orchestrator;
pub mod parser;
pub mod post;
pub mod prompts;
pub mod schedule;

pub use orchestrator::{CampaignPlan, ContentPlanner, GenerationMethod, PlanRequest};
pub use post::PostRecord;
