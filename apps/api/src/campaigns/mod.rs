//! Campaign persistence and the HTTP surface around the planner.

pub mod calendar;
pub mod dedup;
pub mod handlers;
pub mod repository;
pub mod snapshot;
pub mod validation;
