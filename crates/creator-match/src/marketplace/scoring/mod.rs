//! Application fit scoring: submit -> schedule -> score -> persist.
//!
//! A submission hands the new application id to a [`ScoringScheduler`]. The
//! [`ScoringWorker`] later loads a snapshot of the application, its campaign, and the
//! creator profile, asks the model for a [`FitScoreResult`], and patches the score onto the
//! application. Failures only ever show up as a score that never arrives; nothing is retried.

mod prompt;
mod result;
mod scheduler;
mod worker;

pub use prompt::{format_budget, render_prompt};
pub use result::{FitScoreResult, Recommendation, FIT_SCORE_SCHEMA};
pub use scheduler::{ScoringQueue, ScoringScheduler};
pub use worker::{ScoringError, ScoringSnapshot, ScoringWorker, FIT_SCORING_AGENT};
