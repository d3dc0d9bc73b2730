//! Creator submissions: intake through the submission gate, owner review, and ranking.

pub mod gate;
pub mod ranking;
mod service;

pub use gate::{SubmissionGate, SubmissionPayload};
pub use ranking::{compare_for_review, rank_for_review};
pub use service::{ApplicantView, ApplicationService, ApplicationWithCampaign};
