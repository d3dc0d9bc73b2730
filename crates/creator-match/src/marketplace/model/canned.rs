use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ModelError, StructuredModel, StructuredRequest};
use crate::marketplace::campaigns::CAMPAIGN_EXTRACTION_SCHEMA;
use crate::marketplace::profiles::PROFILE_SUGGESTIONS_SCHEMA;
use crate::marketplace::scoring::FIT_SCORE_SCHEMA;

#[derive(Debug, Clone)]
enum Reply {
    Object(Value),
    Failure(String),
}

/// One request observed by a [`CannedModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub agent: &'static str,
    pub schema: &'static str,
    pub prompt: String,
    pub thread_id: Option<String>,
}

/// Model double that replies with a fixed object per schema name.
///
/// Backs the offline mode of the API service when no provider key is configured.
#[derive(Debug, Default)]
pub struct CannedModel {
    replies: HashMap<&'static str, Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl CannedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plausible replies for every schema the marketplace uses.
    pub fn offline() -> Self {
        Self::new()
            .with_response(
                FIT_SCORE_SCHEMA,
                json!({
                    "score": 72,
                    "reasoning": "Offline scoring: the creator profile and submission were not reviewed by a language model, so this placeholder assessment reflects a neutral, reasonable fit.",
                    "strengths": ["Complete creator profile", "Submission provided"],
                    "concerns": ["Scored without a configured model provider"],
                    "recommendation": "consider"
                }),
            )
            .with_response(
                CAMPAIGN_EXTRACTION_SCHEMA,
                json!({
                    "title": "Creator Partnership Campaign",
                    "description": "Offline extraction placeholder. Configure a model provider to turn pasted briefs into a polished campaign description that explains the product, the goal, and why creators should take part.",
                    "criteria": "- Content niche aligned with the brand\n- Active audience on at least one platform",
                    "budget": 1000,
                    "deadline": "2030-01-01",
                    "deliverables": null,
                    "suggestedImprovements": []
                }),
            )
            .with_response(
                PROFILE_SUGGESTIONS_SCHEMA,
                json!({
                    "bioOptions": [
                        { "style": "professional", "text": "Creator producing consistent, audience-focused content for brand partners." },
                        { "style": "casual", "text": "Making content I love for a community that shows up every week." },
                        { "style": "impact_focused", "text": "Using my platform to spotlight ideas that help my audience grow." }
                    ],
                    "suggestedCategories": ["lifestyle", "education"],
                    "audienceDescription": "Engaged followers interested in practical, authentic content.",
                    "uniqueValueProp": "A trusted voice with a highly engaged, loyal community."
                }),
            )
    }

    pub fn with_response(mut self, schema: &'static str, object: Value) -> Self {
        self.replies.insert(schema, Reply::Object(object));
        self
    }

    pub fn with_failure(mut self, schema: &'static str, message: impl Into<String>) -> Self {
        self.replies.insert(schema, Reply::Failure(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StructuredModel for CannedModel {
    async fn generate_object(&self, request: StructuredRequest<'_>) -> Result<Value, ModelError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                agent: request.agent.name,
                schema: request.schema.name,
                prompt: request.prompt.to_string(),
                thread_id: request.thread_id.map(str::to_string),
            });
        }

        match self.replies.get(request.schema.name) {
            Some(Reply::Object(value)) => Ok(value.clone()),
            Some(Reply::Failure(message)) => Err(ModelError::Provider {
                status: 503,
                body: message.clone(),
            }),
            None => Err(ModelError::Malformed(format!(
                "no canned reply for schema '{}'",
                request.schema.name
            ))),
        }
    }
}
