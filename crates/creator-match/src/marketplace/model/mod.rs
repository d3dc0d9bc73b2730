//! Boundary to the structured-output language model provider.
//!
//! Model output is untrusted: every typed result is deserialized without coercion and then
//! checked against the documented shape before any caller sees it.

mod canned;
mod openai;

pub use canned::{CannedModel, RecordedCall};
pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// System persona a structured call runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    pub name: &'static str,
    pub instructions: &'static str,
}

/// Named JSON schema sent to the provider alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub schema: Value,
}

#[derive(Debug, Clone, Copy)]
pub struct StructuredRequest<'a> {
    pub agent: &'a AgentProfile,
    pub prompt: &'a str,
    pub schema: &'a ResponseSchema,
    /// Correlates calls that belong to the same record, e.g. the application being scored.
    pub thread_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {problem}")]
pub struct SchemaViolation {
    pub field: String,
    pub problem: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            problem: problem.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model provider is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("model response was malformed: {0}")]
    Malformed(String),
    #[error("model output does not match the {schema} schema: {violation}")]
    Schema {
        schema: &'static str,
        violation: SchemaViolation,
    },
}

/// Opaque, possibly slow, possibly failing structured generation call.
#[async_trait]
pub trait StructuredModel: Send + Sync {
    async fn generate_object(&self, request: StructuredRequest<'_>) -> Result<Value, ModelError>;
}

/// A typed model result with its wire schema and post-parse checks.
pub trait StructuredOutput: DeserializeOwned {
    fn schema() -> ResponseSchema;
    fn validate(&self) -> Result<(), SchemaViolation>;
}

/// Run a structured call and return the validated, typed output.
pub async fn generate<T>(
    model: &dyn StructuredModel,
    agent: &AgentProfile,
    prompt: &str,
    thread_id: Option<&str>,
) -> Result<T, ModelError>
where
    T: StructuredOutput,
{
    let schema = T::schema();
    debug!(agent = agent.name, schema = schema.name, thread_id, "requesting structured output");

    let value = model
        .generate_object(StructuredRequest {
            agent,
            prompt,
            schema: &schema,
            thread_id,
        })
        .await?;

    let parsed: T = serde_json::from_value(value).map_err(|err| ModelError::Schema {
        schema: schema.name,
        violation: SchemaViolation::new("$", err.to_string()),
    })?;
    parsed.validate().map_err(|violation| ModelError::Schema {
        schema: schema.name,
        violation,
    })?;

    Ok(parsed)
}

/// Character-count bounds on a text field; `max` of `None` means unbounded.
pub(crate) fn check_text(
    field: &str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<(), SchemaViolation> {
    let length = value.chars().count();
    if length < min {
        return Err(SchemaViolation::new(
            field,
            format!("expected at least {min} characters, got {length}"),
        ));
    }
    if let Some(max) = max {
        if length > max {
            return Err(SchemaViolation::new(
                field,
                format!("expected at most {max} characters, got {length}"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn check_items(
    field: &str,
    count: usize,
    min: usize,
    max: usize,
) -> Result<(), SchemaViolation> {
    if count < min || count > max {
        return Err(SchemaViolation::new(
            field,
            format!("expected between {min} and {max} items, got {count}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        label: String,
        weight: f64,
    }

    impl StructuredOutput for Probe {
        fn schema() -> ResponseSchema {
            ResponseSchema {
                name: "probe",
                schema: json!({ "type": "object" }),
            }
        }

        fn validate(&self) -> Result<(), SchemaViolation> {
            check_text("label", &self.label, 3, Some(8))?;
            if self.weight < 0.0 {
                return Err(SchemaViolation::new("weight", "must not be negative"));
            }
            Ok(())
        }
    }

    const AGENT: AgentProfile = AgentProfile {
        name: "Probe",
        instructions: "Return a probe.",
    };

    #[tokio::test]
    async fn rejects_type_mismatches_instead_of_coercing() {
        let model = CannedModel::new().with_response("probe", json!({ "label": "abcd", "weight": "2" }));
        let result = generate::<Probe>(&model, &AGENT, "probe", None).await;
        match result {
            Err(ModelError::Schema { schema, violation }) => {
                assert_eq!(schema, "probe");
                assert_eq!(violation.field, "$");
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn surfaces_validation_failures() {
        let model = CannedModel::new().with_response("probe", json!({ "label": "ab", "weight": 1 }));
        match generate::<Probe>(&model, &AGENT, "probe", None).await {
            Err(ModelError::Schema { violation, .. }) => assert_eq!(violation.field, "label"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn returns_valid_outputs() {
        let model = CannedModel::new().with_response("probe", json!({ "label": "abcd", "weight": 1 }));
        let probe = generate::<Probe>(&model, &AGENT, "probe", Some("thread-1"))
            .await
            .expect("valid probe");
        assert_eq!(probe.label, "abcd");
        assert_eq!(probe.weight, 1.0);
        assert_eq!(model.calls()[0].thread_id.as_deref(), Some("thread-1"));
    }

    #[test]
    fn text_bounds_count_characters_not_bytes() {
        assert!(check_text("bio", "ééé", 3, Some(3)).is_ok());
        assert!(check_text("bio", "éé", 3, None).is_err());
        assert!(check_items("strengths", 0, 1, 5).is_err());
        assert!(check_items("concerns", 0, 0, 5).is_ok());
    }
}
