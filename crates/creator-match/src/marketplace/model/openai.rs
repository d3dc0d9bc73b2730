use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ModelError, StructuredModel, StructuredRequest};
use crate::config::ModelConfig;

/// Longest provider error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// OpenAI-compatible chat completions client using strict `json_schema` response formats.
pub struct OpenAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, ModelError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ModelError::NotConfigured("OPENAI_API_KEY is not set"))?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl StructuredModel for OpenAiClient {
    async fn generate_object(&self, request: StructuredRequest<'_>) -> Result<Value, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.agent.instructions,
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: request.schema.name,
                    strict: true,
                    schema: &request.schema.schema,
                },
            },
        };

        debug!(
            model = %self.model,
            agent = request.agent.name,
            thread_id = request.thread_id,
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|index| text.is_char_boundary(*index))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            warn!(status = status.as_u16(), agent = request.agent.name, "model provider rejected request");
            return Err(ModelError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|err| ModelError::Malformed(format!("unreadable completion: {err}")))?;

        let reply = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ModelError::Malformed("completion had no choices".to_string()))?;

        if let Some(refusal) = reply.refusal {
            return Err(ModelError::Malformed(format!("model refused: {refusal}")));
        }

        let content = reply
            .content
            .ok_or_else(|| ModelError::Malformed("completion had no content".to_string()))?;

        serde_json::from_str(&content)
            .map_err(|err| ModelError::Malformed(format!("content is not JSON: {err}")))
    }
}
