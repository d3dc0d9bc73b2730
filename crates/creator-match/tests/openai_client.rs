//! Integration tests for the chat-completions model client.
//!
//! Each test stands up a `wiremock` server so no real provider traffic is made.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use creator_match::config::ModelConfig;
use creator_match::marketplace::model::{generate, ModelError, OpenAiClient};
use creator_match::marketplace::scoring::{FitScoreResult, Recommendation, FIT_SCORING_AGENT};

fn config(base_url: &str) -> ModelConfig {
    ModelConfig {
        api_key: Some("sk-test".to_string()),
        base_url: base_url.to_string(),
        model: "gpt-4o-mini".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content, "refusal": null },
            "finish_reason": "stop"
        }]
    })
}

fn fit_score_json(score: f64) -> String {
    json!({
        "score": score,
        "reasoning": "The creator publishes weekly fitness tutorials whose tone and audience match the campaign brief, with a clear record of brand work.",
        "strengths": ["Niche alignment"],
        "concerns": [],
        "recommendation": "recommend"
    })
    .to_string()
}

#[tokio::test]
async fn sends_strict_json_schema_request_and_parses_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "fit_score", "strict": true }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&fit_score_json(77.0))))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&format!("{}/v1", server.uri()))).expect("client");
    let result: FitScoreResult = generate(&client, &FIT_SCORING_AGENT, "score this", Some("app-1"))
        .await
        .expect("fit score");

    assert_eq!(result.score, 77.0);
    assert_eq!(result.recommendation, Recommendation::Recommend);
}

#[tokio::test]
async fn includes_agent_instructions_as_system_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "system", "content": FIT_SCORING_AGENT.instructions },
                { "role": "user", "content": "score this" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&fit_score_json(55.0))))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&format!("{}/", server.uri()))).expect("client");
    let result: FitScoreResult = generate(&client, &FIT_SCORING_AGENT, "score this", None)
        .await
        .expect("fit score");
    assert_eq!(result.score, 55.0);
}

#[tokio::test]
async fn provider_errors_keep_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limit exceeded"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri())).expect("client");
    let err = generate::<FitScoreResult>(&client, &FIT_SCORING_AGENT, "score this", None)
        .await
        .expect_err("rate limited");

    match err {
        ModelError::Provider { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limit exceeded");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_content_and_refusals_are_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("I think it's a 7/10")))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri())).expect("client");
    let err = generate::<FitScoreResult>(&client, &FIT_SCORING_AGENT, "score this", None)
        .await
        .expect_err("not json");
    assert!(matches!(err, ModelError::Malformed(_)), "got {err:?}");

    let refusing = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." }
            }]
        })))
        .mount(&refusing)
        .await;

    let client = OpenAiClient::new(&config(&refusing.uri())).expect("client");
    let err = generate::<FitScoreResult>(&client, &FIT_SCORING_AGENT, "score this", None)
        .await
        .expect_err("refused");
    match err {
        ModelError::Malformed(message) => assert!(message.contains("I can't help with that.")),
        other => panic!("expected malformed error, got {other:?}"),
    }
}

#[tokio::test]
async fn schema_violations_are_rejected_after_parsing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(&fit_score_json(-3.0))))
        .mount(&server)
        .await;

    let client = OpenAiClient::new(&config(&server.uri())).expect("client");
    let err = generate::<FitScoreResult>(&client, &FIT_SCORING_AGENT, "score this", None)
        .await
        .expect_err("negative score");
    match err {
        ModelError::Schema { schema, violation } => {
            assert_eq!(schema, "fit_score");
            assert_eq!(violation.field, "score");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn missing_api_key_is_not_configured() {
    let mut missing = config("http://localhost");
    missing.api_key = None;

    assert!(matches!(
        OpenAiClient::new(&missing),
        Err(ModelError::NotConfigured(_))
    ));
}
