//! Vendor wire formats against a mock HTTP server.

use content_orchestrator::config::ProviderConfig;
use content_orchestrator::providers::{HttpProvider, ProviderError, ProviderGateway, ProviderKind};
use content_orchestrator::resilience::{classify_error, ErrorKind};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(kind: ProviderKind, server: &MockServer) -> HttpProvider {
    let mut config = ProviderConfig::for_kind(kind);
    config.base_url = Some(server.uri());
    HttpProvider::with_api_key(&config, Some("sk-test".to_string())).unwrap()
}

#[tokio::test]
async fn openai_parses_content_and_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({ "model": "gpt-5-mini" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "  hello from openai \n" } }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 20 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = provider(ProviderKind::OpenAi, &server)
        .generate("hi", None)
        .await
        .unwrap();

    assert_eq!(resp.content, "hello from openai");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 20);
    assert_eq!(resp.provider_name, "openai");
    assert_eq!(resp.model_name, "gpt-5-mini");
}

#[tokio::test]
async fn xai_speaks_the_chat_completions_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "grok-3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "grok says hi" } }]
        })))
        .mount(&server)
        .await;

    let resp = provider(ProviderKind::Xai, &server)
        .generate("hi", Some("grok-3"))
        .await
        .unwrap();

    assert_eq!(resp.content, "grok says hi");
    assert_eq!(resp.model_name, "grok-3");
    assert_eq!(resp.input_tokens, 0);
}

#[tokio::test]
async fn anthropic_sends_version_header_and_joins_text_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "max_tokens": 1024 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "part one, " },
                { "type": "tool_use", "id": "t1" },
                { "type": "text", "text": "part two" }
            ],
            "usage": { "input_tokens": 7, "output_tokens": 9 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = provider(ProviderKind::Anthropic, &server)
        .generate("hi", None)
        .await
        .unwrap();

    assert_eq!(resp.content, "part one, part two");
    assert_eq!(resp.input_tokens, 7);
    assert_eq!(resp.output_tokens, 9);
    assert_eq!(resp.model_name, "claude-haiku-4-5");
}

#[tokio::test]
async fn gemini_sends_key_in_header_not_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-3-flash-preview:generateContent"))
        .and(header("x-goog-api-key", "sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "gemini " }, { "text": "reply" }] } }],
            "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 4 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = provider(ProviderKind::Gemini, &server)
        .generate("hi", None)
        .await
        .unwrap();

    assert_eq!(resp.content, "gemini reply");
    assert_eq!(resp.input_tokens, 3);
    assert_eq!(resp.output_tokens, 4);

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.query().is_none()));
}

#[tokio::test]
async fn transport_errors_never_carry_the_key() {
    for kind in ProviderKind::ALL {
        let mut config = ProviderConfig::for_kind(kind);
        config.base_url = Some("http://127.0.0.1:9".to_string());
        let provider =
            HttpProvider::with_api_key(&config, Some("SECRET-429-KEY".to_string())).unwrap();

        let err = provider.generate("hi", None).await.unwrap_err();
        let text = err.to_string();

        assert!(matches!(err, ProviderError::Transport { .. }), "{kind}: {text}");
        assert!(!text.contains("SECRET"), "{kind}: {text}");
        assert!(!text.contains("127.0.0.1"), "{kind}: {text}");
        assert_eq!(classify_error(&err).kind, ErrorKind::NetworkError, "{kind}: {text}");
    }
}

#[tokio::test]
async fn rate_limit_status_is_classified_for_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached for requests" }
        })))
        .mount(&server)
        .await;

    let err = provider(ProviderKind::OpenAi, &server)
        .generate("hi", None)
        .await
        .unwrap_err();

    match &err {
        ProviderError::Status { status, message, .. } => {
            assert_eq!(*status, 429);
            assert_eq!(message, "Rate limit reached for requests");
        }
        other => panic!("unexpected error: {other}"),
    }

    let classification = classify_error(&err);
    assert_eq!(classification.kind, ErrorKind::RateLimit);
    assert!(classification.should_retry);
}

#[tokio::test]
async fn unauthorized_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let err = provider(ProviderKind::Anthropic, &server)
        .generate("hi", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    let classification = classify_error(&err);
    assert_eq!(classification.kind, ErrorKind::InvalidCredential);
    assert!(!classification.should_retry);
}

#[tokio::test]
async fn malformed_body_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = provider(ProviderKind::OpenAi, &server)
        .generate("hi", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidResponse { .. }));
}
