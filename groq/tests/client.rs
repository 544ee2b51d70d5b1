//! HTTP-level tests for the Groq client against a local mock server.

use groq::{Error, FinishReason, Groq, Message, Request};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> Groq {
    Groq::new("test-key").with_base_url(format!("{}/openai/v1", server.uri()))
}

#[tokio::test]
async fn test_complete_sends_openai_shaped_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "llama3-70b-8192",
            "max_tokens": 550,
            "messages": [{"role": "system", "content": "Say hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "model": "llama3-70b-8192",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .complete(Request::new(vec![Message::system("Say hello")]).with_max_tokens(550))
        .await
        .expect("completion should succeed");

    assert_eq!(response.text(), "Hello there");
    assert_eq!(response.id, "chatcmpl-1");
    assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.prompt_tokens, 12);
    assert_eq!(response.usage.completion_tokens, 3);
}

#[tokio::test]
async fn test_request_model_overrides_client_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "llama3-8b-8192"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-2",
            "model": "llama3-8b-8192",
            "choices": [{"message": {"content": "ok"}, "finish_reason": "length"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .complete(Request::new(vec![Message::user("hi")]).with_model("llama3-8b-8192"))
        .await
        .unwrap();

    assert_eq!(response.text(), "ok");
    assert_eq!(response.choices[0].finish_reason, Some(FinishReason::Length));
}

#[tokio::test]
async fn test_api_error_carries_provider_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .complete(Request::new(vec![Message::user("hi")]))
        .await
        .unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API Key");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .complete(Request::new(vec![Message::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn test_null_content_yields_empty_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-3",
            "model": "llama3-70b-8192",
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let response = client
        .complete(Request::new(vec![Message::user("hi")]))
        .await
        .unwrap();

    assert_eq!(response.text(), "");
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let client = Groq::new("test-key").with_base_url("http://127.0.0.1:9");
    let err = client
        .complete(Request::new(vec![Message::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
}
