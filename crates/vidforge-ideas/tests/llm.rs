//! Chat client behavior against a mocked OpenAI-compatible endpoint.

use vidforge_ideas::{ChatClient, IdeaError};
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ChatClient {
    ChatClient::with_base_url("sk-test", "llama-test", 5, &format!("{}/", server.uri()))
        .expect("client construction should not fail")
}

#[tokio::test]
async fn complete_sends_model_and_returns_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama-test",
            "max_tokens": 64,
            "messages": [ { "role": "user", "content": "hello" } ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "content": "  hi there \n" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server).complete("hello", 64).await.unwrap();
    assert_eq!(reply, "hi there");
}

#[tokio::test]
async fn unauthorized_is_a_status_error_and_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .with_retries(3, 0)
        .complete("hello", 64)
        .await
        .unwrap_err();
    assert!(
        matches!(err, IdeaError::Status { status, .. } if status.as_u16() == 401),
        "{err:?}"
    );
}

#[tokio::test]
async fn rate_limit_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "content": "ok" } } ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server)
        .with_retries(2, 0)
        .complete("hello", 64)
        .await
        .unwrap();
    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn empty_choices_are_an_llm_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let err = client(&server).complete("hello", 64).await.unwrap_err();
    assert!(matches!(err, IdeaError::Llm(_)), "{err:?}");
}

#[tokio::test]
async fn non_json_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client(&server).complete("hello", 64).await.unwrap_err();
    assert!(matches!(err, IdeaError::Deserialize { .. }), "{err:?}");
}

#[test]
fn debug_output_hides_the_api_key() {
    let client = ChatClient::new("sk-secret", "m", 5).unwrap();
    let debug = format!("{client:?}");
    assert!(!debug.contains("sk-secret"));
    assert!(debug.contains("redacted"));
}
