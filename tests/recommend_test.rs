//! Recommendation client against a mocked chat-completions endpoint.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lavka::catalog::DemoStore;
use lavka::recommend::Recommender;

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn returns_recommendations_known_to_the_catalog() {
    let server = MockServer::start().await;
    // Product 0 exists in the demo catalog; 1_000_000 is invented by the model
    let content = r#"{"products": [
        {"id": 0, "name": "Product 0"},
        {"id": 1000000, "name": "Imaginary thing"}
    ]}"#;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .expect(1)
        .mount(&server)
        .await;

    let store = DemoStore::new();
    let recommender = Recommender::new(server.uri(), "test-key", "test-model", 0.0);

    let recommendations = recommender.recommend(&store, "something nice").await.unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].id, 0);
}

#[tokio::test]
async fn tolerates_code_fenced_answers() {
    let server = MockServer::start().await;
    let content = "```json\n{\"products\": [{\"id\": 1, \"name\": \"Product 1\"}]}\n```";

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(&server)
        .await;

    let store = DemoStore::new();
    let recommender = Recommender::new(server.uri(), "test-key", "test-model", 0.0);

    let recommendations = recommender.recommend(&store, "anything").await.unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0].id, 1);
}

#[tokio::test]
async fn http_errors_surface_as_llm_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = DemoStore::new();
    let recommender = Recommender::new(server.uri(), "test-key", "test-model", 0.0);

    let err = recommender.recommend(&store, "anything").await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn non_json_answers_are_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("the lamp is nice")))
        .mount(&server)
        .await;

    let store = DemoStore::new();
    let recommender = Recommender::new(server.uri(), "test-key", "test-model", 0.0);

    assert!(recommender.recommend(&store, "anything").await.is_err());
}
