// Tests for the HTTP model clients against mocked endpoints

use clarity_core::caption::{
    BlipCaptionClient, CaptionError, CaptionModel, VisionConfig,
};
use clarity_core::llm::{ChatCompletionsClient, ChatModel, LlmConfig, LlmError};
use image::RgbImage;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// ============================================================================
// Chat Completions Client Tests
// ============================================================================

#[tokio::test]
async fn test_chat_client_sends_model_and_single_user_message() {
    let mock_server = MockServer::start().await;

    let payload = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": "{\"issues\": []}" } }]
    });
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "llama-3.3-70b-versatile",
            "messages": [{ "role": "user" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        ChatCompletionsClient::new(LlmConfig::new("test-key").with_base_url(mock_server.uri()));
    let raw = client.complete("audit this page").await.unwrap();

    assert_eq!(raw, "{\"issues\": []}");
}

#[tokio::test]
async fn test_chat_client_surfaces_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client =
        ChatCompletionsClient::new(LlmConfig::new("test-key").with_base_url(mock_server.uri()));
    let result = client.complete("audit this page").await;

    assert!(matches!(result, Err(LlmError::Http(_))));
}

#[tokio::test]
async fn test_chat_client_rejects_responses_without_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let client =
        ChatCompletionsClient::new(LlmConfig::new("test-key").with_base_url(mock_server.uri()));
    let result = client.complete("audit this page").await;

    assert!(matches!(result, Err(LlmError::MalformedResponse(_))));
}

// ============================================================================
// Vision Caption Client Tests
// ============================================================================

fn test_image() -> RgbImage {
    RgbImage::new(4, 4)
}

#[tokio::test]
async fn test_blip_client_decodes_generated_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/Salesforce/blip-image-captioning-base"))
        .and(header("content-type", "image/png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "generated_text": "  a black square on a white table  " }
        ])))
        .mount(&mock_server)
        .await;

    let client =
        BlipCaptionClient::new(VisionConfig::new("hf-token").with_base_url(mock_server.uri()));
    let caption = client.caption(&test_image()).await.unwrap();

    assert_eq!(caption, "a black square on a white table");
}

#[tokio::test]
async fn test_blip_client_rejects_unexpected_payloads() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/Salesforce/blip-image-captioning-base"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "loading"})),
        )
        .mount(&mock_server)
        .await;

    let client =
        BlipCaptionClient::new(VisionConfig::new("hf-token").with_base_url(mock_server.uri()));
    let result = client.caption(&test_image()).await;

    assert!(matches!(result, Err(CaptionError::Inference(_))));
}
