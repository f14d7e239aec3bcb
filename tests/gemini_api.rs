//! Gemini REST clients and the full pipeline against a wiremock server.

use redecor::{
    Config, DecorError, Decorator, DesignMode, GeminiClient, GeminiConfig, GeneratedImage,
    GenerationRequest, ImageEntryPoint, ImageGenerationRequest, ImageGenerator,
    ImageSynthesisInvoker, Style,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";
const IMAGE_MODEL: &str = "imagen-3.0-generate-001";
const VISION_MODEL: &str = "gemini-2.0-flash";
const TINY_PNG_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn gemini_config(server: &MockServer) -> GeminiConfig {
    GeminiConfig::new()
        .with_api_key(API_KEY)
        .with_base_url(server.uri())
        .with_timeout(10)
}

fn generate_images_path() -> String {
    format!("/models/{}:generateImages", IMAGE_MODEL)
}

fn predict_path() -> String {
    format!("/models/{}:predict", IMAGE_MODEL)
}

fn generate_content_path() -> String {
    format!("/models/{}:generateContent", VISION_MODEL)
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({
        "error": {
            "code": 404,
            "message": "Method not found.",
            "status": "NOT_FOUND"
        }
    }))
}

fn predict_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "predictions": [{
            "bytesBase64Encoded": TINY_PNG_B64,
            "mimeType": "image/png"
        }]
    }))
}

fn vision_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    }))
}

fn image_request(prompt: &str) -> ImageGenerationRequest {
    ImageGenerationRequest {
        model: IMAGE_MODEL.to_string(),
        prompt: prompt.to_string(),
        number_of_images: 1,
    }
}

#[tokio::test]
async fn test_generate_images_entry_point() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_partial_json(json!({
            "prompt": "a cosy loft",
            "config": {"numberOfImages": 1}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generatedImages": [{
                "image": {"imageBytes": TINY_PNG_B64, "mimeType": "image/png"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let images = client
        .image()
        .generate_images(ImageEntryPoint::GenerateImages, &image_request("a cosy loft"))
        .await
        .unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].mime_type, "image/png");
    assert_eq!(images[0], GeneratedImage::from_base64(TINY_PNG_B64, None).unwrap());
}

#[tokio::test]
async fn test_missing_method_is_an_interface_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(not_found())
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let err = client
        .image()
        .generate_images(ImageEntryPoint::GenerateImages, &image_request("x"))
        .await
        .unwrap_err();

    assert!(err.is_interface_mismatch(), "unexpected error: {}", err);
}

async fn generate_images_error(response: ResponseTemplate) -> DecorError {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    client
        .image()
        .generate_images(ImageEntryPoint::GenerateImages, &image_request("x"))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_method_not_allowed_is_an_interface_mismatch() {
    let err = generate_images_error(ResponseTemplate::new(405)).await;
    assert!(err.is_interface_mismatch(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_not_implemented_is_an_interface_mismatch() {
    let err = generate_images_error(ResponseTemplate::new(501).set_body_string("Not Implemented"))
        .await;
    assert!(err.is_interface_mismatch(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_unimplemented_status_is_an_interface_mismatch() {
    let err = generate_images_error(ResponseTemplate::new(400).set_body_json(json!({
        "error": {
            "code": 400,
            "message": "Operation is not implemented for this model.",
            "status": "UNIMPLEMENTED"
        }
    })))
    .await;
    assert!(err.is_interface_mismatch(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_bad_request_is_an_api_error() {
    let err = generate_images_error(ResponseTemplate::new(400).set_body_json(json!({
        "error": {"code": 400, "message": "Prompt is empty", "status": "INVALID_ARGUMENT"}
    })))
    .await;
    assert!(matches!(err, DecorError::ApiError { status: 400, .. }));
}

#[tokio::test]
async fn test_filtered_predictions_are_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(predict_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                {"raiFilteredReason": "Filtered for safety"},
                {"bytesBase64Encoded": TINY_PNG_B64, "mimeType": "image/png"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let images = client
        .image()
        .generate_images(ImageEntryPoint::Predict, &image_request("x"))
        .await
        .unwrap();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].mime_type, "image/png");
}

#[tokio::test]
async fn test_fully_filtered_prediction_fails_generation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(not_found())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(predict_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [{"raiFilteredReason": "Filtered for safety"}]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let invoker = ImageSynthesisInvoker::new(Arc::new(client.image().clone()), IMAGE_MODEL);

    let err = invoker
        .try_invoke(Style::Cyberpunk, "neon")
        .await
        .unwrap_err();
    assert!(matches!(err, DecorError::GenerationError(_)));
}

#[tokio::test]
async fn test_invoker_falls_back_to_predict() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(not_found())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(predict_path()))
        .and(body_partial_json(json!({
            "parameters": {"sampleCount": 1}
        })))
        .respond_with(predict_response())
        .expect(2)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let generator: Arc<dyn ImageGenerator> = Arc::new(client.image().clone());
    let invoker = ImageSynthesisInvoker::new(generator, IMAGE_MODEL);

    let first = invoker.try_invoke(Style::Scandinavian, "light wood").await;
    assert!(first.is_ok());
    assert_eq!(invoker.bound_entry_point(), Some(ImageEntryPoint::Predict));

    // Bound now: the second call must not probe generateImages again.
    let second = invoker.try_invoke(Style::Scandinavian, "more plants").await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn test_rate_limit_does_not_fall_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(predict_path()))
        .respond_with(predict_response())
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let invoker = ImageSynthesisInvoker::new(Arc::new(client.image().clone()), IMAGE_MODEL);

    let err = invoker
        .try_invoke(Style::Cyberpunk, "neon")
        .await
        .unwrap_err();
    match err {
        DecorError::ApiError { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Quota exceeded");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_vision_client_sends_image_then_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .and(header("x-goog-api-key", API_KEY))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {"inline_data": {"mime_type": "image/png", "data": TINY_PNG_B64}},
                    {"text": redecor::decorator::EXTRACTION_PROMPT}
                ]
            }]
        })))
        .respond_with(vision_response(
            "```json\n[{\"name\":\"Velvet Sofa\",\"color\":\"Navy\",\"query\":\"navy velvet sofa\"}]\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&gemini_config(&server)).unwrap();
    let extractor =
        redecor::ProductExtractor::new(Arc::new(client.vision().clone()), VISION_MODEL);
    let image = GeneratedImage::from_base64(TINY_PNG_B64, Some("image/png")).unwrap();

    let items = extractor.try_extract(&image).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Velvet Sofa");
    assert_eq!(items[0].color, "Navy");
    assert_eq!(items[0].query, "navy velvet sofa");
}

#[tokio::test]
async fn test_full_scratch_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(not_found())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(predict_path()))
        .respond_with(predict_response())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(vision_response(
            r#"[
                {"name":"Velvet Sofa","color":"Navy","query":"navy velvet sofa"},
                {"name":"Floor Lamp","color":"Brass"},
                {"name":"Jute Rug","color":"Natural","query":"round jute rug"}
            ]"#,
        ))
        .mount(&server)
        .await;

    let config = Config::new().with_gemini(gemini_config(&server));
    let decorator = Decorator::from_config(config).unwrap();
    assert!(decorator.is_configured());

    let request = GenerationRequest::new(Style::BohemianChic, "lots of plants")
        .with_mode(DesignMode::Scratch);
    let outcome = decorator.run(request).await.unwrap();

    assert!(outcome.generated.is_some());
    let names: Vec<_> = outcome.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Velvet Sofa", "Jute Rug"]);
    assert!(outcome.notices.is_empty());
}

#[tokio::test]
async fn test_vision_failure_keeps_generated_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(generate_images_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "generatedImages": [{
                "image": {"imageBytes": TINY_PNG_B64, "mimeType": "image/png"}
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let decorator =
        Decorator::from_config(Config::new().with_gemini(gemini_config(&server))).unwrap();
    let request =
        GenerationRequest::new(Style::IndustrialLoft, "").with_mode(DesignMode::Scratch);
    let outcome = decorator.run(request).await.unwrap();

    assert!(outcome.generated.is_some());
    assert!(outcome.products.is_empty());
    assert!(outcome.notices.has_warnings());
    assert!(!outcome.notices.has_errors());
}
