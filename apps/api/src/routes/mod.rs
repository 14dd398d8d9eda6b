pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

use crate::assist::handlers as assist;
use crate::config::Config;
use crate::proposals::handlers as proposals;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Proposals
        .route("/proposals", post(proposals::handle_create_proposal))
        .route("/proposals/analyze", post(proposals::handle_analyze))
        // Assist
        .route("/assist/chat", post(assist::handle_chat))
        .route("/assist/tts", post(assist::handle_text_to_speech))
        .route("/assist/stt", post(assist::handle_speech_to_text));

    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// CORS for the configured front-end origins, with credentials.
/// Methods and headers mirror the preflight request.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::assist::speech::SpeechClient;
    use crate::config::AnalysisBackend;
    use crate::llm_client::testing::CannedCompletion;
    use crate::llm_client::CompletionPool;

    const BOUNDARY: &str = "proposal-test-boundary";

    fn state_with(reply: Option<&str>, backend: AnalysisBackend, speech_key: Option<&str>) -> AppState {
        let mut config = Config::for_tests();
        config.analysis_backend = backend;
        config.elevenlabs_api_key = speech_key.map(String::from);
        config.elevenlabs_tts_base_url = "http://127.0.0.1:9".to_string();
        let completions = reply.map(|r| CompletionPool::new(Arc::new(CannedCompletion::replying(r)), 2));
        let speech = SpeechClient::from_config(&config).unwrap();
        AppState::assemble(config, completions, speech)
    }

    async fn stub_speech_state(failing: bool) -> AppState {
        let config = crate::assist::speech::testing::stub_config(failing).await;
        let speech = SpeechClient::from_config(&config).unwrap();
        AppState::assemble(config, None, speech)
    }

    fn multipart_request(uri: &str, field: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"draft.txt\"\r\nContent-Type: text/plain\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, None));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["completion_configured"], false);
        assert_eq!(body["speech_configured"], false);
    }

    #[tokio::test]
    async fn test_create_proposal_returns_derived_id() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, None));
        let response = app
            .oneshot(json_request(
                "/api/proposals",
                json!({
                    "project_title": "Rural Broadband Access",
                    "organization_name": "Valley Co-op",
                    "objectives": ["Connect 300 homes"]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["proposal_id"], "proposal-rural-broadband-access");
        assert_eq!(body["message"], "Proposal accepted for processing.");
    }

    #[tokio::test]
    async fn test_analyze_empty_file_is_bad_request() {
        let app = build_router(state_with(None, AnalysisBackend::Heuristic, None));
        let response = app
            .oneshot(multipart_request("/api/proposals/analyze", "file", b""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Uploaded file is empty.");
    }

    #[tokio::test]
    async fn test_analyze_missing_file_field_is_bad_request() {
        let app = build_router(state_with(None, AnalysisBackend::Heuristic, None));
        let response = app
            .oneshot(multipart_request("/api/proposals/analyze", "attachment", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_with_heuristic_backend() {
        let app = build_router(state_with(None, AnalysisBackend::Heuristic, None));
        let response = app
            .oneshot(multipart_request(
                "/api/proposals/analyze",
                "file",
                b"Executive summary: our community budget covers the project risk.",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let sections = body.as_array().unwrap();
        assert_eq!(sections.len(), 7);
        assert_eq!(sections[0]["section"], "Executive Summary");
        assert!(sections.iter().all(|s| s["score"].as_u64().is_some()));
    }

    #[tokio::test]
    async fn test_analyze_without_credential_is_configuration_error() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, None));
        let response = app
            .oneshot(multipart_request("/api/proposals/analyze", "file", b"some draft"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_uses_completion_reply() {
        let reply = json!({"sections": [
            {"section": "Budget", "summary": "Itemised.", "recommendations": [], "score": "87.6"}
        ]})
        .to_string();
        let app = build_router(state_with(Some(&reply), AnalysisBackend::Llm, None));
        let response = app
            .oneshot(multipart_request("/api/proposals/analyze", "file", b"budget draft"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!([{"section": "Budget", "summary": "Itemised.", "recommendations": [], "score": 87}])
        );
    }

    #[tokio::test]
    async fn test_chat_without_credential_is_configuration_error() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, Some("xi")));
        let response = app
            .oneshot(json_request("/api/assist/chat", json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_chat_filters_updates_and_drops_audio_on_synthesis_failure() {
        let reply = "```json\n{\"chat_reply\": \"Saved your budget.\", \"field_updates\": {\"totalBudget\": \"$120,000\", \"contactEmail\": \"a@b.org\"}}\n```";
        let app = build_router(state_with(Some(reply), AnalysisBackend::Llm, Some("xi")));
        let response = app
            .oneshot(json_request(
                "/api/assist/chat",
                json!({"message": "Total is $120k", "history": [], "section": 7}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!({
                "message": "Saved your budget.",
                "audio_base64": null,
                "field_updates": {"totalBudget": "$120,000"}
            })
        );
    }

    #[tokio::test]
    async fn test_chat_updates_outside_allow_list_become_null() {
        let reply = r#"{"chat_reply": "Noted.", "field_updates": {"projectTitle": "X"}}"#;
        let app = build_router(state_with(Some(reply), AnalysisBackend::Llm, Some("xi")));
        let response = app
            .oneshot(json_request(
                "/api/assist/chat",
                json!({"message": "title is X", "section": 10}),
            ))
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["field_updates"], Value::Null);
    }

    #[tokio::test]
    async fn test_tts_without_credential_is_configuration_error() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, None));
        let response = app
            .oneshot(json_request("/api/assist/tts", json!({"text": "hello"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "ELEVENLABS_API_KEY not configured.");
    }

    #[tokio::test]
    async fn test_tts_unreachable_service_is_bad_gateway() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, Some("xi")));
        let response = app
            .oneshot(json_request("/api/assist/tts", json!({"text": "hello"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_stt_empty_audio_is_bad_request() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, Some("xi")));
        let response = app
            .oneshot(multipart_request("/api/assist/stt", "file", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_missing_message_is_structured_bad_request() {
        let app = build_router(state_with(Some("hi"), AnalysisBackend::Llm, Some("xi")));
        let response = app
            .oneshot(json_request("/api/assist/chat", json!({"history": []})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["detail"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn test_proposal_without_json_content_type_is_structured_bad_request() {
        let app = build_router(state_with(None, AnalysisBackend::Llm, None));
        let response = app
            .oneshot(
                Request::post("/api/proposals")
                    .body(Body::from(r#"{"project_title": "X", "organization_name": "Y"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_non_multipart_body_is_structured_bad_request() {
        let app = build_router(state_with(None, AnalysisBackend::Heuristic, None));
        let response = app
            .oneshot(json_request("/api/proposals/analyze", json!({"file": "draft"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_tts_returns_encoded_audio() {
        let app = build_router(stub_speech_state(false).await);
        let response = app
            .oneshot(json_request("/api/assist/tts", json!({"text": "hello", "voice_id": "Bella"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body["audio_base64"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stt_returns_transcript() {
        let app = build_router(stub_speech_state(false).await);
        let response = app
            .oneshot(multipart_request("/api/assist/stt", "file", b"abcd"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], "eleven_multilingual_v2|draft.txt|text/plain|4");
    }

    #[tokio::test]
    async fn test_stt_rejected_by_service_is_bad_gateway() {
        let app = build_router(stub_speech_state(true).await);
        let response = app
            .oneshot(multipart_request("/api/assist/stt", "file", b"abcd"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Speech-to-text failed: quota exceeded");
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        let mut config = Config::for_tests();
        config.allowed_origins = vec!["http://localhost:3000".into(), "bad\norigin".into()];
        // Building must not panic with credentials enabled.
        let _ = cors_layer(&config);
    }
}
