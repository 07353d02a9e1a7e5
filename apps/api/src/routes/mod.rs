pub mod health;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::email::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Result<Router> {
    let cors = build_cors_layer(&state.config)?;
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Ok(Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/process-email", post(handlers::handle_process_email))
        .route("/upload-file", post(handlers::handle_upload_file))
        .layer(body_limit)
        .layer(cors)
        .with_state(state))
}

/// CORS restricted to the configured frontend origins, with credentials.
fn build_cors_layer(config: &Config) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{o}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::email::classifier::test_support::StubModel;
    use crate::email::extract::test_support::build_pdf;
    use crate::email::parser::FALLBACK_RESPONSE;

    const WELL_FORMED: &str =
        "Category: Productive\nSuggested Response: Hello! We will look into your invoice.\nBest regards";
    const BOUNDARY: &str = "XTRIAGEBOUNDARY";

    fn router_with(model: Arc<StubModel>) -> Router {
        router_with_config(model, Config::for_tests())
    }

    fn router_with_config(model: Arc<StubModel>, config: Config) -> Router {
        let state = AppState {
            config: Arc::new(config),
            model,
        };
        build_router(state).unwrap()
    }

    fn multipart_request(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload-file")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/process-email")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_reports_online() {
        let app = router_with(Arc::new(StubModel::replying(WELL_FORMED)));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "online");
    }

    #[tokio::test]
    async fn test_process_email_returns_parsed_fields() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let response = app
            .oneshot(json_request(r#"{"email_text": "Can you check case #881?"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["category"], "Productive");
        assert_eq!(
            body["suggested_response"],
            "Hello! We will look into your invoice.\nBest regards"
        );
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_process_email_missing_field_rejected_before_model() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let response = app.oneshot(json_request(r#"{"text": "hi"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("email_text"));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_process_email_malformed_json_uses_error_body() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let response = app.oneshot(json_request("{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_txt_upload_end_to_end() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let response = app
            .oneshot(multipart_request(
                "file",
                "mail.txt",
                b"please help me with my invoice",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["category"], "Productive");
        assert_eq!(
            body["suggested_response"],
            "Hello! We will look into your invoice.\nBest regards"
        );
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("please help me with my invoice"));
    }

    #[tokio::test]
    async fn test_pdf_upload_text_reaches_model() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let pdf = build_pdf(&["please help me", "with my invoice"]);
        let response = app
            .oneshot(multipart_request("file", "mail.pdf", &pdf))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["category"], "Productive");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let first = prompts[0].find("please help me").expect("page one in prompt");
        let second = prompts[0].find("with my invoice").expect("page two in prompt");
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_payload_too_large() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let mut config = Config::for_tests();
        config.max_upload_bytes = 64;
        let app = router_with_config(model.clone(), config);
        let response = app
            .oneshot(multipart_request("file", "mail.txt", &[b'a'; 4096]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_docx_upload_never_reaches_model() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let response = app
            .oneshot(multipart_request("file", "report.docx", b"PK\x03\x04"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FILE_TYPE");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_processing_error() {
        let model = Arc::new(StubModel::replying(WELL_FORMED));
        let app = router_with(model.clone());
        let response = app
            .oneshot(multipart_request("file", "mail.pdf", b"not really a pdf"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "EXTRACTION_ERROR");
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_first_named_file() {
        let model = Arc::new(StubModel::replying("Category: Unproductive"));
        let app = router_with(model.clone());
        let response = app
            .oneshot(multipart_request("attachment", "note.TXT", b"Happy holidays!"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["category"], "Unproductive");
        assert_eq!(body["suggested_response"], FALLBACK_RESPONSE);
    }

    #[tokio::test]
    async fn test_model_failure_returns_generic_error() {
        let model = Arc::new(StubModel::failing());
        let app = router_with(model.clone());
        let response = app
            .oneshot(json_request(r#"{"email_text": "hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(!message.contains("sk-secret"), "model detail must not leak");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_configured_origin() {
        let app = router_with(Arc::new(StubModel::replying(WELL_FORMED)));
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/process-email")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_cors_rejects_unknown_origin() {
        let app = router_with(Arc::new(StubModel::replying(WELL_FORMED)));
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/process-email")
                    .header(header::ORIGIN, "https://evil.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn test_invalid_origin_fails_router_build() {
        let mut config = Config::for_tests();
        config.allowed_origins = vec!["http://bad\norigin".to_string()];
        assert!(build_cors_layer(&config).is_err());
    }
}
