//! Tests for the API endpoints

#[cfg(test)]
mod tests {
    use super::super::api::*;
    use crate::input::HtmlSource;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::IntoResponse,
    };
    use html2pdf::{RenderError, Renderer};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Records what it was asked to render and echoes it inside a fake PDF.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<String>>,
    }

    impl Renderer for RecordingRenderer {
        fn render_html(&self, html: &str) -> html2pdf::Result<Vec<u8>> {
            self.calls.lock().unwrap().push(format!("html:{html}"));
            Ok(format!("%PDF-1.7\n{html}").into_bytes())
        }

        fn render_url(&self, url: &str) -> html2pdf::Result<Vec<u8>> {
            self.calls.lock().unwrap().push(format!("url:{url}"));
            Ok(format!("%PDF-1.7\n{url}").into_bytes())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    struct FailingRenderer;

    impl Renderer for FailingRenderer {
        fn render_html(&self, _html: &str) -> html2pdf::Result<Vec<u8>> {
            Err(RenderError::Browser("layout crashed".to_string()))
        }

        fn render_url(&self, url: &str) -> html2pdf::Result<Vec<u8>> {
            Err(RenderError::Browser(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        let boundary = "html2pdf-test-boundary";
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{boundary}\r\n"));
            match filename {
                Some(filename) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: text/html\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        Request::builder()
            .uri("/convert")
            .method("POST")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn error_message(response: axum::response::Response) -> String {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        json["error"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_app_error_status_mapping() {
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PayloadTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Render(RenderError::InvalidOutput(0)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Conversion("x".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_app_error_response_body() {
        let response = AppError::PayloadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            error_message(response).await,
            "File too large. Maximum size is 16MB"
        );

        let response = AppError::from(RenderError::Browser("tab crashed".to_string()))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(response).await, "Browser error: tab crashed");
    }

    #[test]
    fn test_conversion_request_dispatch() {
        let renderer = RecordingRenderer::default();

        let html = ConversionRequest::Html(HtmlSource::Form("<p>a</p>".to_string()));
        let url = ConversionRequest::Url("https://example.com".to_string());
        html.run(&renderer).unwrap();
        url.run(&renderer).unwrap();

        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec![
                "html:<p>a</p>".to_string(),
                "url:https://example.com".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_multipart_file_wins_over_form_field() {
        let renderer = Arc::new(RecordingRenderer::default());
        let app = app(renderer.clone());

        let response = app
            .oneshot(multipart(&[
                ("html", None, "<p>form</p>"),
                ("file", Some("page.html"), "<p>file</p>"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec!["html:<p>file</p>".to_string()]
        );
    }

    #[tokio::test]
    async fn test_multipart_form_field() {
        let renderer = Arc::new(RecordingRenderer::default());
        let app = app(renderer.clone());

        let response = app
            .oneshot(multipart(&[("html", None, "<h1>Title</h1>")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"%PDF-1.7\n<h1>Title</h1>");
    }

    #[tokio::test]
    async fn test_multipart_wrong_extension() {
        let renderer = Arc::new(RecordingRenderer::default());
        let app = app(renderer.clone());

        let response = app
            .oneshot(multipart(&[("file", Some("notes.txt"), "hello")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "File must be HTML");
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multipart_without_known_fields() {
        let app = app(Arc::new(RecordingRenderer::default()));

        let response = app
            .oneshot(multipart(&[("other", None, "value")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_message(response).await,
            "No HTML content provided. Send as file, form data, or JSON"
        );
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let app = app(Arc::new(RecordingRenderer::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/convert")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("invalid json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(response).await.starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_render_failure_is_internal_error() {
        let app = app(Arc::new(FailingRenderer));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/convert")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "html": "<p>x</p>" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_message(response).await, "Browser error: layout crashed");
    }

    #[tokio::test]
    async fn test_convert_url_passes_url_through() {
        let renderer = Arc::new(RecordingRenderer::default());
        let app = app(renderer.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/convert-url")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
                    .body(Body::from(json!({ "url": "https://example.com" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-disposition").unwrap(),
            "attachment; filename=\"document.pdf\""
        );
        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec!["url:https://example.com".to_string()]
        );
    }

    #[tokio::test]
    async fn test_convert_url_missing_key() {
        let app = app(Arc::new(RecordingRenderer::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/convert-url")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "link": "https://example.com" }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_message(response).await, "No URL provided");
    }

    #[tokio::test]
    async fn test_json_array_bodies_are_rejected() {
        let renderer = Arc::new(RecordingRenderer::default());

        for (uri, body) in [
            ("/convert", json!(["<p>hi</p>"])),
            ("/convert-url", json!(["https://example.com"])),
            ("/convert-url", json!(["file:///etc/passwd"])),
        ] {
            let response = app(renderer.clone())
                .oneshot(
                    Request::builder()
                        .uri(uri)
                        .method("POST")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
            assert_eq!(
                error_message(response).await,
                "Invalid JSON body: expected a JSON object"
            );
        }

        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_form_field_uses_first_value() {
        let renderer = Arc::new(RecordingRenderer::default());

        let response = app(renderer.clone())
            .oneshot(
                Request::builder()
                    .uri("/convert")
                    .method("POST")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("html=%3Cp%3Efirst%3C%2Fp%3E&html=%3Cp%3Esecond%3C%2Fp%3E"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *renderer.calls.lock().unwrap(),
            vec!["html:<p>first</p>".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = app(Arc::new(RecordingRenderer::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/create")
                    .method("POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
