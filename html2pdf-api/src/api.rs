use crate::input::{is_json, read_json, HtmlSource};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{BytesRejection, FormRejection},
        DefaultBodyLimit, Request, State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use html2pdf::{RenderError, Renderer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Largest request body accepted on any route (16 MiB)
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Filename offered to clients for every generated document
pub const DOWNLOAD_FILENAME: &str = "document.pdf";

/// JSON payload accepted by `/convert`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertHtmlRequest {
    /// HTML document to render
    #[serde(default)]
    pub html: Option<String>,
}

/// JSON payload accepted by `/convert-url`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertUrlRequest {
    /// Address of the page to render
    #[serde(default)]
    pub url: Option<String>,
}

/// Standard error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message describing what went wrong
    pub error: String,
}

/// A resolved conversion: either an HTML document or a page to fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionRequest {
    Html(HtmlSource),
    Url(String),
}

impl ConversionRequest {
    /// Hand the request to the renderer. Blocks until the document is done.
    pub fn run(&self, renderer: &dyn Renderer) -> html2pdf::Result<Vec<u8>> {
        match self {
            ConversionRequest::Html(source) => renderer.render_html(source.html()),
            ConversionRequest::Url(url) => renderer.render_url(url),
        }
    }
}

/// Application-specific error types for the API
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input, detected before rendering
    #[error("{0}")]
    BadRequest(String),
    /// Request body over [`MAX_CONTENT_LENGTH`]
    #[error("File too large. Maximum size is 16MB")]
    PayloadTooLarge,
    /// Failure raised by the renderer
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Any other failure while reading or converting the request
    #[error("{0}")]
    Conversion(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Render(_) | AppError::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify an extractor failure by the status axum assigned to it.
    fn from_rejection(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else if status.is_client_error() {
            AppError::BadRequest(message)
        } else {
            AppError::Conversion(message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_response = ErrorResponse {
            error: self.to_string(),
        };

        (self.status(), Json(error_response)).into_response()
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        // A broken multipart stream is a conversion failure, not bad input.
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge,
            _ => AppError::Conversion(format!("Failed to read multipart field: {}", err.body_text())),
        }
    }
}

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<dyn Renderer>,
}

/// Build the application router with all routes configured
pub fn app(renderer: Arc<dyn Renderer>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/convert", post(convert_html))
        .route("/convert-url", post(convert_url))
        .with_state(AppState { renderer })
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_CONTENT_LENGTH))
        .layer(middleware::map_response(payload_too_large_as_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint for monitoring and load balancing
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Convert an uploaded file, form field or JSON document to PDF
pub async fn convert_html(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    let source = HtmlSource::from_request(request).await?;
    info!(
        "Converting {} bytes of HTML from {} source",
        source.html().len(),
        source.kind()
    );

    let pdf_bytes = render(&state, ConversionRequest::Html(source)).await?;
    Ok(pdf_response(pdf_bytes))
}

/// Fetch a web page and convert it to PDF
pub async fn convert_url(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, AppError> {
    if !is_json(request.headers()) {
        return Err(AppError::BadRequest(
            "Content-Type must be application/json".to_string(),
        ));
    }

    let payload: ConvertUrlRequest = read_json(request).await?;
    let url = match payload.url {
        Some(url) if !url.is_empty() => url,
        _ => return Err(AppError::BadRequest("No URL provided".to_string())),
    };
    info!("Converting URL {}", url);

    let pdf_bytes = render(&state, ConversionRequest::Url(url)).await?;
    Ok(pdf_response(pdf_bytes))
}

/// Run the renderer on the blocking pool.
async fn render(state: &AppState, request: ConversionRequest) -> Result<Vec<u8>, AppError> {
    let renderer = Arc::clone(&state.renderer);
    let backend = renderer.name();

    let result = tokio::task::spawn_blocking(move || request.run(renderer.as_ref()))
        .await
        .map_err(|e| AppError::Conversion(format!("Render task failed: {e}")))?;

    match result {
        Ok(pdf_bytes) => {
            info!("Rendered {} bytes with the {} renderer", pdf_bytes.len(), backend);
            Ok(pdf_bytes)
        }
        Err(e) => {
            warn!("The {} renderer failed: {}", backend, e);
            Err(e.into())
        }
    }
}

fn pdf_response(pdf_bytes: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        pdf_bytes,
    )
        .into_response()
}

/// Give every 413, including those produced by the body limit layer itself,
/// the same JSON body.
async fn payload_too_large_as_json(response: Response) -> Response {
    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge.into_response()
    } else {
        response
    }
}
