//! Resolution of the HTML document a `/convert` request carries.
//!
//! A request may supply HTML as an uploaded `.html` file, as a form field
//! named `html`, or as a JSON body `{"html": "..."}`. The body is parsed once
//! into [`ConvertInput`] and [`HtmlSource::resolve`] picks the first source
//! present in the order file, form, JSON.

use crate::api::{AppError, ConvertHtmlRequest};
use axum::{
    body::Bytes,
    extract::{Form, FromRequest, Multipart, Request},
    http::{header, HeaderMap},
};
use serde_json::Value;
use tracing::debug;

/// A file part received in a multipart upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename; empty when the form was submitted without a file
    pub filename: String,
    pub contents: Bytes,
}

/// Everything a `/convert` body can carry, before precedence is applied
#[derive(Debug, Default)]
pub struct ConvertInput {
    pub file: Option<UploadedFile>,
    pub form_html: Option<String>,
    pub json: Option<ConvertHtmlRequest>,
}

/// Where the HTML of a conversion came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlSource {
    File { filename: String, html: String },
    Form(String),
    Json(String),
}

impl HtmlSource {
    /// Apply the file > form > JSON precedence.
    pub fn resolve(input: ConvertInput) -> Result<Self, AppError> {
        if let Some(file) = input.file {
            if file.filename.is_empty() {
                return Err(AppError::BadRequest("No file selected".to_string()));
            }
            if !file.filename.ends_with(".html") {
                return Err(AppError::BadRequest("File must be HTML".to_string()));
            }
            let html = String::from_utf8(file.contents.to_vec()).map_err(|e| {
                AppError::Conversion(format!("Uploaded file is not valid UTF-8: {e}"))
            })?;
            return Ok(HtmlSource::File {
                filename: file.filename,
                html,
            });
        }

        if let Some(html) = input.form_html {
            return Ok(HtmlSource::Form(html));
        }

        if let Some(request) = input.json {
            return match request.html {
                Some(html) if !html.is_empty() => Ok(HtmlSource::Json(html)),
                _ => Err(AppError::BadRequest("No HTML content provided".to_string())),
            };
        }

        Err(AppError::BadRequest(
            "No HTML content provided. Send as file, form data, or JSON".to_string(),
        ))
    }

    /// Parse the request body and resolve its HTML source.
    pub async fn from_request(request: Request) -> Result<Self, AppError> {
        let input = ConvertInput::from_request(request).await?;
        Self::resolve(input)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HtmlSource::File { .. } => "file",
            HtmlSource::Form(_) => "form",
            HtmlSource::Json(_) => "json",
        }
    }

    pub fn html(&self) -> &str {
        match self {
            HtmlSource::File { html, .. } => html,
            HtmlSource::Form(html) | HtmlSource::Json(html) => html,
        }
    }
}

/// Body encodings the service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Multipart,
    UrlEncoded,
    Json,
    Other,
}

impl BodyKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(media_type) = media_type(headers) else {
            return BodyKind::Other;
        };

        match media_type.as_str() {
            "multipart/form-data" => BodyKind::Multipart,
            "application/x-www-form-urlencoded" => BodyKind::UrlEncoded,
            "application/json" => BodyKind::Json,
            mt if mt.starts_with("application/") && mt.ends_with("+json") => BodyKind::Json,
            _ => BodyKind::Other,
        }
    }
}

/// Lower-cased media type of the request, without parameters.
fn media_type(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let media_type = value.split(';').next()?.trim();
    if media_type.is_empty() {
        None
    } else {
        Some(media_type.to_ascii_lowercase())
    }
}

/// Whether the request declares a JSON body.
pub fn is_json(headers: &HeaderMap) -> bool {
    BodyKind::from_headers(headers) == BodyKind::Json
}

/// Decode a JSON object body, reading it under the transport size limit.
pub async fn read_json<T>(request: Request) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    let body = Bytes::from_request(request, &()).await?;
    parse_json_object(&body)
}

/// Parse `body` as a JSON object. Arrays and scalars are rejected even when
/// they would deserialize positionally into `T`.
pub fn parse_json_object<T>(body: &[u8]) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    let invalid = |e: serde_json::Error| AppError::BadRequest(format!("Invalid JSON body: {e}"));

    match serde_json::from_slice::<Value>(body).map_err(invalid)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(invalid),
        _ => Err(AppError::BadRequest(
            "Invalid JSON body: expected a JSON object".to_string(),
        )),
    }
}

/// First value submitted under `name`; repeated fields after it are ignored.
fn first_field(fields: Vec<(String, String)>, name: &str) -> Option<String> {
    fields
        .into_iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value)
}

impl ConvertInput {
    pub async fn from_request(request: Request) -> Result<Self, AppError> {
        let kind = BodyKind::from_headers(request.headers());
        debug!("Reading /convert body as {:?}", kind);

        match kind {
            BodyKind::Multipart => Self::from_multipart(request).await,
            BodyKind::UrlEncoded => {
                let Form(fields) =
                    Form::<Vec<(String, String)>>::from_request(request, &()).await?;
                Ok(ConvertInput {
                    form_html: first_field(fields, "html"),
                    ..Default::default()
                })
            }
            BodyKind::Json => Ok(ConvertInput {
                json: Some(read_json(request).await?),
                ..Default::default()
            }),
            BodyKind::Other => Ok(ConvertInput::default()),
        }
    }

    async fn from_multipart(request: Request) -> Result<Self, AppError> {
        let mut multipart = Multipart::from_request(request, &()).await?;
        let mut input = ConvertInput::default();

        while let Some(field) = multipart.next_field().await? {
            let field_name = field.name().unwrap_or("").to_string();
            // Only parts with a filename parameter count as uploads.
            let filename = field.file_name().map(str::to_string);

            match (field_name.as_str(), filename) {
                ("file", Some(filename)) if input.file.is_none() => {
                    let contents = field.bytes().await?;
                    input.file = Some(UploadedFile { filename, contents });
                }
                ("html", None) if input.form_html.is_none() => {
                    input.form_html = Some(field.text().await?);
                }
                _ => {}
            }
        }

        Ok(input)
    }
}
