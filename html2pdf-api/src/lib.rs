//! # html2pdf-api
//!
//! REST API server converting HTML documents and web pages to PDF
//!

mod api;
mod config;
mod input;

#[cfg(test)]
mod api_tests;

pub use api::{
    app, convert_html, convert_url, health_check, AppError, AppState, ConversionRequest,
    ConvertHtmlRequest, ConvertUrlRequest, ErrorResponse, DOWNLOAD_FILENAME,
    MAX_CONTENT_LENGTH,
};
pub use config::{Config, RendererKind};
pub use input::{is_json, BodyKind, ConvertInput, HtmlSource, UploadedFile};
