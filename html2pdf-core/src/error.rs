use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("PDF generation error: {0}")]
    Pdf(#[from] oxidize_pdf::PdfError),

    #[error("Renderer produced {0} bytes that are not a PDF document")]
    InvalidOutput(usize),
}

impl From<url::ParseError> for RenderError {
    fn from(err: url::ParseError) -> Self {
        RenderError::InvalidInput(format!("invalid URL: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
