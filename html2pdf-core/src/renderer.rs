//! The renderer seam shared by every backend.

use crate::error::{RenderError, Result};
use url::Url;

/// Magic header every PDF document starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Converts HTML into a complete PDF document.
///
/// Both entry points are synchronous and atomic: they either return the whole
/// document or an error carrying a human-readable message. Implementations may
/// block for a long time (layout work, network fetches), so async callers
/// should run them on a blocking thread.
pub trait Renderer: Send + Sync {
    /// Render an HTML document given as a string.
    fn render_html(&self, html: &str) -> Result<Vec<u8>>;

    /// Fetch the page at `url` and render it.
    fn render_url(&self, url: &str) -> Result<Vec<u8>>;

    /// Short backend name used in logs.
    fn name(&self) -> &'static str;
}

/// Reject output that does not look like a PDF document.
pub fn ensure_pdf(bytes: Vec<u8>) -> Result<Vec<u8>> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(bytes)
    } else {
        Err(RenderError::InvalidOutput(bytes.len()))
    }
}

/// Parse a URL handed to [`Renderer::render_url`].
///
/// Only `http` and `https` targets are accepted so that callers cannot make
/// a backend read local files through `file://` URLs.
pub fn parse_remote_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(RenderError::InvalidInput(format!(
            "unsupported URL scheme '{scheme}', expected http or https"
        ))),
    }
}
