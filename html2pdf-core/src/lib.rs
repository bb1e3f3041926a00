//! # html2pdf
//!
//! Rendering backends that turn an HTML string or a web page into a PDF
//! document behind a single [`Renderer`] trait.
//!
//! ## Backends
//!
//! - [`ChromeRenderer`]: prints the page with a headless Chromium, giving
//!   full CSS and JavaScript support. Requires a Chromium installation.
//! - [`TextRenderer`]: lays the document's text out with oxidize-pdf. No
//!   browser required, but styling is discarded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use html2pdf::{Renderer, TextRenderer};
//!
//! # fn main() -> html2pdf::Result<()> {
//! let renderer = TextRenderer::default();
//! let pdf = renderer.render_html("<h1>Hello, World!</h1>")?;
//! std::fs::write("hello.pdf", pdf).unwrap();
//! # Ok(())
//! # }
//! ```

pub mod chrome;
pub mod error;
pub mod renderer;
pub mod text;

pub use chrome::{ChromeOptions, ChromeRenderer};
pub use error::{RenderError, Result};
pub use renderer::{ensure_pdf, parse_remote_url, Renderer, PDF_MAGIC};
pub use text::{TextOptions, TextRenderer};

/// Current version of html2pdf
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
