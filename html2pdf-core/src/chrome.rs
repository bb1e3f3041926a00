//! Headless Chromium backend.
//!
//! Every call launches its own browser process and tears it down when the
//! document is printed, so nothing is shared between conversions.

use crate::error::{RenderError, Result};
use crate::renderer::{ensure_pdf, parse_remote_url, Renderer};
use headless_chrome::protocol::cdp::Page;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const BLANK_PAGE: &str = "about:blank";

/// Options for launching Chromium and printing pages
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Chromium executable; detected from the environment when `None`
    pub chrome_path: Option<PathBuf>,
    /// Run with the Chromium sandbox (usually disabled inside containers)
    pub sandbox: bool,
    /// Upper bound for navigation and printing
    pub timeout: Duration,
    /// Print CSS backgrounds
    pub print_background: bool,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            chrome_path: None,
            sandbox: true,
            timeout: Duration::from_secs(30),
            print_background: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChromeRenderer {
    options: ChromeOptions,
}

impl ChromeRenderer {
    pub fn new(options: ChromeOptions) -> Self {
        Self { options }
    }

    fn launch(&self) -> Result<Browser> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.options.sandbox)
            .path(self.options.chrome_path.clone())
            .idle_browser_timeout(self.options.timeout)
            .build()
            .map_err(browser_error)?;

        Browser::new(launch_options).map_err(browser_error)
    }

    fn open_tab(&self, browser: &Browser, url: &str) -> Result<Arc<Tab>> {
        let tab = browser.new_tab().map_err(browser_error)?;
        tab.set_default_timeout(self.options.timeout);

        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(browser_error)?;

        Ok(tab)
    }

    fn print(&self, tab: &Tab) -> Result<Vec<u8>> {
        let print_options = PrintToPdfOptions {
            print_background: Some(self.options.print_background),
            prefer_css_page_size: Some(true),
            ..Default::default()
        };
        let pdf_bytes = tab.print_to_pdf(Some(print_options)).map_err(browser_error)?;

        ensure_pdf(pdf_bytes)
    }
}

impl Renderer for ChromeRenderer {
    fn render_html(&self, html: &str) -> Result<Vec<u8>> {
        debug!("Rendering {} bytes of HTML with Chromium", html.len());
        let browser = self.launch()?;
        let tab = self.open_tab(&browser, BLANK_PAGE)?;

        // Documents are pushed over the DevTools connection; URLs are capped
        // at 2 MiB and cannot carry large uploads.
        let frame_tree = tab
            .call_method(Page::GetFrameTree(None))
            .map_err(browser_error)?
            .frame_tree;
        tab.call_method(Page::SetDocumentContent {
            frame_id: frame_tree.frame.id,
            html: html.to_string(),
        })
        .map_err(browser_error)?;
        tab.wait_until_navigated().map_err(browser_error)?;

        self.print(&tab)
    }

    fn render_url(&self, url: &str) -> Result<Vec<u8>> {
        let url = parse_remote_url(url)?;
        debug!("Rendering {} with Chromium", url);
        let browser = self.launch()?;
        let tab = self.open_tab(&browser, url.as_str())?;

        self.print(&tab)
    }

    fn name(&self) -> &'static str {
        "chrome"
    }
}

fn browser_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Browser(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PDF_MAGIC;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let renderer = ChromeRenderer::default();
        assert!(renderer.options.sandbox);
        assert!(renderer.options.print_background);
        assert_eq!(renderer.options.timeout, Duration::from_secs(30));
        assert_eq!(renderer.name(), "chrome");
    }

    #[test]
    fn test_render_url_rejects_invalid_url_before_launch() {
        let renderer = ChromeRenderer::default();
        let err = renderer.render_url("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    #[ignore = "requires a Chromium installation"]
    fn test_render_large_document() {
        let paragraph = "<p>Lorem ipsum dolor sit amet, consectetur adipiscing elit.</p>\n";
        let html = format!(
            "<html><body>{}</body></html>",
            paragraph.repeat(6 * 1024 * 1024 / paragraph.len())
        );
        assert!(html.len() > 5 * 1024 * 1024);

        let renderer = ChromeRenderer::new(ChromeOptions {
            sandbox: false,
            timeout: Duration::from_secs(120),
            ..Default::default()
        });
        let pdf = renderer.render_html(&html).unwrap();
        assert!(pdf.starts_with(PDF_MAGIC));
    }

    #[test]
    #[ignore = "requires a Chromium installation"]
    fn test_render_small_document() {
        let renderer = ChromeRenderer::new(ChromeOptions {
            sandbox: false,
            ..Default::default()
        });
        let pdf = renderer
            .render_html("<html><body><h1>Hi</h1></body></html>")
            .unwrap();
        assert!(pdf.starts_with(PDF_MAGIC));
    }
}
