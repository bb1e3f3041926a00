//! Plain-text backend built on oxidize-pdf.
//!
//! The HTML is reduced to readable text, word-wrapped with the Helvetica
//! metrics and laid out top to bottom on as many A4 pages as it needs. No
//! CSS, images or scripts are interpreted; use the Chromium backend when
//! fidelity matters.

use crate::error::Result;
use crate::renderer::{ensure_pdf, parse_remote_url, Renderer};
use oxidize_pdf::{measure_text, split_into_words, Document, Font, Page};
use std::time::Duration;
use tracing::debug;

const A4_WIDTH: f64 = 595.0;
const A4_HEIGHT: f64 = 842.0;
const LINE_SPACING: f64 = 1.4;

/// Layout and fetch options for [`TextRenderer`]
#[derive(Debug, Clone)]
pub struct TextOptions {
    /// Font size in points
    pub font_size: f64,
    /// Margin applied to all four page edges, in points
    pub margin: f64,
    /// Timeout for fetching pages in URL mode
    pub fetch_timeout: Duration,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            font_size: 11.0,
            margin: 56.0,
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    options: TextOptions,
}

impl TextRenderer {
    pub fn new(options: TextOptions) -> Self {
        Self { options }
    }

    fn lines_per_page(&self) -> usize {
        let usable = A4_HEIGHT - 2.0 * self.options.margin;
        let per_page = (usable / (self.options.font_size * LINE_SPACING)).floor();
        if per_page >= 1.0 {
            per_page as usize
        } else {
            1
        }
    }

    fn layout(&self, text: &str) -> Result<Vec<u8>> {
        let font_size = self.options.font_size;
        let margin = self.options.margin;
        let lines = wrap_lines(text, font_size, A4_WIDTH - 2.0 * margin);

        let mut doc = Document::new();
        doc.set_title("document");
        doc.set_creator("html2pdf");

        let mut pages: Vec<&[String]> = lines.chunks(self.lines_per_page()).collect();
        if pages.is_empty() {
            pages.push(&[]);
        }

        for chunk in pages {
            let mut page = Page::a4();
            let mut y = A4_HEIGHT - margin - font_size;
            for line in chunk {
                if !line.is_empty() {
                    page.text()
                        .set_font(Font::Helvetica, font_size)
                        .at(margin, y)
                        .write(line)?;
                }
                y -= font_size * LINE_SPACING;
            }
            doc.add_page(page);
        }

        let mut pdf_bytes = Vec::new();
        doc.write(&mut pdf_bytes)?;
        debug!(
            "Laid out {} lines on {} pages ({} bytes)",
            lines.len(),
            doc.page_count(),
            pdf_bytes.len()
        );

        ensure_pdf(pdf_bytes)
    }
}

impl Renderer for TextRenderer {
    fn render_html(&self, html: &str) -> Result<Vec<u8>> {
        self.layout(&html_to_text(html))
    }

    fn render_url(&self, url: &str) -> Result<Vec<u8>> {
        let url = parse_remote_url(url)?;
        debug!("Fetching {}", url);

        // The blocking client runs its own runtime; keep it scoped to this call.
        let client = reqwest::blocking::Client::builder()
            .timeout(self.options.fetch_timeout)
            .user_agent(concat!("html2pdf/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let html = client.get(url).send()?.error_for_status()?.text()?;

        self.render_html(&html)
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

/// Reduce an HTML document to the text a reader would see.
pub fn html_to_text(html: &str) -> String {
    html2md::parse_html(html)
}

/// Greedy word wrap of `text` into lines no wider than `max_width` points.
///
/// Source line breaks are kept, runs of whitespace collapse to one space and
/// words wider than a full line are broken between characters.
pub fn wrap_lines(text: &str, font_size: f64, max_width: f64) -> Vec<String> {
    let space_width = measure_text(" ", Font::Helvetica, font_size);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut width = 0.0;
        let mut pending_space = false;

        for word in split_into_words(paragraph) {
            if word.trim().is_empty() {
                pending_space = !current.is_empty();
                continue;
            }

            let word_width = measure_text(word, Font::Helvetica, font_size);
            let gap = if pending_space { space_width } else { 0.0 };
            if !current.is_empty() && width + gap + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                width = 0.0;
            } else if pending_space {
                current.push(' ');
                width += space_width;
            }
            pending_space = false;

            if word_width <= max_width {
                current.push_str(word);
                width += word_width;
                continue;
            }

            for ch in word.chars() {
                let mut buf = [0u8; 4];
                let ch_width = measure_text(ch.encode_utf8(&mut buf), Font::Helvetica, font_size);
                if !current.is_empty() && width + ch_width > max_width {
                    lines.push(std::mem::take(&mut current));
                    width = 0.0;
                }
                current.push(ch);
                width += ch_width;
            }
        }

        lines.push(current);
    }

    lines
}
