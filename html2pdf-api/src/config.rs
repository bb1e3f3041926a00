use clap::{Parser, ValueEnum};
use html2pdf::{ChromeOptions, ChromeRenderer, Renderer, TextOptions, TextRenderer};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Rendering backend served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererKind {
    /// Headless Chromium (full CSS support)
    Chrome,
    /// Built-in plain-text layout, no browser required
    Text,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "html2pdf-api",
    about = "HTTP service converting HTML documents and web pages to PDF",
    version
)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HTML2PDF_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "HTML2PDF_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Rendering backend
    #[arg(long, env = "HTML2PDF_RENDERER", value_enum, default_value_t = RendererKind::Chrome)]
    pub renderer: RendererKind,

    /// Chromium executable (detected automatically when omitted)
    #[arg(long, env = "HTML2PDF_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Disable the Chromium sandbox, typically needed inside containers
    #[arg(long, env = "HTML2PDF_NO_SANDBOX")]
    pub no_sandbox: bool,

    /// Navigation and fetch timeout in seconds
    #[arg(long, env = "HTML2PDF_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn build_renderer(&self) -> Arc<dyn Renderer> {
        match self.renderer {
            RendererKind::Chrome => Arc::new(ChromeRenderer::new(ChromeOptions {
                chrome_path: self.chrome_path.clone(),
                sandbox: !self.no_sandbox,
                timeout: self.timeout(),
                ..Default::default()
            })),
            RendererKind::Text => Arc::new(TextRenderer::new(TextOptions {
                fetch_timeout: self.timeout(),
                ..Default::default()
            })),
        }
    }
}
