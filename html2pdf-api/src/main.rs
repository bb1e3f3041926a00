use anyhow::Context;
use clap::Parser;
use html2pdf_api::{app, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "html2pdf_api=debug,html2pdf=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let renderer = config.build_renderer();
    let backend = renderer.name();

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("html2pdf API listening on http://{addr} ({backend} renderer)");

    axum::serve(listener, app(renderer))
        .await
        .context("server error")?;

    Ok(())
}
