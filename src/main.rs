// Web-based image analyzer on top of a cloud vision service

use ab_glyph::FontVec;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use smart_image_analyzer::config::Config;
use smart_image_analyzer::server::{router, AppState};
use smart_image_analyzer::{AnnotationRenderer, VisionClient};

fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read font {}", path.display()))?;
    FontVec::try_from_vec(data)
        .map_err(|e| anyhow::anyhow!("failed to load font {}: {}", path.display(), e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let font = match &config.font_path {
        Some(path) => Some(load_font(path)?),
        None => {
            log::warn!("ANNOTATION_FONT not set, drawing outlines without text labels");
            None
        }
    };

    let state = Arc::new(AppState::new(
        VisionClient::new(config.vision.clone()),
        AnnotationRenderer::new(font),
    ));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    log::info!("🚀 Server running on http://{}", config.bind_addr);
    log::info!("📸 Open in your browser to start analyzing!");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
