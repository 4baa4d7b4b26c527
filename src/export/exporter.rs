use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageOutputFormat, RgbaImage};
use tracing::{debug, info};

use crate::{
    config::ExportConfig,
    error::{ExportError, Result},
    export::delivery::{ClipboardSink, Delivery},
    render::{raster::EXPORT_SCALE, Composite, Rasterizer, TextRenderer},
    source::SourceImage,
};

/// Everything needed to develop one print, detached from the session
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub composite: Composite,
    pub source: Option<SourceImage>,
    pub delivery: Delivery,
}

/// What a successful export did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportReceipt {
    Saved { path: PathBuf },
    Copied { width: u32, height: u32 },
}

/// Rasterizes composites and hands them to a delivery target
pub struct Exporter {
    rasterizer: Arc<Rasterizer>,
    clipboard: Arc<dyn ClipboardSink>,
    filename_prefix: String,
}

impl Exporter {
    pub fn new(config: &ExportConfig, text: TextRenderer, clipboard: Arc<dyn ClipboardSink>) -> Self {
        Self {
            rasterizer: Arc::new(Rasterizer::new(EXPORT_SCALE, text)),
            clipboard,
            filename_prefix: config.filename_prefix.clone(),
        }
    }

    /// Rasterize, encode and deliver
    ///
    /// Pixel work runs on the blocking pool. Nothing is written when any step
    /// fails.
    pub async fn export(&self, job: ExportJob) -> Result<ExportReceipt> {
        let ExportJob { composite, source, delivery } = job;

        let rasterizer = Arc::clone(&self.rasterizer);
        let image = tokio::task::spawn_blocking(move || rasterizer.rasterize(&composite, source.as_ref()))
            .await
            .map_err(|e| ExportError::RasterizationFailed { reason: e.to_string() })??;

        if image.width() == 0 || image.height() == 0 || image.as_raw().is_empty() {
            return Err(ExportError::EmptyOutput.into());
        }
        debug!("Rasterized print: {}x{}", image.width(), image.height());

        match delivery {
            Delivery::Download { dir } => {
                let png = encode_png(&image)?;
                let path = dir.join(export_filename(&self.filename_prefix, chrono::Utc::now().timestamp_millis()));
                let write_failed = |e: std::io::Error| ExportError::WriteFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                };

                tokio::fs::create_dir_all(&dir).await.map_err(write_failed)?;
                tokio::fs::write(&path, png).await.map_err(write_failed)?;
                info!("Saved print to {:?}", path);
                Ok(ExportReceipt::Saved { path })
            }
            Delivery::Clipboard => {
                let clipboard = Arc::clone(&self.clipboard);
                let (width, height) = image.dimensions();
                tokio::task::spawn_blocking(move || clipboard.write_image(width, height, image.as_raw()))
                    .await
                    .map_err(|e| ExportError::ClipboardRejected { reason: e.to_string() })??;
                info!("Copied {}x{} print to clipboard", width, height);
                Ok(ExportReceipt::Copied { width, height })
            }
        }
    }
}

/// File name for a print exported at `timestamp_ms`
pub fn export_filename(prefix: &str, timestamp_ms: i64) -> String {
    format!("{}-{}.png", prefix, timestamp_ms)
}

/// Encode an RGBA buffer as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageOutputFormat::Png)
        .map_err(|e| ExportError::EncodingFailed { reason: e.to_string() })?;

    let bytes = out.into_inner();
    if bytes.is_empty() {
        return Err(ExportError::EmptyOutput.into());
    }
    Ok(bytes)
}
