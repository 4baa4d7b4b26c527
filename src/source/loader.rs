use std::path::Path;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    config::PlaceholderConfig,
    error::{ImageError, Result},
    source::types::{EmbeddedImage, SourceImage},
};

/// Loads photos from disk, data URIs and the network
///
/// Loads are independent; nothing here cancels an earlier one. The caller
/// applies results in completion order, so the last load to finish wins.
pub struct ImageLoader {
    client: reqwest::Client,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }

    /// Read and decode a file from disk
    pub async fn load_file<P: AsRef<Path>>(path: P) -> Result<EmbeddedImage> {
        let path = path.as_ref();
        debug!("Loading image from: {:?}", path);

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ImageError::ReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let image = decode_blocking(bytes).await?;
        info!("Loaded {:?}: {}x{}", path, image.dimensions().0, image.dimensions().1);
        Ok(image)
    }

    /// Load either a `data:` URI or a file path
    pub async fn load_input(input: &str) -> Result<EmbeddedImage> {
        if input.starts_with("data:") {
            let input = input.to_string();
            return tokio::task::spawn_blocking(move || EmbeddedImage::from_data_uri(&input))
                .await
                .map_err(|e| ImageError::DecodeFailed { reason: e.to_string() })?;
        }
        Self::load_file(input).await
    }

    /// Fetch a network image and embed it as bytes
    pub async fn fetch(&self, url: &str) -> Result<EmbeddedImage> {
        let fetch_failed = |reason: String| ImageError::FetchFailed { url: url.to_string(), reason };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_failed(format!("HTTP {}", response.status())).into());
        }

        let bytes = response.bytes().await.map_err(|e| fetch_failed(e.to_string()))?;
        decode_blocking(bytes.to_vec()).await
    }

    /// Fetch the placeholder photo
    ///
    /// Never fails: if the image cannot be pulled in, the bare URL is kept and
    /// any later export of it will be refused.
    pub async fn fetch_placeholder<R: Rng>(&self, config: &PlaceholderConfig, rng: &mut R) -> SourceImage {
        let url = config.url(rng.gen_range(0..1000));
        info!("Fetching placeholder image: {}", url);

        match self.fetch(&url).await {
            Ok(image) => SourceImage::Embedded(image),
            Err(e) => {
                warn!("Failed to load image as embedded bytes: {}", e);
                SourceImage::Remote { url }
            }
        }
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

async fn decode_blocking(bytes: Vec<u8>) -> Result<EmbeddedImage> {
    tokio::task::spawn_blocking(move || EmbeddedImage::decode(bytes))
        .await
        .map_err(|e| ImageError::DecodeFailed { reason: e.to_string() })?
}
