use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbaImage};

use crate::error::{ImageError, Result};

/// A decoded photo held entirely in memory
///
/// Keeps the original bytes (for metadata and data URIs) next to the decoded
/// pixels. Cloning is cheap; the buffers are shared.
#[derive(Clone)]
pub struct EmbeddedImage {
    bytes: Arc<[u8]>,
    pixels: Arc<RgbaImage>,
    format: ImageFormat,
}

impl EmbeddedImage {
    /// Decode raw file bytes
    pub fn decode(bytes: Vec<u8>) -> Result<Self> {
        let format = image::guess_format(&bytes)
            .map_err(|e| ImageError::DecodeFailed { reason: e.to_string() })?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| ImageError::DecodeFailed { reason: e.to_string() })?;

        Ok(Self {
            bytes: bytes.into(),
            pixels: Arc::new(decoded.to_rgba8()),
            format,
        })
    }

    /// Decode a `data:<mime>;base64,<payload>` URI
    pub fn from_data_uri(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::InvalidDataUri { reason: "missing data: scheme".into() })?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::InvalidDataUri { reason: "missing payload".into() })?;
        if !header.ends_with(";base64") {
            return Err(ImageError::InvalidDataUri { reason: "payload is not base64".into() }.into());
        }

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::InvalidDataUri { reason: e.to_string() })?;
        Self::decode(bytes)
    }

    /// Self-contained representation safe to hand to any rasterizer
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }

    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            _ => "application/octet-stream",
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

impl fmt::Debug for EmbeddedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedImage")
            .field("format", &self.format)
            .field("bytes", &self.bytes.len())
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

/// The photo being printed
///
/// Replaced wholesale on every load. A `Remote` source is what is left when a
/// network image could not be pulled in as bytes; it can be previewed by URL
/// but never rasterized.
#[derive(Debug, Clone)]
pub enum SourceImage {
    Embedded(EmbeddedImage),
    Remote { url: String },
}

impl SourceImage {
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            SourceImage::Embedded(image) => Some(image.dimensions()),
            SourceImage::Remote { .. } => None,
        }
    }

    pub fn embedded(&self) -> Option<&EmbeddedImage> {
        match self {
            SourceImage::Embedded(image) => Some(image),
            SourceImage::Remote { .. } => None,
        }
    }

    /// Location the renderer would reference for this image
    pub fn href(&self) -> String {
        match self {
            SourceImage::Embedded(image) => image.data_uri(),
            SourceImage::Remote { url } => url.clone(),
        }
    }
}

impl From<EmbeddedImage> for SourceImage {
    fn from(image: EmbeddedImage) -> Self {
        SourceImage::Embedded(image)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgba};
    use std::io::Cursor;

    /// Encode a small solid-color PNG
    pub(crate) fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageOutputFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = EmbeddedImage::decode(png_bytes(4, 3, [10, 20, 30, 255])).unwrap();
        assert_eq!(image.dimensions(), (4, 3));
        assert_eq!(image.format(), ImageFormat::Png);
        assert_eq!(image.pixels().get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(EmbeddedImage::decode(b"hello".to_vec()).is_err());
    }

    #[test]
    fn test_data_uri_round_trip_keeps_bytes() {
        let bytes = png_bytes(2, 2, [1, 2, 3, 255]);
        let image = EmbeddedImage::decode(bytes.clone()).unwrap();
        let uri = image.data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));

        let reloaded = EmbeddedImage::from_data_uri(&uri).unwrap();
        assert_eq!(reloaded.bytes(), bytes.as_slice());
    }

    #[test]
    fn test_bad_data_uris() {
        assert!(EmbeddedImage::from_data_uri("https://example.com/a.png").is_err());
        assert!(EmbeddedImage::from_data_uri("data:image/png,plain").is_err());
        assert!(EmbeddedImage::from_data_uri("data:image/png;base64,@@@").is_err());
    }

    #[test]
    fn test_remote_source_has_no_pixels() {
        let source = SourceImage::Remote { url: "https://picsum.photos/800/1000".into() };
        assert!(source.dimensions().is_none());
        assert!(source.embedded().is_none());
        assert_eq!(source.href(), "https://picsum.photos/800/1000");
    }
}
