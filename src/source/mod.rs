//! # Image Ingestion
//!
//! Turns files, data URIs and network images into a [`SourceImage`]. Network
//! images are embedded as bytes right away so the exporter never has to reach
//! across origins.

pub mod types;
pub mod loader;

pub use types::{EmbeddedImage, SourceImage};
pub use loader::ImageLoader;
