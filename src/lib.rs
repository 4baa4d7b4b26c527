//! # Memoir
//!
//! Style photos as analog prints: a film-stock look, a paper base, a frame,
//! grain, vignette, warmth and a handwritten-style caption, developed into a
//! PNG at twice the card's size.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use memoir::{
//!     catalog::FilmStock,
//!     config::Config,
//!     export::{ArboardClipboard, Delivery, Exporter},
//!     render::TextRenderer,
//!     session::{Session, SystemClock},
//!     source::ImageLoader,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let mut session = Session::new(&config, SystemClock::new());
//!
//! session.replace_image(ImageLoader::load_file("holiday.jpg").await?);
//! session.update(|state| {
//!     state.set_film_stock(FilmStock::Portra400);
//!     state.set_caption("Lisbon, June");
//! });
//!
//! let exporter = Exporter::new(&config.export, TextRenderer::new(), Arc::new(ArboardClipboard));
//! if let Some(job) = session.begin_export(Delivery::Clipboard) {
//!     let result = exporter.export(job).await;
//!     session.finish_export(memoir::export::DeliveryKind::Clipboard, &result);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`catalog`] - Film stocks, papers, formats and frames
//! - [`session`] - Composition state, history and metadata
//! - [`source`] - Loading photos from files, data URIs and the network
//! - [`render`] - Layer stack and rasterization
//! - [`export`] - PNG delivery to disk or clipboard
//! - [`config`] - Configuration management

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod render;
pub mod session;
pub mod source;

// Re-export commonly used types for convenience
pub use crate::{
    catalog::CatalogEntry,
    config::Config,
    error::{MemoirError, Result},
    export::Exporter,
    session::Session,
};
