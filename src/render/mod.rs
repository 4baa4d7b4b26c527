//! # Print Rendering
//!
//! Two stages: [`layout::render`] maps the composition to an ordered
//! [`Composite`] of layers, and [`Rasterizer`] paints that stack into pixels.
//! The first stage is pure and cheap; the second is what export pays for.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use memoir::render::{layout, raster::EXPORT_SCALE, Rasterizer, TextRenderer};
//! use memoir::session::{metadata::PhotoMetadata, state::CompositionState};
//!
//! let state = CompositionState::new();
//! let metadata = PhotoMetadata::defaults(chrono::Local::now().date_naive());
//! let composite = layout::render(&state, &metadata, None);
//!
//! let rasterizer = Rasterizer::new(EXPORT_SCALE, TextRenderer::new());
//! let pixels = rasterizer.rasterize(&composite, None)?;
//! # Ok::<(), memoir::MemoirError>(())
//! ```

pub mod composite;
pub mod layout;

pub mod canvas;
pub mod effects;
pub mod text;
pub mod raster;

pub use composite::{Composite, Layer};
pub use layout::render;
pub use raster::Rasterizer;
pub use text::TextRenderer;
