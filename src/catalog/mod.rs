//! # Style Catalog
//!
//! Fixed sets of film stocks, papers, print formats and frames. Each set is a
//! closed enum implementing [`CatalogEntry`], so a selection can never refer to
//! anything outside the catalog.
//!
//! ## Usage
//!
//! ```rust
//! use memoir::catalog::{CatalogEntry, FilmStock};
//!
//! let stock = FilmStock::from_id("ilford-bw").unwrap();
//! assert_eq!(stock.name(), "Ilford HP5");
//! println!("{}", stock.effect());
//! ```

pub mod traits;
pub mod filter;

pub mod film;
pub mod paper;
pub mod ratio;
pub mod frame;

pub use traits::CatalogEntry;
pub use filter::{FilterChain, FilterOp};

pub use film::FilmStock;
pub use paper::PaperType;
pub use ratio::AspectRatio;
pub use frame::{FrameBorder, FrameCategory, FrameType};
