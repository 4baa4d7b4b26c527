//! # Editing Session
//!
//! The mutable side of Memoir: the composition being styled, its undo/redo
//! history, the footer metadata and the notifications shown to the user.
//! [`Session`] owns all of it and is driven from a single logical thread.
//!
//! ## Usage
//!
//! ```rust
//! use memoir::config::Config;
//! use memoir::session::{schedule::ManualClock, Session};
//!
//! let clock = ManualClock::new();
//! let mut session = Session::new(&Config::default(), clock.clone());
//!
//! session.update(|state| state.set_grain(80));
//! clock.advance(500);
//! assert!(session.tick());
//! assert!(session.undo());
//! ```

pub mod state;
pub mod history;
pub mod schedule;
pub mod metadata;
pub mod notify;
pub mod shortcuts;
pub mod controller;

pub use controller::Session;
pub use history::History;
pub use metadata::{ExifReader, KamadakExif, MetadataDeriver, PhotoMetadata};
pub use schedule::{Clock, ManualClock, SystemClock};
pub use shortcuts::{Command, KeyChord};
pub use state::{Axis, Caption, CompositionState, FontFamily, Percent};
