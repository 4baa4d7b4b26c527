//! # Export
//!
//! Develops the current composite into a PNG at twice the card size and
//! delivers it as a file named `memoir-export-<unix-ms>.png` or as a
//! clipboard image.

pub mod delivery;
pub mod exporter;

pub use delivery::{ArboardClipboard, ClipboardSink, Delivery, DeliveryKind, MemoryClipboard};
pub use exporter::{encode_png, export_filename, ExportJob, ExportReceipt, Exporter};
