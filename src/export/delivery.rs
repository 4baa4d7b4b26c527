use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::{ExportError, Result};

/// Where a finished print goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// PNG file written into `dir`
    Download { dir: PathBuf },
    /// Image payload on the system clipboard
    Clipboard,
}

impl Delivery {
    pub fn kind(&self) -> DeliveryKind {
        match self {
            Delivery::Download { .. } => DeliveryKind::Download,
            Delivery::Clipboard => DeliveryKind::Clipboard,
        }
    }
}

/// Delivery mode without its destination; each kind has its own busy flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryKind {
    Download,
    Clipboard,
}

/// Anything that can accept an RGBA image as a clipboard payload
pub trait ClipboardSink: Send + Sync {
    fn write_image(&self, width: u32, height: u32, rgba: &[u8]) -> Result<()>;
}

/// System clipboard through `arboard`
///
/// A clipboard handle is opened per write; holding one open across threads
/// is not portable.
#[derive(Debug, Default)]
pub struct ArboardClipboard;

impl ClipboardSink for ArboardClipboard {
    fn write_image(&self, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        let rejected = |e: arboard::Error| ExportError::ClipboardRejected { reason: e.to_string() };

        let mut clipboard = arboard::Clipboard::new().map_err(rejected)?;
        clipboard
            .set_image(arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: rgba.into(),
            })
            .map_err(rejected)?;

        debug!("Copied {}x{} image to clipboard", width, height);
        Ok(())
    }
}

/// Clipboard that keeps the last payload in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<(u32, u32, Vec<u8>)>>,
    reject: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard that refuses every write
    pub fn rejecting() -> Self {
        Self { contents: Mutex::new(None), reject: true }
    }

    /// Last payload written: (width, height, rgba bytes)
    pub fn contents(&self) -> Option<(u32, u32, Vec<u8>)> {
        self.contents.lock().ok().and_then(|guard| guard.clone())
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_image(&self, width: u32, height: u32, rgba: &[u8]) -> Result<()> {
        if self.reject {
            return Err(ExportError::ClipboardRejected { reason: "write not allowed".into() }.into());
        }
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| ExportError::ClipboardRejected { reason: "clipboard lock poisoned".into() })?;
        *guard = Some((width, height, rgba.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_kinds() {
        assert_eq!(Delivery::Clipboard.kind(), DeliveryKind::Clipboard);
        assert_eq!(
            Delivery::Download { dir: PathBuf::from("out") }.kind(),
            DeliveryKind::Download
        );
    }

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert!(clipboard.contents().is_none());
        clipboard.write_image(1, 1, &[1, 2, 3, 4]).unwrap();
        assert_eq!(clipboard.contents(), Some((1, 1, vec![1, 2, 3, 4])));

        let err = MemoryClipboard::rejecting().write_image(1, 1, &[0; 4]).unwrap_err();
        assert!(err.is_recoverable());
    }
}
