use thiserror::Error;

/// Main error type for the Memoir library
#[derive(Error, Debug)]
pub enum MemoirError {
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source image ingestion errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to read image file {path}: {reason}")]
    ReadFailed { path: String, reason: String },

    #[error("Failed to decode image: {reason}")]
    DecodeFailed { reason: String },

    #[error("Failed to fetch image from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Malformed data URI: {reason}")]
    InvalidDataUri { reason: String },
}

/// Rasterization and delivery errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Image at {url} is not embedded and cannot be rasterized")]
    CrossOrigin { url: String },

    #[error("Rasterization failed: {reason}")]
    RasterizationFailed { reason: String },

    #[error("Rasterization produced no data")]
    EmptyOutput,

    #[error("PNG encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Clipboard rejected the image: {reason}")]
    ClipboardRejected { reason: String },

    #[error("Could not write export file {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// Catalog lookup errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Unknown {kind}: {id}")]
    UnknownEntry { kind: &'static str, id: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using MemoirError
pub type Result<T> = std::result::Result<T, MemoirError>;

impl MemoirError {
    /// Check if this error is recoverable (the user may simply retry)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Image(ImageError::FetchFailed { .. }) => true,
            Self::Export(ExportError::ClipboardRejected { .. }) => true,
            Self::Export(ExportError::EmptyOutput) => true,
            Self::Export(ExportError::WriteFailed { .. }) => true,
            _ => false,
        }
    }

    /// Get a user-facing message, suitable for a transient notification
    pub fn user_message(&self) -> String {
        match self {
            Self::Export(ExportError::ClipboardRejected { .. }) => {
                "Could not copy image to clipboard. Please try again.".to_string()
            }
            Self::Export(_) => "Could not export image. Please try again.".to_string(),
            Self::Catalog(CatalogError::UnknownEntry { kind, id }) => {
                format!("Unknown {} '{}'. Run with --list to see the catalog.", kind, id)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
