//! # Error Types
//!
//! This module defines error types used throughout the planche library.
//!
//! Most of the labelling core is total: a malformed row, an unparseable price
//! or an unknown preset degrade to empty output instead of failing. The
//! variants below cover the operations that genuinely can fail: reading input
//! files, persisting the theme, and producing the final document.

use thiserror::Error;

use crate::import::ImportError;
use crate::theme::ThemeError;

/// Main error type for planche operations
#[derive(Debug, Error)]
pub enum PlancheError {
    /// Spreadsheet or record import failure
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Theme validation or storage failure
    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    /// Barcode or QR symbol could not be produced
    #[error("Symbol error: {0}")]
    Symbol(String),

    /// Image decoding or encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// Rasterization or document assembly failed; the export was aborted
    #[error("Export failed on page {page}: {reason}")]
    Export { page: usize, reason: String },

    /// Server transport errors (bind, accept)
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
