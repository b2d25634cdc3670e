//! Error types for the Lumen core library.

use thiserror::Error;

/// Top-level error type for all Lumen core operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// A grid coordinate or note fell outside the 8x8 pad matrix.
    #[error("Invalid grid cell: ({x}, {y})")]
    InvalidCell {
        /// Column requested.
        x: i32,
        /// Row requested.
        y: i32,
    },

    /// A note number does not address a pad in the active layout.
    #[error("Note {0} is not a grid pad")]
    NotAPad(u8),

    /// An LED surface rejected a command (device gone, port closed, ...).
    #[error("Device error: {0}")]
    Device(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, LumenError>;
