//! Error types for mdtrack-core.

use thiserror::Error;

/// Result type alias for mdtrack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for mdtrack operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A (module, channel) address that is not registered in the geometry.
    #[error("unknown tube address: module {module}, channel {channel}")]
    UnknownAddress { module: u16, channel: u16 },

    /// The tangent-line fit could not produce a line.
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}
