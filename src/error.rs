//! # Error standards
//!
//! This module provides a standardised error enum and result type for this crate.

// -----------------------------------------------------------------------------------------------
// TYPES
// -----------------------------------------------------------------------------------------------

/// Standard result type used in the disparity crate.
pub type Result<T> = std::result::Result<T, Error>;

// -----------------------------------------------------------------------------------------------
// ENUMERATIONS
// -----------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A method was selected by an index that names no known method.
    #[error("No such {kind} method: {index}")]
    UnknownMethod { kind: &'static str, index: i32 },

    #[error("Target is {target:?} but reference is {reference:?} (width, height)")]
    ShapeMismatch {
        target: (u32, u32),
        reference: (u32, u32),
    },

    #[error("Target has {target} channels but reference has {reference}")]
    ChannelMismatch { target: u8, reference: u8 },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Could not read parameters file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse parameters: {0}")]
    Config(#[from] serde_json::Error),

    #[cfg(feature = "statistics")]
    #[error("Could not plot statistics: {0}")]
    Plot(String),
}
