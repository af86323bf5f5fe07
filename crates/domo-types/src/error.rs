//! Error types for domo-types.

use thiserror::Error;

/// Errors that can occur when parsing domo data from its stored text form.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The category text does not name a known invoice category.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The action text does not name a known actuator state.
    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

/// Result type alias using domo-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
