//! Error types for the wire layer.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised by the line codecs.
///
/// Parsing a single line never fails and overlong or badly encoded input is
/// repaired in place, so the only failure left is the transport itself.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
