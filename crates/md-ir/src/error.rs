//! Parser errors observable at the public boundary.
//!
//! The parsing core never panics on malformed input; it produces a
//! best-effort IR. Internal recoveries (out-of-range text events, unknown
//! entity names) are logged and absorbed rather than surfaced.

/// Failure reported by [`crate::parse`] and the incremental parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The tokenizer reported a failure code. The bundled tokenizer is
    /// infallible, so this only reaches callers through alternative
    /// tokenizer integrations.
    #[error("tokenizer failure: code {0}")]
    Tokenizer(i32),
}
