//! Error type shared by the primitives and the file pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Input does not start with the cubecrypt marker.
    #[error("input was not produced by cubecrypt (bad file marker)")]
    HeaderMismatch,
    #[error("pad count {0} is outside 0..=7")]
    InvalidPadCount(u8),
    /// A primitive was handed a key or block of the wrong size.
    #[error("invalid {what} length: {actual} bytes")]
    KeyLengthViolation { what: &'static str, actual: usize },
    /// Ciphertext ends inside a header or a chunk.
    #[error("ciphertext is truncated ({trailing} stray bytes)")]
    TruncatedInput { trailing: usize },
    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "std")]
    #[error("random source failed: {0}")]
    RandomSource(getrandom::Error),
}
