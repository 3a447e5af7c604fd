use std::io;

use thiserror::Error;

use crate::storage::PhaseMarker;

/// Framing errors met while decoding a chunked body.
///
/// Each of them is terminal for the decoder that raised it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkedError {
    #[error("an empty chunk-size line was detected")]
    EmptySizeLine,
    #[error("\"{line}\" has an invalid chunk size")]
    InvalidSize { line: String },
    #[error("\"{line}\" overflows a 64-bit chunk size")]
    SizeOverflow { line: String },
    #[error("line terminated by a bare LF")]
    BareLineFeed,
    #[error("expected CRLF after chunk data")]
    MissingChunkTerminator,
    #[error("line too long: {size} > {limit}")]
    LineTooLong { size: usize, limit: usize },
    #[error("chunk too large: {size} > {limit}")]
    ChunkTooLarge { size: u64, limit: u64 },
    #[error("body too large: {size} > {limit}")]
    BodyTooLarge { size: u64, limit: u64 },
    #[error("transport closed while reading {phase}")]
    Truncated { phase: PhaseMarker },
}

impl From<ChunkedError> for io::Error {
    fn from(error: ChunkedError) -> Self {
        let kind = match error {
            ChunkedError::Truncated { .. } => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, error)
    }
}
